// ==========================================
// 服装裁剪排产系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::api::{ApiResult, ImportApi, PlanningApi};
use crate::catalog::builtin_materials;
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::i18n;
use crate::repository::{MaterialRepository, PlanRepository, RepositoryError};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "GARMENT_CUT_PLANNER_DB_PATH";

const DB_FILE_NAME: &str = "garment_cut_planner.db";

/// 应用状态
///
/// 所有仓储共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 排产API
    pub planning_api: Arc<PlanningApi>,

    /// 面料目录导入API
    pub import_api: Arc<ImportApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 面料档案仓储
    pub material_repo: Arc<MaterialRepository>,

    /// 排产记录仓储
    pub plan_repo: Arc<PlanRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并初始化表结构
    /// 2. 面料表为空时写入内置面料
    /// 3. 读取配置（分配参数、界面语言）
    /// 4. 创建所有API实例
    pub fn new(db_path: String) -> ApiResult<Self> {
        info!(db_path = %db_path, "初始化AppState");

        let conn = open_sqlite_connection(&db_path).map_err(RepositoryError::from)?;
        init_schema(&conn).map_err(RepositoryError::from)?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 仓储层
        // ==========================================
        let material_repo = Arc::new(MaterialRepository::from_connection(conn.clone()));
        let plan_repo = Arc::new(PlanRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn)?);

        let seeded = material_repo.seed_if_empty(&builtin_materials())?;
        if seeded > 0 {
            info!(seeded, "首次启动，已写入内置面料");
        }

        // ==========================================
        // 配置
        // ==========================================
        let allocation_config = config_manager.get_allocation_config()?;
        if let Some(locale) = config_manager.get_locale()? {
            if !i18n::set_locale(&locale) {
                warn!(locale = %locale, "不支持的界面语言配置，保持默认");
            }
        }

        // ==========================================
        // API层
        // ==========================================
        let planning_api = Arc::new(
            PlanningApi::new(material_repo.clone(), allocation_config)
                .with_plan_repository(plan_repo.clone()),
        );
        let import_api = Arc::new(ImportApi::new(material_repo.clone()));

        Ok(Self {
            db_path,
            planning_api,
            import_api,
            config_manager,
            material_repo,
            plan_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先使用环境变量 GARMENT_CUT_PLANNER_DB_PATH，其次为用户数据目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(".").join(DB_FILE_NAME);
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("garment-cut-planner");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}
