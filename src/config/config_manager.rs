// ==========================================
// 服装裁剪排产系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::allocation_config::{AllocationConfig, MIN_CONSERVATION_TOLERANCE};
use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（UPSERT）
    ///
    /// 分配引擎的容差键在写入前校验，非法值返回 FieldValueError
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        if key == config_keys::CONSERVATION_TOLERANCE {
            let valid = value
                .trim()
                .parse::<f64>()
                .map(AllocationConfig::is_valid_tolerance)
                .unwrap_or(false);
            if !valid {
                return Err(RepositoryError::FieldValueError {
                    field: key.to_string(),
                    message: format!(
                        "必须是不小于 {:e} 的有限数值: {}",
                        MIN_CONSERVATION_TOLERANCE, value
                    ),
                });
            }
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = ?4
            "#,
            params![GLOBAL_SCOPE, key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// 全部 global 配置（按 key 排序）
    pub fn list_configs(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut configs = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            configs.insert(key, value);
        }
        Ok(configs)
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let configs = self.list_configs()?;
        Ok(serde_json::to_string(&configs)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 此方法会覆盖同名的 global 配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> RepositoryResult<usize> {
        let configs: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = Utc::now().to_rfc3339();

        let mut count = 0;
        for (key, value) in configs.iter() {
            count += tx.execute(
                r#"
                INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = ?4
                "#,
                params![GLOBAL_SCOPE, key, value, now],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    // ===== 分配引擎配置 =====

    /// 读取分配引擎配置
    ///
    /// 配置缺失或格式错误时使用默认值（格式错误记录告警）；
    /// 容差低于 MIN_CONSERVATION_TOLERANCE 视为格式错误
    pub fn get_allocation_config(&self) -> RepositoryResult<AllocationConfig> {
        let mut config = AllocationConfig::default();

        if let Some(raw) = self.get_config_value(config_keys::CONSERVATION_TOLERANCE)? {
            match raw.trim().parse::<f64>() {
                Ok(v) if AllocationConfig::is_valid_tolerance(v) => config.conservation_tolerance = v,
                _ => warn!(key = config_keys::CONSERVATION_TOLERANCE, value = %raw, "配置格式错误，使用默认值"),
            }
        }

        if let Some(raw) = self.get_config_value(config_keys::MINIMIZE_REMAINDER_DEFAULT)? {
            match parse_bool(&raw) {
                Some(v) => config.minimize_remainder_default = v,
                None => warn!(key = config_keys::MINIMIZE_REMAINDER_DEFAULT, value = %raw, "配置格式错误，使用默认值"),
            }
        }

        Ok(config)
    }

    /// 界面语言（未配置返回 None）
    pub fn get_locale(&self) -> RepositoryResult<Option<String>> {
        Ok(self
            .get_config_value(config_keys::LOCALE)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 分配引擎
    pub const CONSERVATION_TOLERANCE: &str = "allocation.conservation_tolerance";
    pub const MINIMIZE_REMAINDER_DEFAULT: &str = "allocation.minimize_remainder_default";

    // 界面
    pub const LOCALE: &str = "ui.locale";
}
