// ==========================================
// 服装裁剪排产系统 - 应用层
// ==========================================
// 职责: 组装共享连接、仓储、配置与 API 实例
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
