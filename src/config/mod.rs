// ==========================================
// 服装裁剪排产系统 - 配置层
// ==========================================
// 职责: 系统配置管理
// 存储: config_kv 表
// ==========================================

pub mod allocation_config;
pub mod config_manager;

// 重导出核心配置类型
pub use allocation_config::{
    AllocationConfig, DEFAULT_CONSERVATION_TOLERANCE, MIN_CONSERVATION_TOLERANCE,
};
pub use config_manager::{config_keys, ConfigManager};
