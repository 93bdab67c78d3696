// ==========================================
// 服装裁剪排产系统 - 核心库
// ==========================================
// 职责: 按面料总量与尺码档案计算利润最优的成衣件数
// 技术栈: Rust + SQLite
// 系统定位: 决策支持工具（结果供人工参考）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 分配算法
pub mod engine;

// 面料目录 - 内置数据与查询接口
pub mod catalog;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AllocationPhase, Elasticity, GreedyFallback};

// 领域实体
pub use domain::{AllocationRequest, AllocationResult, MaterialProfile, PlanRecord, ProductionLine, SizeSpec};

// 引擎
pub use engine::{
    AllocationError, AllocationOrchestrator, PercentageAllocator, ProfitRatioGreedyAllocator,
    RemainderMinimizer,
};

// 面料目录
pub use catalog::{FabricCatalog, InMemoryCatalog};

// API
pub use api::{ApiError, ImportApi, PlanningApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "服装裁剪排产系统";
