// ==========================================
// 服装裁剪排产系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod allocation;
pub mod material;
pub mod plan;
pub mod types;

// 重导出核心类型
pub use allocation::{AllocationRequest, AllocationResult, ProductionLine, UsageShare};
pub use material::{MaterialProfile, SizeSpec};
pub use plan::PlanRecord;
pub use types::{AllocationPhase, Elasticity, GreedyFallback};
