// ==========================================
// 服装裁剪排产系统 - 引擎层
// ==========================================
// 职责: 面料分配规则引擎（纯函数，无 I/O）
// 红线: Engine 不访问数据库, 校验失败不产生部分结果
// ==========================================

pub mod error;
pub mod greedy;
pub mod ledger;
pub mod orchestrator;
pub mod percentage;
pub mod ratio;
pub mod remainder;

// 重导出核心引擎
pub use error::{AllocationError, AllocationOutcome, ComputationCause};
pub use greedy::{ProfitRatioGreedyAllocator, RankedSize};
pub use ledger::AllocationLedger;
pub use orchestrator::AllocationOrchestrator;
pub use percentage::{equal_shares, remaining_percentage, rescale_to_cap, PercentageAllocator};
pub use ratio::{checked_units, net_profit_ratio, whole_units};
pub use remainder::RemainderMinimizer;
