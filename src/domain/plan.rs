// ==========================================
// 服装裁剪排产系统 - 排产记录实体
// ==========================================
// 职责: 已执行分配的留档（请求 + 结果）
// ==========================================

use crate::domain::allocation::{AllocationRequest, AllocationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub plan_id: String,
    pub request: AllocationRequest,
    pub result: AllocationResult,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PlanRecord {
    /// 新建排产记录（生成 plan_id 与创建时间）
    pub fn new(request: AllocationRequest, result: AllocationResult, created_by: Option<&str>) -> Self {
        Self {
            plan_id: Uuid::new_v4().to_string(),
            request,
            result,
            created_by: created_by.map(|s| s.to_string()),
            created_at: Utc::now(),
        }
    }
}
