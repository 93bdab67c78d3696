// ==========================================
// 服装裁剪排产系统 - 分配引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 校验错误必须在任何分配之前抛出，不返回部分结果
// ==========================================

use thiserror::Error;

/// 分配引擎错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    // ===== 输入校验错误 =====
    #[error("面料总量无效: total_meters={total_meters}")]
    InvalidQuantity { total_meters: f64 },

    #[error("关注尺码无效: material={material}, requested={requested:?}")]
    InvalidFocusSizes {
        material: String,
        requested: Vec<String>,
    },

    #[error("比例合计超过100%: total={total_pct}")]
    PercentageExceeded { total_pct: f64 },

    #[error("比例设置无效 (size={size}): {reason}")]
    InvalidPercentage { size: String, reason: String },

    // ===== 计算错误 =====
    #[error("计算失败: {context}")]
    ComputationFailure {
        context: String,
        #[source]
        cause: ComputationCause,
    },
}

/// 计算失败的原始原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationCause {
    #[error("尺码 {size} 每件用料非正: {meters_per_unit}")]
    NonPositiveMetersPerUnit { size: String, meters_per_unit: f64 },

    #[error("每米单价为负: {price_per_meter}")]
    NegativePricePerMeter { price_per_meter: f64 },

    #[error("字段 {field} 不是有限数值: {value}")]
    NonFiniteValue { field: String, value: f64 },

    #[error("尺码 {size} 件数超出可表示范围 (可用面料 {available_meters} 米)")]
    CountOverflow { size: String, available_meters: f64 },

    #[error("面料守恒被破坏: total={total_meters}, used={used_meters}, remaining={remaining_meters}")]
    ConservationViolated {
        total_meters: f64,
        used_meters: f64,
        remaining_meters: f64,
    },
}

impl AllocationError {
    /// 是否为输入校验类错误（与计算失败区分）
    pub fn is_validation(&self) -> bool {
        !matches!(self, AllocationError::ComputationFailure { .. })
    }

    pub fn computation(context: impl Into<String>, cause: ComputationCause) -> Self {
        AllocationError::ComputationFailure {
            context: context.into(),
            cause,
        }
    }
}

/// Result 类型别名
pub type AllocationOutcome<T> = Result<T, AllocationError>;
