use serde::{Deserialize, Serialize};

/// 默认守恒校验容差（每米面料总量）
pub const DEFAULT_CONSERVATION_TOLERANCE: f64 = 1e-6;

/// 守恒校验容差下限；更小的值会被浮点舍入误差击穿
pub const MIN_CONSERVATION_TOLERANCE: f64 = 1e-12;

/// 分配引擎配置
///
/// 存储位置：config_kv（scope_id='global'，key 见 config_keys）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// 面料守恒校验容差（按面料总量缩放，总量不足 1 米按 1 米计）
    #[serde(default = "default_tolerance")]
    pub conservation_tolerance: f64,

    /// 请求未显式指定时是否启用余料压缩
    #[serde(default)]
    pub minimize_remainder_default: bool,
}

fn default_tolerance() -> f64 {
    DEFAULT_CONSERVATION_TOLERANCE
}

impl AllocationConfig {
    /// 容差是否可接受（有限且不低于下限）
    pub fn is_valid_tolerance(value: f64) -> bool {
        value.is_finite() && value >= MIN_CONSERVATION_TOLERANCE
    }

    /// 实际生效的容差：非有限值回退默认值，过小值提升到下限
    pub fn effective_tolerance(&self) -> f64 {
        if self.conservation_tolerance.is_finite() {
            self.conservation_tolerance.max(MIN_CONSERVATION_TOLERANCE)
        } else {
            DEFAULT_CONSERVATION_TOLERANCE
        }
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            conservation_tolerance: DEFAULT_CONSERVATION_TOLERANCE,
            minimize_remainder_default: false,
        }
    }
}
