// ==========================================
// 服装裁剪排产系统 - 数值计算公共函数
// ==========================================
// 职责: 净利率计算、整件数计算（贪心与余料压缩共用）
// ==========================================

use crate::domain::material::SizeSpec;
use crate::engine::error::{AllocationError, AllocationOutcome, ComputationCause};

/// 超分配保护容差（米）
pub const OVER_ALLOCATION_EPSILON: f64 = 1e-9;

/// 净利率 = (每件利润 - 每件用料 × 每米单价) / 每件用料
///
/// 调用方保证 meters_per_unit > 0
pub fn net_profit_ratio(spec: &SizeSpec, price_per_meter: f64) -> f64 {
    let material_cost = spec.meters_per_unit * price_per_meter;
    (spec.profit_per_unit - material_cost) / spec.meters_per_unit
}

/// u64 上界（2^64），f64 可精确表示
const U64_CEILING: f64 = 18_446_744_073_709_551_616.0;

/// 可用面料能裁出的整件数
///
/// 取整方式: 先用 fmod 扣掉余数再除，避免 1.0/0.1 这类商被舍入成整数后
/// 件数 × 用料 略大于可用面料；最后再做一次超分配保护（舍入至多多出一件）。
///
/// # 返回
/// - Some(n): 整件数（面料或用料非正时为 0）
/// - None: 件数超出 u64 范围
pub fn whole_units(available_meters: f64, meters_per_unit: f64) -> Option<u64> {
    if !(available_meters > 0.0) || !(meters_per_unit > 0.0) {
        return Some(0);
    }

    let rem = available_meters % meters_per_unit;
    let div = (available_meters - rem) / meters_per_unit;
    let mut units = div.floor();
    if div - units > 0.5 {
        units += 1.0;
    }

    if !(units < U64_CEILING) {
        return None;
    }
    let mut units = units as u64;

    if units > 0 && units as f64 * meters_per_unit > available_meters + OVER_ALLOCATION_EPSILON {
        units -= 1;
    }
    Some(units)
}

/// 按尺码计算整件数，超出范围时返回计算失败
pub fn checked_units(spec: &SizeSpec, available_meters: f64) -> AllocationOutcome<u64> {
    whole_units(available_meters, spec.meters_per_unit).ok_or_else(|| {
        AllocationError::computation(
            format!("size={}", spec.size),
            ComputationCause::CountOverflow {
                size: spec.size.clone(),
                available_meters,
            },
        )
    })
}
