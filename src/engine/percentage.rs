// ==========================================
// 服装裁剪排产系统 - 比例预分配引擎
// ==========================================
// 职责: 按 尺码→百分比 预先切分面料并换算整件数
// 输入: 面料总量 + 关注尺码 + 比例设置
// 输出: 写入分配台账（件数/利润/余料）
// 说明: 不足一件的份额不在本阶段消耗，留给贪心阶段
// ==========================================

use crate::domain::allocation::AllocationRequest;
use crate::domain::material::SizeSpec;
use crate::engine::error::{AllocationError, AllocationOutcome};
use crate::engine::ledger::AllocationLedger;
use crate::engine::ratio::checked_units;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// 百分比合计容差
pub const PERCENT_EPSILON: f64 = 1e-9;

// ==========================================
// PercentageAllocator - 比例预分配引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct PercentageAllocator {
    // 无状态引擎
}

impl PercentageAllocator {
    pub fn new() -> Self {
        Self {}
    }

    /// 校验比例设置
    ///
    /// 规则:
    /// 1) 每个值必须是有限数值
    /// 2) 合计 ≤ 100（否则 PercentageExceeded）
    /// 3) 每个值在 0~100 之间
    /// 4) 尺码必须属于关注尺码
    ///
    /// # 返回
    /// 百分比合计
    pub fn validate(
        &self,
        percentages: &BTreeMap<String, f64>,
        sizes: &[&SizeSpec],
    ) -> AllocationOutcome<f64> {
        for (size, pct) in percentages {
            if !pct.is_finite() {
                return Err(AllocationError::InvalidPercentage {
                    size: size.clone(),
                    reason: format!("非有限数值: {}", pct),
                });
            }
        }

        let total_pct: f64 = percentages.values().sum();
        if total_pct > 100.0 + PERCENT_EPSILON {
            return Err(AllocationError::PercentageExceeded { total_pct });
        }

        for (size, pct) in percentages {
            if *pct < 0.0 || *pct > 100.0 {
                return Err(AllocationError::InvalidPercentage {
                    size: size.clone(),
                    reason: format!("必须在0~100之间: {}", pct),
                });
            }
            if !sizes.iter().any(|s| &s.size == size) {
                return Err(AllocationError::InvalidPercentage {
                    size: size.clone(),
                    reason: "不属于关注尺码".to_string(),
                });
            }
        }

        Ok(total_pct)
    }

    /// 执行比例预分配
    ///
    /// 按关注尺码顺序：分得面料 = 总量 × 百分比 / 100，件数 = floor(分得面料 / 每件用料)
    #[instrument(skip(self, ledger, sizes, request), fields(material = %request.material))]
    pub fn allocate(
        &self,
        ledger: &mut AllocationLedger,
        sizes: &[&SizeSpec],
        request: &AllocationRequest,
    ) -> AllocationOutcome<()> {
        for spec in sizes {
            let pct = request.percentage_for(&spec.size);
            if pct <= 0.0 {
                continue;
            }

            let allocated_meters = request.total_meters * pct / 100.0;
            let count = checked_units(spec, allocated_meters)?;
            debug!(
                size = %spec.size,
                pct,
                allocated_meters,
                count,
                "比例预分配"
            );
            ledger.record(spec, count)?;
        }
        Ok(())
    }
}

// ==========================================
// 比例辅助函数（供输入界面使用）
// ==========================================

/// 向下保留两位小数（保证合计不超过 100）
fn floor_2dp(value: f64) -> f64 {
    ((value * 100.0) + 1e-9).floor() / 100.0
}

/// 在所选尺码间平均分配 100%
pub fn equal_shares<S: AsRef<str>>(sizes: &[S]) -> BTreeMap<String, f64> {
    if sizes.is_empty() {
        return BTreeMap::new();
    }
    let share = floor_2dp(100.0 / sizes.len() as f64);
    sizes
        .iter()
        .map(|s| (s.as_ref().to_string(), share))
        .collect()
}

/// 合计超过 100 时按比例缩放到 100 以内；否则原样返回
pub fn rescale_to_cap(percentages: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let total: f64 = percentages.values().sum();
    if total <= 100.0 {
        return percentages.clone();
    }
    let factor = 100.0 / total;
    percentages
        .iter()
        .map(|(k, v)| (k.clone(), floor_2dp(v * factor)))
        .collect()
}

/// 剩余可分配百分比
pub fn remaining_percentage(percentages: &BTreeMap<String, f64>) -> f64 {
    100.0 - percentages.values().sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn katun_sizes() -> Vec<SizeSpec> {
        vec![
            SizeSpec::new("S", 1.5, 45000.0),
            SizeSpec::new("M", 2.0, 55000.0),
            SizeSpec::new("L", 2.5, 65000.0),
            SizeSpec::new("XL", 3.0, 75000.0),
        ]
    }

    fn map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_allocate_half_and_half() {
        let specs = katun_sizes();
        let sizes: Vec<&SizeSpec> = specs.iter().collect();
        let request = AllocationRequest::new("Katun", 10.0)
            .with_percentages(&[("S", 50.0), ("M", 50.0)]);

        let mut ledger = AllocationLedger::new(10.0);
        PercentageAllocator::new()
            .allocate(&mut ledger, &sizes, &request)
            .unwrap();

        assert_eq!(ledger.count_of("S"), 3);
        assert_eq!(ledger.count_of("M"), 2);
        assert_eq!(ledger.total_profit(), 245000.0);
        assert!((ledger.remaining_meters() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_share_smaller_than_one_garment_is_left_over() {
        let specs = katun_sizes();
        let sizes: Vec<&SizeSpec> = specs.iter().collect();
        // XL 分得 2 米，不足一件 (3 米)
        let request = AllocationRequest::new("Katun", 10.0).with_percentages(&[("XL", 20.0)]);

        let mut ledger = AllocationLedger::new(10.0);
        PercentageAllocator::new()
            .allocate(&mut ledger, &sizes, &request)
            .unwrap();

        assert_eq!(ledger.count_of("XL"), 0);
        assert_eq!(ledger.remaining_meters(), 10.0);
    }

    #[test]
    fn test_validate_rejects_over_cap() {
        let specs = katun_sizes();
        let sizes: Vec<&SizeSpec> = specs.iter().collect();
        let err = PercentageAllocator::new()
            .validate(&map(&[("S", 60.0), ("M", 60.0)]), &sizes)
            .unwrap_err();
        assert_eq!(err, AllocationError::PercentageExceeded { total_pct: 120.0 });
    }

    #[test]
    fn test_validate_rejects_bad_entries() {
        let specs = katun_sizes();
        let sizes: Vec<&SizeSpec> = specs[..2].iter().collect();
        let allocator = PercentageAllocator::new();

        assert!(matches!(
            allocator.validate(&map(&[("S", -5.0)]), &sizes),
            Err(AllocationError::InvalidPercentage { .. })
        ));
        assert!(matches!(
            allocator.validate(&map(&[("XL", 10.0)]), &sizes),
            Err(AllocationError::InvalidPercentage { .. })
        ));
        assert!(matches!(
            allocator.validate(&map(&[("S", f64::NAN)]), &sizes),
            Err(AllocationError::InvalidPercentage { .. })
        ));
        assert_eq!(
            allocator.validate(&map(&[("S", 30.0), ("M", 70.0)]), &sizes),
            Ok(100.0)
        );
    }

    #[test]
    fn test_equal_shares_never_exceed_cap() {
        for n in 1..=8 {
            let sizes: Vec<String> = (0..n).map(|i| format!("Z{}", i)).collect();
            let shares = equal_shares(&sizes);
            assert_eq!(shares.len(), n);
            assert!(shares.values().sum::<f64>() <= 100.0 + PERCENT_EPSILON, "n={}", n);
        }
        assert_eq!(equal_shares(&["S", "M"]).get("S"), Some(&50.0));
        assert!(equal_shares::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_rescale_to_cap() {
        let scaled = rescale_to_cap(&map(&[("S", 60.0), ("M", 60.0)]));
        assert_eq!(scaled.get("S"), Some(&50.0));
        assert_eq!(scaled.get("M"), Some(&50.0));

        let untouched = map(&[("S", 30.0)]);
        assert_eq!(rescale_to_cap(&untouched), untouched);
        assert!((remaining_percentage(&untouched) - 70.0).abs() < 1e-9);
    }
}
