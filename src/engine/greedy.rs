// ==========================================
// 服装裁剪排产系统 - 净利率贪心分配引擎
// ==========================================
// 职责: 把剩余面料按净利率从高到低依次填满
// 排序: 净利率降序，并列保持关注尺码原有顺序（稳定排序）
// ==========================================

use crate::domain::material::SizeSpec;
use crate::domain::types::GreedyFallback;
use crate::engine::error::AllocationOutcome;
use crate::engine::ledger::AllocationLedger;
use crate::engine::ratio::{checked_units, net_profit_ratio};
use tracing::{debug, instrument, trace};

/// 排序后的候选尺码
#[derive(Debug, Clone)]
pub struct RankedSize<'a> {
    pub spec: &'a SizeSpec,
    pub net_ratio: f64,
}

// ==========================================
// ProfitRatioGreedyAllocator - 净利率贪心引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct ProfitRatioGreedyAllocator {
    // 无状态引擎
}

impl ProfitRatioGreedyAllocator {
    pub fn new() -> Self {
        Self {}
    }

    /// 按净利率降序排列候选尺码（稳定排序）
    pub fn rank<'a>(&self, sizes: &[&'a SizeSpec], price_per_meter: f64) -> Vec<RankedSize<'a>> {
        let mut ranked: Vec<RankedSize<'a>> = sizes
            .iter()
            .map(|&spec| RankedSize {
                spec,
                net_ratio: net_profit_ratio(spec, price_per_meter),
            })
            .collect();
        ranked.sort_by(|a, b| b.net_ratio.total_cmp(&a.net_ratio));
        ranked
    }

    /// 执行贪心分配
    ///
    /// # 参数
    /// - `ledger`: 分配台账（与比例阶段的件数合并）
    /// - `sizes`: 全部关注尺码（无论比例阶段是否执行过）
    /// - `price_per_meter`: 每米单价
    /// - `fallback`: 整件兜底模式
    #[instrument(skip(self, ledger, sizes), fields(
        remaining = ledger.remaining_meters(),
        candidates = sizes.len()
    ))]
    pub fn allocate(
        &self,
        ledger: &mut AllocationLedger,
        sizes: &[&SizeSpec],
        price_per_meter: f64,
        fallback: GreedyFallback,
    ) -> AllocationOutcome<()> {
        for ranked in self.rank(sizes, price_per_meter) {
            let spec = ranked.spec;
            let remaining = ledger.remaining_meters();
            let count = checked_units(spec, remaining)?;

            if count > 0 {
                debug!(size = %spec.size, net_ratio = ranked.net_ratio, count, "贪心分配");
                ledger.record(spec, count)?;
            } else if fallback == GreedyFallback::SingleUnit
                && remaining >= spec.meters_per_unit
            {
                // TODO: 整件兜底与 checked_units 的判断重复；确认比例阶段后是否也需要兜底后再统一
                debug!(size = %spec.size, "整件兜底");
                ledger.record(spec, 1)?;
            } else {
                trace!(size = %spec.size, remaining, "余料不足一件，跳过");
            }
        }
        Ok(())
    }
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

    #[test]
    fn test_rank_descending_net_ratio() {
        let specs = katun_sizes();
        let sizes: Vec<&SizeSpec> = specs.iter().collect();
        let ranked = ProfitRatioGreedyAllocator::new().rank(&sizes, 20000.0);
        let order: Vec<&str> = ranked.iter().map(|r| r.spec.size.as_str()).collect();
        assert_eq!(order, vec!["S", "M", "L", "XL"]);
    }

    #[test]
    fn test_rank_ties_keep_declared_order() {
        // 三个尺码净利率相同（均为 10000/米）
        let specs = vec![
            SizeSpec::new("XL", 2.0, 20000.0),
            SizeSpec::new("S", 1.0, 10000.0),
            SizeSpec::new("M", 4.0, 40000.0),
        ];
        let sizes: Vec<&SizeSpec> = specs.iter().collect();
        let ranked = ProfitRatioGreedyAllocator::new().rank(&sizes, 0.0);
        let order: Vec<&str> = ranked.iter().map(|r| r.spec.size.as_str()).collect();
        assert_eq!(order, vec!["XL", "S", "M"]);
    }

    #[test]
    fn test_allocate_single_phase_katun_10m() {
        let specs = katun_sizes();
        let sizes: Vec<&SizeSpec> = specs.iter().collect();
        let mut ledger = AllocationLedger::new(10.0);

        ProfitRatioGreedyAllocator::new()
            .allocate(&mut ledger, &sizes, 20000.0, GreedyFallback::SingleUnit)
            .unwrap();

        assert_eq!(ledger.count_of("S"), 6);
        assert_eq!(ledger.count_of("M"), 0);
        assert_eq!(ledger.total_profit(), 270000.0);
        assert!((ledger.remaining_meters() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_allocate_zero_remaining_is_noop() {
        let specs = katun_sizes();
        let sizes: Vec<&SizeSpec> = specs.iter().collect();
        let mut ledger = AllocationLedger::new(0.0);

        ProfitRatioGreedyAllocator::new()
            .allocate(&mut ledger, &sizes, 20000.0, GreedyFallback::Disabled)
            .unwrap();

        assert_eq!(ledger.total_profit(), 0.0);
        assert!(ledger.into_lines().is_empty());
    }

    #[test]
    fn test_allocate_lower_ratio_sizes_absorb_leftover() {
        // 最优尺码吃不下的余料由下一个尺码接手
        let specs = vec![SizeSpec::new("L", 4.0, 100000.0), SizeSpec::new("S", 1.0, 10000.0)];
        let sizes: Vec<&SizeSpec> = specs.iter().collect();
        let mut ledger = AllocationLedger::new(10.0);

        ProfitRatioGreedyAllocator::new()
            .allocate(&mut ledger, &sizes, 0.0, GreedyFallback::Disabled)
            .unwrap();

        assert_eq!(ledger.count_of("L"), 2);
        assert_eq!(ledger.count_of("S"), 2);
        assert!(ledger.remaining_meters().abs() < 1e-9);
    }

    #[test]
    fn test_allocate_count_beyond_u32() {
        let specs = katun_sizes();
        let sizes: Vec<&SizeSpec> = specs.iter().collect();
        let mut ledger = AllocationLedger::new(1e10);

        ProfitRatioGreedyAllocator::new()
            .allocate(&mut ledger, &sizes, 20000.0, GreedyFallback::SingleUnit)
            .unwrap();

        assert_eq!(ledger.count_of("S"), 6_666_666_666);
        assert_eq!(ledger.count_of("M"), 0);
        assert!((ledger.remaining_meters() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_allocate_count_overflow_fails() {
        let specs = katun_sizes();
        let sizes: Vec<&SizeSpec> = specs.iter().collect();
        let mut ledger = AllocationLedger::new(1e20);

        let result = ProfitRatioGreedyAllocator::new().allocate(
            &mut ledger,
            &sizes,
            20000.0,
            GreedyFallback::SingleUnit,
        );
        assert!(result.is_err());
        assert!(ledger.into_lines().is_empty());
    }
}
