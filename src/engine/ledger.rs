// ==========================================
// 服装裁剪排产系统 - 分配台账
// ==========================================
// 职责: 在各分配阶段之间传递 件数/利润/余料
// 说明: 同一尺码跨阶段累加（合并，不覆盖）；尺码顺序为首次分配顺序
// ==========================================

use crate::domain::allocation::ProductionLine;
use crate::domain::material::SizeSpec;
use crate::engine::error::{AllocationError, AllocationOutcome, ComputationCause};

#[derive(Debug, Clone)]
struct LedgerEntry {
    spec: SizeSpec,
    count: u64,
}

/// 分配台账
#[derive(Debug, Clone)]
pub struct AllocationLedger {
    entries: Vec<LedgerEntry>,
    total_garments: u64,
    total_profit: f64,
    remaining_meters: f64,
}

impl AllocationLedger {
    pub fn new(total_meters: f64) -> Self {
        Self {
            entries: Vec::new(),
            total_garments: 0,
            total_profit: 0.0,
            remaining_meters: total_meters,
        }
    }

    pub fn remaining_meters(&self) -> f64 {
        self.remaining_meters
    }

    pub fn total_profit(&self) -> f64 {
        self.total_profit
    }

    pub fn total_garments(&self) -> u64 {
        self.total_garments
    }

    pub fn count_of(&self, size: &str) -> u64 {
        self.entries
            .iter()
            .find(|e| e.spec.size == size)
            .map(|e| e.count)
            .unwrap_or(0)
    }

    /// 记录一次分配；count 为 0 时不产生条目
    ///
    /// 总件数超出 u64 时返回计算失败，台账保持不变
    pub fn record(&mut self, spec: &SizeSpec, count: u64) -> AllocationOutcome<()> {
        if count == 0 {
            return Ok(());
        }

        // 单尺码件数不超过总件数，只需检查总数
        self.total_garments = self.total_garments.checked_add(count).ok_or_else(|| {
            AllocationError::computation(
                format!("size={}", spec.size),
                ComputationCause::CountOverflow {
                    size: spec.size.clone(),
                    available_meters: self.remaining_meters,
                },
            )
        })?;

        match self.entries.iter_mut().find(|e| e.spec.size == spec.size) {
            Some(entry) => entry.count += count,
            None => self.entries.push(LedgerEntry {
                spec: spec.clone(),
                count,
            }),
        }

        self.total_profit += count as f64 * spec.profit_per_unit;
        self.remaining_meters -= count as f64 * spec.meters_per_unit;
        // 超分配保护容差内的负值归零
        if self.remaining_meters < 0.0 {
            self.remaining_meters = 0.0;
        }
        Ok(())
    }

    /// 已用面料（米）
    pub fn used_meters(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.count as f64 * e.spec.meters_per_unit)
            .sum()
    }

    /// 生成产出明细
    pub fn into_lines(self) -> Vec<ProductionLine> {
        self.entries
            .into_iter()
            .map(|e| ProductionLine {
                total_meters: e.count as f64 * e.spec.meters_per_unit,
                total_profit: e.count as f64 * e.spec.profit_per_unit,
                size: e.spec.size,
                count: e.count,
                meters_per_unit: e.spec.meters_per_unit,
                profit_per_unit: e.spec.profit_per_unit,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_merges_same_size() {
        let s = SizeSpec::new("S", 1.5, 45000.0);
        let m = SizeSpec::new("M", 2.0, 55000.0);
        let mut ledger = AllocationLedger::new(10.0);

        ledger.record(&s, 3).unwrap();
        ledger.record(&m, 2).unwrap();
        ledger.record(&s, 1).unwrap();
        ledger.record(&m, 0).unwrap();

        assert_eq!(ledger.count_of("S"), 4);
        assert_eq!(ledger.count_of("M"), 2);
        assert_eq!(ledger.total_garments(), 6);
        assert_eq!(ledger.total_profit(), 290000.0);
        assert!(ledger.remaining_meters().abs() < 1e-9);

        let lines = ledger.into_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].size, "S");
        assert_eq!(lines[1].size, "M");
    }

    #[test]
    fn test_record_overflow_leaves_ledger_unchanged() {
        let s = SizeSpec::new("S", 1e-6, 1.0);
        let m = SizeSpec::new("M", 1e-6, 1.0);
        let mut ledger = AllocationLedger::new(1e20);

        ledger.record(&s, u64::MAX - 1).unwrap();
        let err = ledger.record(&m, 2).unwrap_err();
        assert!(matches!(
            err,
            AllocationError::ComputationFailure {
                cause: ComputationCause::CountOverflow { .. },
                ..
            }
        ));

        assert_eq!(ledger.total_garments(), u64::MAX - 1);
        assert_eq!(ledger.count_of("M"), 0);
        assert_eq!(ledger.into_lines().len(), 1);
    }
}
