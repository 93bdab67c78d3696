// ==========================================
// 服装裁剪排产系统 - 余料压缩引擎
// ==========================================
// 职责: 用余料追加裁剪用料最少的尺码，减少浪费
// 红线: 只增不减（利润不降、余料不增）
// ==========================================

use crate::domain::material::SizeSpec;
use crate::engine::error::AllocationOutcome;
use crate::engine::ledger::AllocationLedger;
use crate::engine::ratio::checked_units;
use tracing::{debug, instrument};

#[derive(Debug, Default, Clone, Copy)]
pub struct RemainderMinimizer {
    // 无状态引擎
}

impl RemainderMinimizer {
    pub fn new() -> Self {
        Self {}
    }

    /// 用料最少的尺码；并列时取关注尺码中最先出现者
    pub fn cheapest_size<'a>(&self, sizes: &[&'a SizeSpec]) -> Option<&'a SizeSpec> {
        let mut cheapest: Option<&'a SizeSpec> = None;
        for &spec in sizes {
            match cheapest {
                Some(current) if spec.meters_per_unit >= current.meters_per_unit => {}
                _ => cheapest = Some(spec),
            }
        }
        cheapest
    }

    /// 执行余料压缩
    ///
    /// # 返回
    /// 追加的件数（未执行或余料不足一件时为 0）
    #[instrument(skip(self, ledger, sizes), fields(remaining = ledger.remaining_meters()))]
    pub fn minimize(
        &self,
        ledger: &mut AllocationLedger,
        sizes: &[&SizeSpec],
        enabled: bool,
    ) -> AllocationOutcome<u64> {
        if !enabled || ledger.remaining_meters() <= 0.0 {
            return Ok(0);
        }

        let Some(spec) = self.cheapest_size(sizes) else {
            return Ok(0);
        };

        let extra = checked_units(spec, ledger.remaining_meters())?;
        if extra > 0 {
            debug!(size = %spec.size, extra, "余料压缩追加");
            ledger.record(spec, extra)?;
        }
        Ok(extra)
    }
}
