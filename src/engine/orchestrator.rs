// ==========================================
// 服装裁剪排产系统 - 分配编排器
// ==========================================
// 用途: 协调三个分配引擎的执行顺序
// 流程: 输入校验 → 比例预分配(可选) → 净利率贪心 → 余料压缩(可选) → 完成
// 红线: 校验失败时不做任何分配；编排器无状态，可并发调用
// ==========================================

use crate::config::AllocationConfig;
use crate::domain::allocation::{AllocationRequest, AllocationResult};
use crate::domain::material::{MaterialProfile, SizeSpec};
use crate::domain::types::{AllocationPhase, GreedyFallback};
use crate::engine::error::{AllocationError, AllocationOutcome, ComputationCause};
use crate::engine::greedy::ProfitRatioGreedyAllocator;
use crate::engine::ledger::AllocationLedger;
use crate::engine::percentage::PercentageAllocator;
use crate::engine::remainder::RemainderMinimizer;
use tracing::{debug, info, instrument};

// ==========================================
// AllocationOrchestrator - 分配编排器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AllocationOrchestrator {
    config: AllocationConfig,
    percentage: PercentageAllocator,
    greedy: ProfitRatioGreedyAllocator,
    remainder: RemainderMinimizer,
}

impl AllocationOrchestrator {
    /// 创建新的编排器实例
    pub fn new(config: AllocationConfig) -> Self {
        Self {
            config,
            percentage: PercentageAllocator::new(),
            greedy: ProfitRatioGreedyAllocator::new(),
            remainder: RemainderMinimizer::new(),
        }
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// 执行完整分配流程
    ///
    /// # 参数
    /// - profile: 面料档案（已由调用方从面料目录解析）
    /// - request: 分配请求
    ///
    /// # 返回
    /// - Ok(AllocationResult): 分配结果
    /// - Err(AllocationError): 校验失败或计算失败（不含部分结果）
    #[instrument(skip(self, profile, request), fields(
        material = %profile.name,
        total_meters = request.total_meters
    ))]
    pub fn allocate(
        &self,
        profile: &MaterialProfile,
        request: &AllocationRequest,
    ) -> AllocationOutcome<AllocationResult> {
        // ==========================================
        // 步骤1: 输入校验
        // ==========================================
        let sizes = self.validate(profile, request)?;
        debug!(
            sizes = ?sizes.iter().map(|s| s.size.as_str()).collect::<Vec<_>>(),
            "输入校验通过"
        );

        let mut ledger = AllocationLedger::new(request.total_meters);
        let mut phases = Vec::with_capacity(3);

        // ==========================================
        // 步骤2: 比例预分配 + 贪心
        // ==========================================
        if request.has_active_percentages() {
            self.percentage.allocate(&mut ledger, &sizes, request)?;
            phases.push(AllocationPhase::Percentage);

            self.greedy.allocate(
                &mut ledger,
                &sizes,
                profile.price_per_meter,
                GreedyFallback::Disabled,
            )?;
        } else {
            self.greedy.allocate(
                &mut ledger,
                &sizes,
                profile.price_per_meter,
                GreedyFallback::SingleUnit,
            )?;
        }
        phases.push(AllocationPhase::Greedy);

        // ==========================================
        // 步骤3: 余料压缩
        // ==========================================
        if request.minimize_remainder && ledger.remaining_meters() > 0.0 {
            self.remainder.minimize(&mut ledger, &sizes, true)?;
            phases.push(AllocationPhase::Remainder);
        }

        // ==========================================
        // 步骤4: 守恒校验 + 结果组装
        // ==========================================
        let used_meters = ledger.used_meters();
        let remaining_meters = ledger.remaining_meters();
        // 容差按面料总量缩放（不足 1 米按 1 米计）
        let tolerance = self.config.effective_tolerance() * request.total_meters.max(1.0);
        if (used_meters + remaining_meters - request.total_meters).abs() > tolerance {
            return Err(AllocationError::computation(
                format!("material={}", profile.name),
                ComputationCause::ConservationViolated {
                    total_meters: request.total_meters,
                    used_meters,
                    remaining_meters,
                },
            ));
        }

        let total_profit = ledger.total_profit();
        let result = AllocationResult {
            material: profile.name.clone(),
            total_meters: request.total_meters,
            lines: ledger.into_lines(),
            total_profit,
            remaining_meters,
            phases,
        };

        info!(
            garments = result.total_garments(),
            total_profit = result.total_profit,
            remaining_meters = result.remaining_meters,
            "分配完成"
        );
        Ok(result)
    }

    /// 输入校验，返回解析后的关注尺码（面料表声明顺序）
    ///
    /// 顺序: 面料总量 → 关注尺码 → 面料参数 → 比例设置
    pub fn validate<'a>(
        &self,
        profile: &'a MaterialProfile,
        request: &AllocationRequest,
    ) -> AllocationOutcome<Vec<&'a SizeSpec>> {
        if !request.total_meters.is_finite() || request.total_meters <= 0.0 {
            return Err(AllocationError::InvalidQuantity {
                total_meters: request.total_meters,
            });
        }

        let sizes: Vec<&SizeSpec> = match &request.focus_sizes {
            None => profile.sizes.iter().collect(),
            Some(focus) => profile
                .sizes
                .iter()
                .filter(|s| focus.iter().any(|f| f == &s.size))
                .collect(),
        };
        if sizes.is_empty() {
            return Err(AllocationError::InvalidFocusSizes {
                material: profile.name.clone(),
                requested: request.focus_sizes.clone().unwrap_or_default(),
            });
        }

        self.validate_material(profile, &sizes)?;

        if let Some(percentages) = &request.percentage_by_size {
            self.percentage.validate(percentages, &sizes)?;
        }

        Ok(sizes)
    }

    /// 面料参数校验（面料目录数据异常归为计算失败）
    fn validate_material(&self, profile: &MaterialProfile, sizes: &[&SizeSpec]) -> AllocationOutcome<()> {
        let context = format!("material={}", profile.name);

        if !profile.price_per_meter.is_finite() {
            return Err(AllocationError::computation(
                context,
                ComputationCause::NonFiniteValue {
                    field: "price_per_meter".to_string(),
                    value: profile.price_per_meter,
                },
            ));
        }
        if profile.price_per_meter < 0.0 {
            return Err(AllocationError::computation(
                context,
                ComputationCause::NegativePricePerMeter {
                    price_per_meter: profile.price_per_meter,
                },
            ));
        }

        for spec in sizes {
            if !spec.meters_per_unit.is_finite() {
                return Err(AllocationError::computation(
                    context,
                    ComputationCause::NonFiniteValue {
                        field: format!("meters_per_unit[{}]", spec.size),
                        value: spec.meters_per_unit,
                    },
                ));
            }
            if spec.meters_per_unit <= 0.0 {
                return Err(AllocationError::computation(
                    context,
                    ComputationCause::NonPositiveMetersPerUnit {
                        size: spec.size.clone(),
                        meters_per_unit: spec.meters_per_unit,
                    },
                ));
            }
            if !spec.profit_per_unit.is_finite() {
                return Err(AllocationError::computation(
                    context,
                    ComputationCause::NonFiniteValue {
                        field: format!("profit_per_unit[{}]", spec.size),
                        value: spec.profit_per_unit,
                    },
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Elasticity;

    fn katun() -> MaterialProfile {
        MaterialProfile {
            name: "Katun".to_string(),
            sizes: vec![
                SizeSpec::new("S", 1.5, 45000.0),
                SizeSpec::new("M", 2.0, 55000.0),
                SizeSpec::new("L", 2.5, 65000.0),
                SizeSpec::new("XL", 3.0, 75000.0),
            ],
            price_per_meter: 20000.0,
            elasticity: Elasticity::Low,
            recommended_uses: vec![],
        }
    }

    #[test]
    fn test_validate_resolves_focus_in_catalog_order() {
        let profile = katun();
        let request = AllocationRequest::new("Katun", 10.0).with_focus_sizes(&["XL", "S", "XXL"]);
        let sizes = AllocationOrchestrator::default()
            .validate(&profile, &request)
            .unwrap();
        let codes: Vec<&str> = sizes.iter().map(|s| s.size.as_str()).collect();
        assert_eq!(codes, vec!["S", "XL"]);
    }

    #[test]
    fn test_validate_rejects_zero_meters_per_unit() {
        let mut profile = katun();
        profile.sizes[1].meters_per_unit = 0.0;
        let err = AllocationOrchestrator::default()
            .allocate(&profile, &AllocationRequest::new("Katun", 10.0))
            .unwrap_err();
        assert!(matches!(
            err,
            AllocationError::ComputationFailure {
                cause: ComputationCause::NonPositiveMetersPerUnit { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_unfocused_broken_size_is_ignored() {
        // 未关注的尺码参数异常不影响本次分配
        let mut profile = katun();
        profile.sizes[3].meters_per_unit = -1.0;
        let request = AllocationRequest::new("Katun", 10.0).with_focus_sizes(&["S", "M"]);
        let result = AllocationOrchestrator::default()
            .allocate(&profile, &request)
            .unwrap();
        assert_eq!(result.count_of("S"), 6);
    }

    #[test]
    fn test_phases_recorded() {
        let profile = katun();
        let request = AllocationRequest::new("Katun", 10.0)
            .with_percentages(&[("S", 50.0), ("M", 50.0)])
            .with_minimize_remainder(true);
        let result = AllocationOrchestrator::default()
            .allocate(&profile, &request)
            .unwrap();
        // 比例+贪心后余料为 0，余料压缩不执行
        assert_eq!(
            result.phases,
            vec![AllocationPhase::Percentage, AllocationPhase::Greedy]
        );
    }

    #[test]
    fn test_conservation_tolerance_scales_with_total() {
        // 1e18 米时浮点舍入误差远大于 1e-6，容差需按总量缩放
        let result = AllocationOrchestrator::default()
            .allocate(&katun(), &AllocationRequest::new("Katun", 1e18))
            .unwrap();
        assert!(result.count_of("S") > 600_000_000_000_000_000);
        let drift = (result.used_meters() + result.remaining_meters - 1e18).abs();
        assert!(drift <= 1e-6 * 1e18);
    }

    #[test]
    fn test_tiny_configured_tolerance_is_floored() {
        let config = AllocationConfig {
            conservation_tolerance: 1e-300,
            ..AllocationConfig::default()
        };
        let result = AllocationOrchestrator::new(config)
            .allocate(&katun(), &AllocationRequest::new("Katun", 10.0))
            .unwrap();
        assert_eq!(result.count_of("S"), 6);
    }
}
