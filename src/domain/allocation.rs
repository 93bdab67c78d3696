// ==========================================
// 服装裁剪排产系统 - 分配请求与分配结果
// ==========================================
// 职责: 单次分配的输入/输出载体
// 红线: 请求构造后不再修改；结果生成后不可变
// ==========================================

use crate::domain::types::AllocationPhase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// AllocationRequest - 分配请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// 面料总量（米），必须 > 0
    pub total_meters: f64,
    /// 面料名称
    pub material: String,
    /// 关注尺码（None = 面料全部尺码；Some(空) 会被拒绝）
    #[serde(default)]
    pub focus_sizes: Option<Vec<String>>,
    /// 尺码 → 百分比（0~100，合计 ≤ 100）
    #[serde(default)]
    pub percentage_by_size: Option<BTreeMap<String, f64>>,
    /// 是否启用余料压缩
    #[serde(default)]
    pub minimize_remainder: bool,
}

impl AllocationRequest {
    pub fn new(material: &str, total_meters: f64) -> Self {
        Self {
            total_meters,
            material: material.to_string(),
            focus_sizes: None,
            percentage_by_size: None,
            minimize_remainder: false,
        }
    }

    pub fn with_focus_sizes<S: AsRef<str>>(mut self, sizes: &[S]) -> Self {
        self.focus_sizes = Some(sizes.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    pub fn with_percentages<S: AsRef<str>>(mut self, percentages: &[(S, f64)]) -> Self {
        self.percentage_by_size = Some(
            percentages
                .iter()
                .map(|(s, p)| (s.as_ref().to_string(), *p))
                .collect(),
        );
        self
    }

    pub fn with_minimize_remainder(mut self, enabled: bool) -> Self {
        self.minimize_remainder = enabled;
        self
    }

    /// 指定尺码的百分比（未填写视为 0）
    pub fn percentage_for(&self, size: &str) -> f64 {
        self.percentage_by_size
            .as_ref()
            .and_then(|m| m.get(size).copied())
            .unwrap_or(0.0)
    }

    /// 是否存在有效的比例设置（至少一个正值）
    pub fn has_active_percentages(&self) -> bool {
        self.percentage_by_size
            .as_ref()
            .map(|m| m.values().any(|v| *v > 0.0))
            .unwrap_or(false)
    }
}

// ==========================================
// ProductionLine - 单尺码产出明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionLine {
    pub size: String,
    pub count: u64,
    pub meters_per_unit: f64,
    pub total_meters: f64,
    pub profit_per_unit: f64,
    pub total_profit: f64,
}

/// 面料使用占比（尺码或余料）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageShare {
    /// 尺码代码；余料为 None
    pub size: Option<String>,
    pub meters: f64,
    /// 占总面料百分比
    pub share_pct: f64,
}

// ==========================================
// AllocationResult - 分配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub material: String,
    pub total_meters: f64,
    /// 产出明细（按首次分配顺序，仅含实际产出的尺码）
    pub lines: Vec<ProductionLine>,
    pub total_profit: f64,
    pub remaining_meters: f64,
    /// 实际执行过的阶段
    pub phases: Vec<AllocationPhase>,
}

impl AllocationResult {
    /// 尺码 → 件数
    pub fn counts_by_size(&self) -> Vec<(String, u64)> {
        self.lines
            .iter()
            .map(|l| (l.size.clone(), l.count))
            .collect()
    }

    /// 指定尺码件数（未产出为 0）
    pub fn count_of(&self, size: &str) -> u64 {
        self.lines
            .iter()
            .find(|l| l.size == size)
            .map(|l| l.count)
            .unwrap_or(0)
    }

    /// 总件数
    ///
    /// 引擎产出的结果已由分配台账保证不溢出；从记录中载入的异常数据取 u64::MAX
    pub fn total_garments(&self) -> u64 {
        self.lines
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.count))
    }

    /// 已用面料（米）
    pub fn used_meters(&self) -> f64 {
        self.lines.iter().map(|l| l.total_meters).sum()
    }

    /// 面料利用率（%）
    pub fn efficiency_pct(&self) -> f64 {
        if self.total_meters <= 0.0 {
            return 0.0;
        }
        (self.total_meters - self.remaining_meters) / self.total_meters * 100.0
    }

    /// 面料使用占比（各尺码 + 余料）
    pub fn usage_shares(&self) -> Vec<UsageShare> {
        let share = |meters: f64| {
            if self.total_meters > 0.0 {
                meters / self.total_meters * 100.0
            } else {
                0.0
            }
        };

        let mut shares: Vec<UsageShare> = self
            .lines
            .iter()
            .map(|l| UsageShare {
                size: Some(l.size.clone()),
                meters: l.total_meters,
                share_pct: share(l.total_meters),
            })
            .collect();
        shares.push(UsageShare {
            size: None,
            meters: self.remaining_meters,
            share_pct: share(self.remaining_meters),
        });
        shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(size: &str, count: u64, m: f64, p: f64) -> ProductionLine {
        ProductionLine {
            size: size.to_string(),
            count,
            meters_per_unit: m,
            total_meters: m * count as f64,
            profit_per_unit: p,
            total_profit: p * count as f64,
        }
    }

    #[test]
    fn test_request_percentage_helpers() {
        let req = AllocationRequest::new("Katun", 10.0).with_percentages(&[("S", 0.0), ("M", 0.0)]);
        assert!(!req.has_active_percentages());
        assert_eq!(req.percentage_for("L"), 0.0);

        let req = req.with_percentages(&[("S", 40.0)]);
        assert!(req.has_active_percentages());
        assert_eq!(req.percentage_for("S"), 40.0);
    }

    #[test]
    fn test_result_derived_figures() {
        let result = AllocationResult {
            material: "Katun".to_string(),
            total_meters: 10.0,
            lines: vec![line("S", 4, 1.5, 45000.0), line("M", 1, 2.0, 55000.0)],
            total_profit: 235000.0,
            remaining_meters: 2.0,
            phases: vec![AllocationPhase::Greedy],
        };

        assert_eq!(result.count_of("S"), 4);
        assert_eq!(result.count_of("XL"), 0);
        assert_eq!(result.total_garments(), 5);
        assert!((result.used_meters() - 8.0).abs() < 1e-9);
        assert!((result.efficiency_pct() - 80.0).abs() < 1e-9);

        let shares = result.usage_shares();
        assert_eq!(shares.len(), 3);
        assert_eq!(shares[2].size, None);
        assert!((shares[2].share_pct - 20.0).abs() < 1e-9);
        let total: f64 = shares.iter().map(|s| s.share_pct).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_garments_beyond_u32() {
        let result = AllocationResult {
            material: "Katun".to_string(),
            total_meters: 2e10,
            lines: vec![
                line("S", 3_000_000_000, 1.5, 45000.0),
                line("M", 3_000_000_000, 2.0, 55000.0),
            ],
            total_profit: 0.0,
            remaining_meters: 0.0,
            phases: vec![AllocationPhase::Greedy],
        };
        assert_eq!(result.total_garments(), 6_000_000_000);
    }
}
