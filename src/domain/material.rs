// ==========================================
// 服装裁剪排产系统 - 面料实体
// ==========================================
// 职责: 面料参数（按尺码的用料/利润、单价、弹性、推荐用途）
// 红线: 尺码顺序即面料表声明顺序，排序并列与最小值选择依赖此顺序
// ==========================================

use crate::domain::types::Elasticity;
use serde::{Deserialize, Serialize};

// ==========================================
// SizeSpec - 单尺码参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeSpec {
    /// 尺码代码（S/M/L/XL）
    pub size: String,
    /// 每件用料（米），必须 > 0
    pub meters_per_unit: f64,
    /// 每件利润
    pub profit_per_unit: f64,
}

impl SizeSpec {
    pub fn new(size: &str, meters_per_unit: f64, profit_per_unit: f64) -> Self {
        Self {
            size: size.to_string(),
            meters_per_unit,
            profit_per_unit,
        }
    }
}

// ==========================================
// MaterialProfile - 面料档案（只读）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProfile {
    /// 面料名称（主键）
    pub name: String,
    /// 尺码参数（有序）
    pub sizes: Vec<SizeSpec>,
    /// 每米单价
    pub price_per_meter: f64,
    /// 弹性
    pub elasticity: Elasticity,
    /// 推荐用途（有序）
    #[serde(default)]
    pub recommended_uses: Vec<String>,
}

impl MaterialProfile {
    /// 按尺码查找参数
    pub fn size(&self, size: &str) -> Option<&SizeSpec> {
        self.sizes.iter().find(|s| s.size == size)
    }

    pub fn has_size(&self, size: &str) -> bool {
        self.size(size).is_some()
    }

    /// 尺码代码（声明顺序）
    pub fn size_codes(&self) -> impl Iterator<Item = &str> {
        self.sizes.iter().map(|s| s.size.as_str())
    }

    /// 是否推荐用于指定产品
    pub fn is_recommended_for(&self, product: &str) -> bool {
        self.recommended_uses.iter().any(|p| p == product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MaterialProfile {
        MaterialProfile {
            name: "Katun".to_string(),
            sizes: vec![SizeSpec::new("S", 1.5, 45000.0), SizeSpec::new("M", 2.0, 55000.0)],
            price_per_meter: 20000.0,
            elasticity: Elasticity::Low,
            recommended_uses: vec!["Kemeja".to_string()],
        }
    }

    #[test]
    fn test_size_lookup_keeps_declared_order() {
        let m = sample();
        assert_eq!(m.size_codes().collect::<Vec<_>>(), vec!["S", "M"]);
        assert_eq!(m.size("M").map(|s| s.meters_per_unit), Some(2.0));
        assert!(!m.has_size("XL"));
        assert!(m.is_recommended_for("Kemeja"));
        assert!(!m.is_recommended_for("Jeans"));
    }
}
