// ==========================================
// 服装裁剪排产系统 - 领域类型定义
// ==========================================
// 面料弹性等级、分配阶段、贪心兜底模式
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 面料弹性 (Elasticity)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Elasticity {
    Low,          // 低
    LowToMedium,  // 低到中
    Medium,       // 中
    High,         // 高
}

impl Elasticity {
    /// 数据库存储格式
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Elasticity::Low => "LOW",
            Elasticity::LowToMedium => "LOW_TO_MEDIUM",
            Elasticity::Medium => "MEDIUM",
            Elasticity::High => "HIGH",
        }
    }
}

impl fmt::Display for Elasticity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl FromStr for Elasticity {
    type Err = String;

    /// 兼容数据库格式与面料表中的印尼语标注（Rendah/Sedang/Tinggi）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "LOW" | "RENDAH" => Ok(Elasticity::Low),
            "LOW_TO_MEDIUM" | "RENDAH_HINGGA_SEDANG" => Ok(Elasticity::LowToMedium),
            "MEDIUM" | "SEDANG" => Ok(Elasticity::Medium),
            "HIGH" | "TINGGI" => Ok(Elasticity::High),
            _ => Err(format!("未知弹性等级: {}", s)),
        }
    }
}

// ==========================================
// 分配阶段 (Allocation Phase)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationPhase {
    Percentage, // 按比例预分配
    Greedy,     // 净利率贪心
    Remainder,  // 余料压缩
}

impl fmt::Display for AllocationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationPhase::Percentage => write!(f, "PERCENTAGE"),
            AllocationPhase::Greedy => write!(f, "GREEDY"),
            AllocationPhase::Remainder => write!(f, "REMAINDER"),
        }
    }
}

// ==========================================
// 贪心兜底模式 (Greedy Fallback)
// ==========================================
// 单阶段贪心保留"整件兜底"分支；比例预分配之后的贪心不启用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GreedyFallback {
    SingleUnit, // 单阶段: count==0 且余料够一件时补一件
    Disabled,   // 比例阶段之后: 不够一件直接跳过
}
