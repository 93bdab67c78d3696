// ==========================================
// 服装裁剪排产系统 - 内置面料数据
// ==========================================
// 七种常用面料，尺码 S/M/L/XL；金额单位: 印尼盾
// ==========================================

use crate::catalog::InMemoryCatalog;
use crate::domain::material::{MaterialProfile, SizeSpec};
use crate::domain::types::Elasticity;

const SIZE_CODES: [&str; 4] = ["S", "M", "L", "XL"];

fn material(
    name: &str,
    meters: [f64; 4],
    profits: [f64; 4],
    price_per_meter: f64,
    elasticity: Elasticity,
    uses: &[&str],
) -> MaterialProfile {
    MaterialProfile {
        name: name.to_string(),
        sizes: SIZE_CODES
            .iter()
            .zip(meters.iter().zip(profits.iter()))
            .map(|(size, (m, p))| SizeSpec::new(size, *m, *p))
            .collect(),
        price_per_meter,
        elasticity,
        recommended_uses: uses.iter().map(|u| u.to_string()).collect(),
    }
}

/// 内置面料档案
pub fn builtin_materials() -> Vec<MaterialProfile> {
    vec![
        material(
            "Katun",
            [1.5, 2.0, 2.5, 3.0],
            [45000.0, 55000.0, 65000.0, 75000.0],
            20000.0,
            Elasticity::Low,
            &["Kemeja", "Baju santai", "Celana panjang"],
        ),
        material(
            "Polyester",
            [1.2, 1.8, 2.2, 2.8],
            [35000.0, 45000.0, 55000.0, 65000.0],
            15000.0,
            Elasticity::Medium,
            &["Seragam", "Jas", "Pakaian formal"],
        ),
        material(
            "Rayon",
            [1.4, 1.9, 2.4, 2.9],
            [40000.0, 50000.0, 60000.0, 70000.0],
            18000.0,
            Elasticity::Low,
            &["Dress", "Blus", "Atasan santai"],
        ),
        material(
            "Wool",
            [1.6, 2.1, 2.6, 3.1],
            [55000.0, 65000.0, 75000.0, 85000.0],
            32000.0,
            Elasticity::Low,
            &["Jas", "Jaket tebal", "Celana formal musim dingin"],
        ),
        material(
            "Spandex",
            [1.0, 1.4, 1.8, 2.2],
            [50000.0, 60000.0, 70000.0, 80000.0],
            23000.0,
            Elasticity::High,
            &["Legging", "Baju olahraga", "Swimsuit"],
        ),
        material(
            "Linen",
            [1.7, 2.2, 2.7, 3.2],
            [60000.0, 70000.0, 80000.0, 90000.0],
            25000.0,
            Elasticity::Low,
            &["Gaun", "Setelan ringan", "Kemeja premium"],
        ),
        material(
            "Denim",
            [1.8, 2.3, 2.8, 3.3],
            [65000.0, 75000.0, 85000.0, 95000.0],
            38000.0,
            Elasticity::LowToMedium,
            &["Jeans", "Rok denim", "Jaket jeans"],
        ),
    ]
}

/// 内置面料目录
pub fn builtin_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(builtin_materials())
}

/// 默认产品列表
pub fn default_products() -> Vec<String> {
    [
        "Kemeja",
        "Celana panjang",
        "Seragam",
        "Dress",
        "Blus",
        "Jas",
        "Legging",
        "Gaun",
        "Jeans",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}
