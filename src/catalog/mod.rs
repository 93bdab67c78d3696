// ==========================================
// 服装裁剪排产系统 - 面料目录
// ==========================================
// 职责: 面料档案只读查询 + 按产品推荐面料
// 实现: InMemoryCatalog（内置/导入数据）、MaterialRepository（SQLite）
// ==========================================

pub mod builtin;

use crate::domain::material::MaterialProfile;
use thiserror::Error;

pub use builtin::{builtin_catalog, builtin_materials, default_products};

/// 面料目录错误
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("面料目录读取失败: {0}")]
    Storage(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

// ==========================================
// FabricCatalog - 面料目录接口
// ==========================================
pub trait FabricCatalog: Send + Sync {
    /// 按名称查询面料档案
    fn get_material(&self, name: &str) -> CatalogResult<Option<MaterialProfile>>;

    /// 全部面料（目录声明顺序）
    fn list_materials(&self) -> CatalogResult<Vec<MaterialProfile>>;

    /// 全部面料名称（目录声明顺序）
    fn material_names(&self) -> CatalogResult<Vec<String>> {
        Ok(self
            .list_materials()?
            .into_iter()
            .map(|m| m.name)
            .collect())
    }
}

/// 按产品推荐面料
///
/// 返回推荐用途包含该产品的面料名称；无匹配时返回全部面料名称
pub fn recommend<C: FabricCatalog + ?Sized>(
    catalog: &C,
    product: &str,
) -> CatalogResult<Vec<String>> {
    let materials = catalog.list_materials()?;
    let matched: Vec<String> = materials
        .iter()
        .filter(|m| m.is_recommended_for(product))
        .map(|m| m.name.clone())
        .collect();

    if matched.is_empty() {
        Ok(materials.into_iter().map(|m| m.name).collect())
    } else {
        Ok(matched)
    }
}

// ==========================================
// InMemoryCatalog - 内存面料目录
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    materials: Vec<MaterialProfile>,
}

impl InMemoryCatalog {
    pub fn new(materials: Vec<MaterialProfile>) -> Self {
        Self { materials }
    }

    /// 新增或替换面料（替换时保持原位置）
    pub fn upsert(&mut self, profile: MaterialProfile) {
        match self.materials.iter_mut().find(|m| m.name == profile.name) {
            Some(existing) => *existing = profile,
            None => self.materials.push(profile),
        }
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl FabricCatalog for InMemoryCatalog {
    fn get_material(&self, name: &str) -> CatalogResult<Option<MaterialProfile>> {
        Ok(self.materials.iter().find(|m| m.name == name).cloned())
    }

    fn list_materials(&self) -> CatalogResult<Vec<MaterialProfile>> {
        Ok(self.materials.clone())
    }
}
