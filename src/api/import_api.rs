// ==========================================
// 服装裁剪排产系统 - 面料目录导入 API
// ==========================================
// 职责: 封装 CSV 面料目录导入（解析 → 校验 → 覆盖写入）
// ==========================================

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::importer::CatalogCsvImporter;
use crate::repository::MaterialRepository;

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 写入的面料数量
    pub materials: usize,
    /// 写入的尺码行数量
    pub sizes: usize,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

pub struct ImportApi {
    material_repo: Arc<MaterialRepository>,
    importer: CatalogCsvImporter,
}

impl ImportApi {
    pub fn new(material_repo: Arc<MaterialRepository>) -> Self {
        Self {
            material_repo,
            importer: CatalogCsvImporter::new(),
        }
    }

    /// 导入面料目录 CSV
    ///
    /// # 返回
    /// - Err(ApiError::InvalidInput): 路径为空
    /// - Err(ApiError::ImportError): 文件或数据不合法（解析失败时不写入任何面料）
    pub fn import_catalog(&self, file_path: &str) -> ApiResult<ImportApiResponse> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }

        let started = Instant::now();
        let summary = self
            .importer
            .import_into(&self.material_repo, Path::new(file_path))?;
        let elapsed_ms = started.elapsed().as_millis() as i64;

        info!(file_path, elapsed_ms, "面料目录导入API完成");
        Ok(ImportApiResponse {
            materials: summary.materials,
            sizes: summary.sizes,
            elapsed_ms,
        })
    }
}
