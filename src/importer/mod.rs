// ==========================================
// 服装裁剪排产系统 - 导入层
// ==========================================
// 职责: 外部面料目录导入
// 支持: CSV
// ==========================================

pub mod catalog_csv;
pub mod error;

// 重导出核心类型
pub use catalog_csv::{CatalogCsvImporter, CatalogImportSummary};
pub use error::{ImportError, ImportResult};
