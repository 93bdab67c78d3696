// ==========================================
// 服装裁剪排产系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败 (行 {row}): {message}")]
    CsvParseError { row: usize, message: String },

    #[error("文件无数据行")]
    EmptyFile,

    // ===== 数据质量错误 =====
    #[error("字段值错误 (行 {row}, 字段 {field}): {message}")]
    FieldValueError {
        row: usize,
        field: String,
        message: String,
    },

    #[error("面料参数不一致 (行 {row}, 面料 {material}, 字段 {field})")]
    InconsistentMaterial {
        row: usize,
        material: String,
        field: String,
    },

    #[error("尺码重复 (行 {row}): material={material}, size={size}")]
    DuplicateSize {
        row: usize,
        material: String,
        size: String,
    },

    // ===== 数据库错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
