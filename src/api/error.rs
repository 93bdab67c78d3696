// ==========================================
// 服装裁剪排产系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换下层错误为用户友好的错误消息
// ==========================================

use crate::catalog::CatalogError;
use crate::engine::error::AllocationError;
use crate::i18n::{t, t_with_args};
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("面料不存在: {0}")]
    MaterialNotFound(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 分配请求未通过校验（未做任何分配）
    #[error("分配校验失败: {0}")]
    AllocationRejected(#[source] AllocationError),

    /// 分配计算失败（面料参数异常等）
    #[error("分配计算失败: {0}")]
    AllocationFailed(#[source] AllocationError),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AllocationError> for ApiError {
    fn from(err: AllocationError) -> Self {
        if err.is_validation() {
            ApiError::AllocationRejected(err)
        } else {
            ApiError::AllocationFailed(err)
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(repo_err) => repo_err.into(),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

impl ApiError {
    /// 面向用户的本地化提示
    pub fn user_message(&self) -> String {
        match self {
            ApiError::AllocationRejected(err) | ApiError::AllocationFailed(err) => match err {
                AllocationError::InvalidQuantity { total_meters } => t_with_args(
                    "allocation.invalid_quantity",
                    &[("total", total_meters.to_string().as_str())],
                ),
                AllocationError::InvalidFocusSizes { material, .. } => t_with_args(
                    "allocation.invalid_focus_sizes",
                    &[("material", material.as_str())],
                ),
                AllocationError::PercentageExceeded { total_pct } => t_with_args(
                    "allocation.percentage_exceeded",
                    &[("total", format!("{:.2}", total_pct).as_str())],
                ),
                AllocationError::InvalidPercentage { size, reason } => t_with_args(
                    "allocation.invalid_percentage",
                    &[("size", size.as_str()), ("reason", reason.as_str())],
                ),
                AllocationError::ComputationFailure { cause, .. } => t_with_args(
                    "allocation.computation_failure",
                    &[("cause", cause.to_string().as_str())],
                ),
            },
            ApiError::MaterialNotFound(name) => {
                t_with_args("catalog.material_not_found", &[("name", name.as_str())])
            }
            ApiError::InvalidInput(msg) => t_with_args("common.invalid_input", &[("message", msg.as_str())]),
            other => t_with_args("common.error", &[("message", other.to_string().as_str())]),
        }
    }

    /// 通用失败提示（无细节）
    pub fn generic_message() -> String {
        t("common.failed")
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
