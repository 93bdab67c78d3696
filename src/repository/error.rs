// ==========================================
// 服装裁剪排产系统 - 仓储层错误类型
// ==========================================

use crate::catalog::CatalogError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    /// 主键/外键/非空等约束冲突（如重复导入同名尺码）
    #[error("约束冲突 ({constraint}): {message}")]
    ConstraintViolation { constraint: String, message: String },

    #[error("数据库操作失败: {0}")]
    DatabaseError(String),

    /// 库中数据无法还原为领域对象（如弹性等级代码未知）
    #[error("字段值错误 (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    #[error("排产记录 JSON 编解码失败: {0}")]
    SerializationError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let message = msg.unwrap_or_else(|| code.to_string());
                let constraint = ["UNIQUE", "FOREIGN KEY", "NOT NULL", "CHECK"]
                    .into_iter()
                    .find(|kind| message.contains(kind))
                    .unwrap_or("CONSTRAINT")
                    .to_string();
                RepositoryError::ConstraintViolation { constraint, message }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "row".to_string(),
                id: "-".to_string(),
            },
            other => RepositoryError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::SerializationError(err.to_string())
    }
}

// MaterialRepository 作为 FabricCatalog 使用时的错误转换
impl From<RepositoryError> for CatalogError {
    fn from(err: RepositoryError) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
