// ==========================================
// 营收数据导入 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把导入/仓储错误转换为面向调用方的错误消息
// 红线: 所有错误信息必须包含显式原因
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入与业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("导入提交失败: {0}")]
    CommitFailed(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("约束违反: {}", msg))
            }
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            e @ (ImportError::MissingField { .. } | ImportError::InvalidMonth { .. }) => {
                ApiError::ValidationError(e.to_string())
            }
            ImportError::InvalidDecision(msg) => ApiError::InvalidInput(msg),
            ImportError::CommitFailure(repo_err) => {
                ApiError::CommitFailed(ApiError::from(repo_err).to_string())
            }
            ImportError::ConfigReadError { key, message } => {
                ApiError::ConfigError(format!("{}: {}", key, message))
            }
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
