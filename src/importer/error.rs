// ==========================================
// 营收数据导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 行级错误（丢弃该行,批次继续） =====
    #[error("必填字段缺失 (行 {row}): {field}")]
    MissingField { row: usize, field: String },

    #[error("月份无法识别 (行 {row}): {value}")]
    InvalidMonth { row: usize, value: String },

    // ===== 用户决策错误 =====
    #[error("用户决策无效: {0}")]
    InvalidDecision(String),

    // ===== 提交失败（整批回滚） =====
    #[error("批次提交失败: {0}")]
    CommitFailure(#[from] RepositoryError),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ImportError {
    /// 行级错误：只丢弃当前行,不中断批次
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            ImportError::MissingField { .. } | ImportError::InvalidMonth { .. }
        )
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
