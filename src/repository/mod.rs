// ==========================================
// 营收数据导入 - 仓储层
// ==========================================
// 职责: 数据访问,不含业务规则
// 存储: SQLite (rusqlite)
// ==========================================

pub mod error;
pub mod revenue_repo;
pub mod revenue_repo_impl;

pub use error::{RepositoryError, RepositoryResult};
pub use revenue_repo::RevenueRepository;
pub use revenue_repo_impl::RevenueRepositoryImpl;
