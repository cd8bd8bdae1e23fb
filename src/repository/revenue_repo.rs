// ==========================================
// 营收数据导入 - 营收数据 Repository Trait
// ==========================================
// 职责: 定义营收数据访问接口（不包含实现）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::revenue::{ImportBatch, RevenueKey, RevenueRecord, UpsertSummary};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// RevenueRepository Trait
// ==========================================
// 用途: 营收数据与导入批次的数据访问
// 实现者: RevenueRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait RevenueRepository: Send + Sync {
    // ===== 批量写入（事务化）=====

    /// 按自然键批量 upsert 营收记录,并在同一事务内写入批次记录
    ///
    /// # 参数
    /// - records: 清洗后的营收记录
    /// - batch: 导入批次（inserted/updated 由实现方回填后写入）
    ///
    /// # 返回
    /// - Ok(UpsertSummary): 新增/更新条数
    /// - Err: 数据库错误（整个事务回滚,营收记录与批次记录均不落库）
    async fn batch_upsert(
        &self,
        records: Vec<RevenueRecord>,
        batch: ImportBatch,
    ) -> RepositoryResult<UpsertSummary>;

    // ===== 查询 =====

    /// 按自然键查询
    async fn find_by_key(&self, key: &RevenueKey) -> RepositoryResult<Option<RevenueRecord>>;

    /// 查询某期间的全部记录（按 customer, service_type 排序）
    async fn list_by_period(&self, year: i32, month: u32) -> RepositoryResult<Vec<RevenueRecord>>;

    /// 统计营收记录数
    async fn count_records(&self) -> RepositoryResult<usize>;

    /// 查询最近的导入批次
    async fn get_recent_batches(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>>;
}
