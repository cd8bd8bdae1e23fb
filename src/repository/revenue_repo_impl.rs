// ==========================================
// 营收数据导入 - 营收数据 Repository 实现
// ==========================================
// 职责: 实现营收数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 红线: batch_upsert 全部写入同一事务,任一失败整批回滚
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::revenue::{ImportBatch, RevenueKey, RevenueRecord, UpsertSummary};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::revenue_repo::RevenueRepository;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const REVENUE_COLUMNS: &str = r#"
    customer, service_type, year, month,
    cost, target, revenue, receivables_collected,
    days, calendar_days, original_cost, original_target,
    was_corrected, validation_note, analysis_date
"#;

// ==========================================
// RevenueRepositoryImpl
// ==========================================
pub struct RevenueRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl RevenueRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中按自然键 upsert 单条记录
    ///
    /// # 返回
    /// - true: 新增
    /// - false: 更新已有记录
    fn upsert_record_tx(tx: &Transaction, record: &RevenueRecord) -> RepositoryResult<bool> {
        let exists = tx
            .query_row(
                r#"
                SELECT 1 FROM revenue_data
                WHERE customer = ?1 AND service_type = ?2 AND year = ?3 AND month = ?4
                "#,
                params![record.customer, record.service_type, record.year, record.month],
                |_row| Ok(()),
            )
            .optional()?
            .is_some();

        tx.execute(
            r#"
            INSERT INTO revenue_data (
                customer, service_type, year, month,
                cost, target, revenue, receivables_collected,
                days, calendar_days, original_cost, original_target,
                was_corrected, validation_note, analysis_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ON CONFLICT(customer, service_type, year, month) DO UPDATE SET
                cost = excluded.cost,
                target = excluded.target,
                revenue = excluded.revenue,
                receivables_collected = excluded.receivables_collected,
                days = excluded.days,
                calendar_days = excluded.calendar_days,
                original_cost = excluded.original_cost,
                original_target = excluded.original_target,
                was_corrected = excluded.was_corrected,
                validation_note = excluded.validation_note,
                analysis_date = excluded.analysis_date,
                updated_at = datetime('now')
            "#,
            params![
                record.customer,
                record.service_type,
                record.year,
                record.month,
                record.cost,
                record.target,
                record.revenue,
                record.receivables_collected,
                record.days,
                record.calendar_days,
                record.original_cost,
                record.original_target,
                record.was_corrected,
                record.validation_note,
                record.analysis_date,
            ],
        )?;

        Ok(!exists)
    }

    /// 在事务中写入导入批次记录
    fn insert_batch_tx(tx: &Transaction, batch: &ImportBatch) -> RepositoryResult<()> {
        tx.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, total_rows, inserted_rows, updated_rows, error_rows,
                corrected_rows, auto_corrections, confirmations,
                processing_date, imported_at, elapsed_ms, validation_summary_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                batch.batch_id,
                batch.total_rows,
                batch.inserted_rows,
                batch.updated_rows,
                batch.error_rows,
                batch.corrected_rows,
                batch.auto_corrections,
                batch.confirmations,
                batch.processing_date,
                batch.imported_at,
                batch.elapsed_ms,
                batch.validation_summary_json,
            ],
        )?;
        Ok(())
    }

    fn map_revenue_row(row: &Row) -> rusqlite::Result<RevenueRecord> {
        Ok(RevenueRecord {
            customer: row.get(0)?,
            service_type: row.get(1)?,
            year: row.get(2)?,
            month: row.get(3)?,
            cost: row.get(4)?,
            target: row.get(5)?,
            revenue: row.get(6)?,
            receivables_collected: row.get(7)?,
            days: row.get(8)?,
            calendar_days: row.get(9)?,
            original_cost: row.get(10)?,
            original_target: row.get(11)?,
            was_corrected: row.get(12)?,
            validation_note: row.get(13)?,
            analysis_date: row.get(14)?,
        })
    }
}

#[async_trait]
impl RevenueRepository for RevenueRepositoryImpl {
    async fn batch_upsert(
        &self,
        records: Vec<RevenueRecord>,
        mut batch: ImportBatch,
    ) -> RepositoryResult<UpsertSummary> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut summary = UpsertSummary::default();
        for record in &records {
            if Self::upsert_record_tx(&tx, record)? {
                summary.inserted += 1;
            } else {
                summary.updated += 1;
            }
        }

        batch.inserted_rows = summary.inserted as i32;
        batch.updated_rows = summary.updated as i32;
        Self::insert_batch_tx(&tx, &batch)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(
            batch_id = %batch.batch_id,
            inserted = summary.inserted,
            updated = summary.updated,
            "营收记录批量 upsert 完成"
        );

        Ok(summary)
    }

    async fn find_by_key(&self, key: &RevenueKey) -> RepositoryResult<Option<RevenueRecord>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM revenue_data WHERE customer = ?1 AND service_type = ?2 AND year = ?3 AND month = ?4",
            REVENUE_COLUMNS
        );
        let record = conn
            .query_row(
                &sql,
                params![key.customer, key.service_type, key.year, key.month],
                Self::map_revenue_row,
            )
            .optional()?;

        debug!(key = %key, found = record.is_some(), "按自然键查询营收记录");
        Ok(record)
    }

    async fn list_by_period(&self, year: i32, month: u32) -> RepositoryResult<Vec<RevenueRecord>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM revenue_data WHERE year = ?1 AND month = ?2 ORDER BY customer, service_type",
            REVENUE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![year, month], Self::map_revenue_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    async fn count_records(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM revenue_data", [], |row| row.get(0))?;

        Ok(count as usize)
    }

    async fn get_recent_batches(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, total_rows, inserted_rows, updated_rows, error_rows,
                   corrected_rows, auto_corrections, confirmations,
                   processing_date, imported_at, elapsed_ms, validation_summary_json
            FROM import_batch
            ORDER BY imported_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let batches = stmt
            .query_map(params![limit as i64], |row| {
                Ok(ImportBatch {
                    batch_id: row.get(0)?,
                    total_rows: row.get(1)?,
                    inserted_rows: row.get(2)?,
                    updated_rows: row.get(3)?,
                    error_rows: row.get(4)?,
                    corrected_rows: row.get(5)?,
                    auto_corrections: row.get(6)?,
                    confirmations: row.get(7)?,
                    processing_date: row.get(8)?,
                    imported_at: row.get(9)?,
                    elapsed_ms: row.get(10)?,
                    validation_summary_json: row.get(11)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(batches)
    }
}
