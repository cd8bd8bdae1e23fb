// ==========================================
// 营收数据导入 - 导入管道实现
// ==========================================
// 职责: 整合导入流程，从原始行到数据库
// 流程: 前置提取 → 数据集校验 → (暂停待确认) → 纠正台账 → 清洗 → 单事务落库
// ==========================================

use crate::config::IngestConfigReader;
use crate::domain::revenue::{
    CommittedValidationSummary, ImportBatch, IngestOutcome, IngestionResult, PendingIngestion,
    RawRow,
};
use crate::domain::types::MissingDaysPolicy;
use crate::domain::validation::{UserDecisions, ValidationCandidate};
use crate::engine::days_validator::DaysValidator;
use crate::importer::correction_ledger::CorrectionLedger;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::dataset_validator::DatasetValidator;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::revenue_importer_trait::{FieldMapper, RevenueImporter};
use crate::importer::field_mapper::MappedRow;
use crate::repository::RevenueRepository;
use chrono::{Local, NaiveDate, Utc};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 单次导入调用使用的配置快照
#[derive(Debug, Clone, Copy)]
struct IngestSettings {
    future_days_cap: i32,
    missing_days_policy: MissingDaysPolicy,
    missing_days_placeholder: i32,
    prorate_current_month: bool,
}

// ==========================================
// RevenueImporterImpl - 营收导入管道实现
// ==========================================
pub struct RevenueImporterImpl<R, C>
where
    R: RevenueRepository,
    C: IngestConfigReader,
{
    // 数据访问层
    repo: R,

    // 配置读取器
    config: C,

    // 字段映射
    field_mapper: Box<dyn FieldMapper>,
}

impl<R, C> RevenueImporterImpl<R, C>
where
    R: RevenueRepository,
    C: IngestConfigReader,
{
    /// 创建新的 RevenueImporter 实例
    ///
    /// # 参数
    /// - repo: 营收数据仓储
    /// - config: 配置读取器
    /// - field_mapper: 字段映射器
    pub fn new(repo: R, config: C, field_mapper: Box<dyn FieldMapper>) -> Self {
        Self {
            repo,
            config,
            field_mapper,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    async fn load_settings(&self) -> ImportResult<IngestSettings> {
        let future_days_cap = self
            .config
            .get_future_suggested_days_cap()
            .await
            .map_err(|e| config_error("future_suggested_days_cap", e.to_string()))?;
        let missing_days_policy = self
            .config
            .get_missing_days_policy()
            .await
            .map_err(|e| config_error("missing_days_policy", e.to_string()))?;
        let missing_days_placeholder = self
            .config
            .get_missing_days_placeholder()
            .await
            .map_err(|e| config_error("missing_days_placeholder", e.to_string()))?;
        let prorate_current_month = self
            .config
            .get_prorate_current_month()
            .await
            .map_err(|e| config_error("prorate_current_month", e.to_string()))?;

        Ok(IngestSettings {
            future_days_cap,
            missing_days_policy,
            missing_days_placeholder,
            prorate_current_month,
        })
    }

    /// 前置提取：每行映射一次,映射失败的行不参与校验
    fn map_rows(&self, rows: &[RawRow]) -> ImportResult<(Vec<MappedRow>, usize)> {
        let mut mapped = Vec::with_capacity(rows.len());
        let mut errors = 0;

        for (idx, row) in rows.iter().enumerate() {
            match self.field_mapper.map_row(row, idx + 1) {
                Ok(m) => mapped.push(m),
                Err(e) if e.is_row_level() => {
                    warn!(row_number = idx + 1, error = %e, "行映射失败，跳过");
                    errors += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok((mapped, errors))
    }
}

fn config_error(key: &str, message: String) -> ImportError {
    ImportError::ConfigReadError {
        key: key.to_string(),
        message,
    }
}

#[async_trait::async_trait]
impl<R, C> RevenueImporter for RevenueImporterImpl<R, C>
where
    R: RevenueRepository + Send + Sync,
    C: IngestConfigReader + Send + Sync,
{
    async fn ingest(
        &self,
        rows: Vec<RawRow>,
        decisions: Option<UserDecisions>,
    ) -> ImportResult<IngestOutcome> {
        let today = Local::now().date_naive();
        self.ingest_on(rows, decisions, today).await
    }

    #[instrument(skip(self, rows, decisions), fields(rows = rows.len(), today = %today, batch_id = tracing::field::Empty))]
    async fn ingest_on(
        &self,
        rows: Vec<RawRow>,
        decisions: Option<UserDecisions>,
        today: NaiveDate,
    ) -> ImportResult<IngestOutcome> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(total_rows = rows.len(), has_decisions = decisions.is_some(), "开始导入营收数据");

        let settings = self.load_settings().await?;
        debug!(?settings, "导入配置已加载");

        // === 步骤 1: 前置提取 + 数据集校验 ===
        let (mapped_rows, errors) = self.map_rows(&rows)?;
        let candidates: Vec<ValidationCandidate> =
            mapped_rows.iter().map(MappedRow::candidate).collect();

        let validator = DatasetValidator::new(
            DaysValidator::new(settings.future_days_cap),
            settings.missing_days_policy,
            settings.missing_days_placeholder,
        );
        let report = validator.validate_dataset(&candidates, today);

        // === 步骤 2: 待确认且未提供决策 → 暂停 ===
        if report.needs_confirmation() && decisions.is_none() {
            info!(
                confirmation_needed = report.summary.confirmation_needed,
                "存在待确认记录，暂停导入"
            );
            return Ok(IngestOutcome::ConfirmationRequired(PendingIngestion {
                report,
                rows,
            }));
        }

        // === 步骤 3: 纠正台账 ===
        let ledger = CorrectionLedger::build(&report, decisions.as_ref())?;
        debug!(entries = ledger.len(), "纠正台账构建完成");

        // === 步骤 4: 清洗 ===
        let cleaner = DataCleaner::new(settings.prorate_current_month);
        let records: Vec<_> = mapped_rows
            .into_iter()
            .map(|mapped| cleaner.clean_mapped(mapped, &ledger, today))
            .collect();
        let corrected = records.iter().filter(|r| r.was_corrected).count();
        info!(
            cleaned = records.len(),
            errors,
            corrected,
            "行清洗完成"
        );

        // === 步骤 5: 单事务落库 ===
        let validation_summary_json = serde_json::to_string(&report.summary)
            .map_err(|e| ImportError::InternalError(format!("校验摘要序列化失败: {}", e)))?;
        let batch = ImportBatch {
            batch_id: batch_id.clone(),
            total_rows: rows.len() as i32,
            inserted_rows: 0,
            updated_rows: 0,
            error_rows: errors as i32,
            corrected_rows: corrected as i32,
            auto_corrections: report.summary.errors as i32,
            confirmations: report.summary.confirmation_needed as i32,
            processing_date: today,
            imported_at: Utc::now(),
            elapsed_ms: Some(start_time.elapsed().as_millis() as i64),
            validation_summary_json: Some(validation_summary_json),
        };

        let upsert = self.repo.batch_upsert(records, batch).await.map_err(|e| {
            error!(error = %e, "批次提交失败，整批回滚");
            ImportError::CommitFailure(e)
        })?;

        // === 步骤 6: 结果 ===
        let result = IngestionResult {
            batch_id,
            total_records: rows.len(),
            inserted: upsert.inserted,
            updated: upsert.updated,
            errors,
            corrected,
            validation_summary: CommittedValidationSummary::from(&report.summary),
        };

        info!(
            batch_id = %result.batch_id,
            total = result.total_records,
            inserted = result.inserted,
            updated = result.updated,
            errors = result.errors,
            corrected = result.corrected,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "营收数据导入完成"
        );

        Ok(IngestOutcome::Committed(result))
    }
}
