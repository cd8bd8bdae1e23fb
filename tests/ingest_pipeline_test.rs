// ==========================================
// RevenueImporter 集成测试
// ==========================================
// 测试目标: 验证完整的营收导入流程（校验 → 确认 → 清洗 → 落库）
// 处理日期固定为 2025-08-05
// ==========================================

mod test_helpers;

#[path = "helpers/mock_config.rs"]
mod mock_config;

use async_trait::async_trait;
use mock_config::MockConfig;
use revenue_ingest::domain::{
    ImportBatch, RevenueKey, RevenueRecord, UpsertSummary, UserDecision, UserDecisions,
    ValidationType,
};
use revenue_ingest::importer::{FieldMapperImpl, ImportError, RevenueImporter, RevenueImporterImpl};
use revenue_ingest::logging;
use revenue_ingest::repository::{
    RepositoryError, RepositoryResult, RevenueRepository, RevenueRepositoryImpl,
};
use std::sync::{Arc, Mutex};
use test_helpers::{create_test_db, past_valid_row, processing_date, RowBuilder};

/// 创建测试用的 RevenueImporter 实例
fn create_test_importer(
    db_path: &str,
    config: MockConfig,
) -> RevenueImporterImpl<RevenueRepositoryImpl, MockConfig> {
    let repo = RevenueRepositoryImpl::new(db_path).expect("Failed to create RevenueRepository");
    RevenueImporterImpl::new(repo, config, Box::new(FieldMapperImpl))
}

// ==========================================
// 提交失败的仓储（记录收到的记录数）
// ==========================================
#[derive(Default)]
struct FailingRepository {
    received: Arc<Mutex<usize>>,
}

#[async_trait]
impl RevenueRepository for FailingRepository {
    async fn batch_upsert(
        &self,
        records: Vec<RevenueRecord>,
        _batch: ImportBatch,
    ) -> RepositoryResult<UpsertSummary> {
        *self.received.lock().unwrap() = records.len();
        Err(RepositoryError::DatabaseTransactionError(
            "disk I/O error".to_string(),
        ))
    }

    async fn find_by_key(&self, _key: &RevenueKey) -> RepositoryResult<Option<RevenueRecord>> {
        Ok(None)
    }

    async fn list_by_period(&self, _year: i32, _month: u32) -> RepositoryResult<Vec<RevenueRecord>> {
        Ok(Vec::new())
    }

    async fn count_records(&self) -> RepositoryResult<usize> {
        Ok(0)
    }

    async fn get_recent_batches(&self, _limit: usize) -> RepositoryResult<Vec<ImportBatch>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_ingest_past_months_commits_directly() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::default());

    let rows = vec![
        past_valid_row("ACME", "Jan", 31),
        past_valid_row("ACME", "Feb", 28),
        past_valid_row("ACME", "Mar", 31),
    ];

    let result = importer
        .ingest_on(rows, None, processing_date())
        .await
        .expect("ingest failed")
        .committed()
        .expect("expected a committed batch");

    assert_eq!(result.total_records, 3);
    assert_eq!(result.inserted, 3);
    assert_eq!(result.updated, 0);
    assert_eq!(result.errors, 0);
    assert_eq!(result.corrected, 0);
    assert_eq!(result.validation_summary.valid_records, 3);
    assert_eq!(result.validation_summary.auto_corrections, 0);
    assert_eq!(importer.repository().count_records().await.unwrap(), 3);
}

#[tokio::test]
async fn test_reingest_same_rows_is_idempotent() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::default());

    let rows = vec![
        past_valid_row("ACME", "Jan", 31),
        past_valid_row("Globex", "Jan", 31),
    ];

    let first = importer
        .ingest_on(rows.clone(), None, processing_date())
        .await
        .unwrap()
        .committed()
        .unwrap();
    let before = importer.repository().list_by_period(2025, 1).await.unwrap();

    let second = importer
        .ingest_on(rows, None, processing_date())
        .await
        .unwrap()
        .committed()
        .unwrap();
    let after = importer.repository().list_by_period(2025, 1).await.unwrap();

    assert_eq!(first.inserted, 2);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, 2);
    assert_ne!(first.batch_id, second.batch_id);
    assert_eq!(before, after);
    assert_eq!(importer.repository().count_records().await.unwrap(), 2);
}

#[tokio::test]
async fn test_past_month_mismatch_is_auto_corrected() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::default());

    let rows = vec![past_valid_row("ACME", "Jan", 28)];
    let result = importer
        .ingest_on(rows, None, processing_date())
        .await
        .unwrap()
        .committed()
        .unwrap();

    assert_eq!(result.corrected, 1);
    assert_eq!(result.validation_summary.auto_corrections, 1);

    let record = importer
        .repository()
        .find_by_key(&RevenueKey::new("ACME", "Logistics", 2025, 1))
        .await
        .unwrap()
        .expect("record should exist");
    assert_eq!(record.days, 31);
    assert!(record.was_corrected);
    assert_eq!(
        record.validation_note.as_deref(),
        Some("Past month 1/2025: Days (28) doesn't match calendar days (31). Auto-corrected to 31.")
    );
}

#[tokio::test]
async fn test_row_missing_customer_counted_as_error() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::default());

    let rows = vec![
        past_valid_row("ACME", "Jan", 31),
        RowBuilder::new("", "Logistics", 2025, "Feb").days(28).build(),
        past_valid_row("ACME", "Mar", 31),
    ];

    let result = importer
        .ingest_on(rows, None, processing_date())
        .await
        .unwrap()
        .committed()
        .unwrap();

    assert_eq!(result.total_records, 3);
    assert!(result.errors >= 1);
    assert_eq!(result.inserted, 2);
    assert_eq!(importer.repository().count_records().await.unwrap(), 2);
}

#[tokio::test]
async fn test_current_month_variance_halts_without_writing() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::default());

    let rows = vec![
        past_valid_row("ACME", "Jul", 31),
        RowBuilder::new("ACME", "Logistics", 2025, "Aug").days(10).build(),
    ];

    let outcome = importer
        .ingest_on(rows.clone(), None, processing_date())
        .await
        .unwrap();
    assert!(!outcome.is_committed());

    let pending = outcome.pending().unwrap();
    assert_eq!(pending.rows, rows);
    assert_eq!(pending.report.summary.total, 2);
    assert_eq!(pending.report.summary.confirmation_needed, 1);
    assert!(pending.report.summary.is_balanced());

    let record = &pending.report.requires_confirmation[0];
    assert_eq!(
        record.validation.validation_type,
        ValidationType::CurrentMonthVariance
    );
    assert_eq!(record.validation.suggested_days, Some(3));

    assert_eq!(importer.repository().count_records().await.unwrap(), 0);
    assert!(importer
        .repository()
        .get_recent_batches(10)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_confirm_by_index_uses_suggested_days() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::default());

    let rows = vec![RowBuilder::new("ACME", "Logistics", 2025, "Aug")
        .days(10)
        .target(1_000_000.0)
        .build()];
    let decisions = UserDecisions::new().with_index(0, UserDecision::UseSuggested);

    let result = importer
        .ingest_on(rows, Some(decisions), processing_date())
        .await
        .unwrap()
        .committed()
        .unwrap();

    assert_eq!(result.inserted, 1);
    assert_eq!(result.corrected, 0);
    assert_eq!(result.validation_summary.confirmations, 1);

    let record = importer
        .repository()
        .find_by_key(&RevenueKey::new("ACME", "Logistics", 2025, 8))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.days, 3);
    assert!(!record.was_corrected);
    assert_eq!(
        record.validation_note.as_deref(),
        Some("Changed from 10 to 3 (current-month-variance)")
    );
}

#[tokio::test]
async fn test_confirm_by_key_custom_value() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::default());

    let rows = vec![RowBuilder::new("ACME", "Logistics", 2025, "Sep").days(20).build()];
    let key = RevenueKey::new("ACME", "Logistics", 2025, 9);
    let decisions = UserDecisions::new().with_key(&key, UserDecision::CustomValue(18));

    importer
        .ingest_on(rows, Some(decisions), processing_date())
        .await
        .unwrap()
        .committed()
        .unwrap();

    let record = importer.repository().find_by_key(&key).await.unwrap().unwrap();
    assert_eq!(record.days, 18);
    assert_eq!(record.validation_note.as_deref(), Some("User override: 18 days"));
}

#[tokio::test]
async fn test_empty_decisions_accept_submitted_days() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::default());

    let rows = vec![RowBuilder::new("ACME", "Logistics", 2025, "Sep").days(20).build()];

    importer
        .ingest_on(rows, Some(UserDecisions::new()), processing_date())
        .await
        .unwrap()
        .committed()
        .unwrap();

    let record = importer
        .repository()
        .find_by_key(&RevenueKey::new("ACME", "Logistics", 2025, 9))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.days, 20);
    assert_eq!(
        record.validation_note.as_deref(),
        Some("Future month 9/2025: This is a simulation/forecast with 20 projected work days. Proceed with simulation?")
    );
}

#[tokio::test]
async fn test_out_of_range_decision_rejected_before_commit() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::default());

    let rows = vec![RowBuilder::new("ACME", "Logistics", 2025, "Sep").days(20).build()];
    let decisions = UserDecisions::new().with_index(5, UserDecision::Accepted);

    let err = importer
        .ingest_on(rows, Some(decisions), processing_date())
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::InvalidDecision(_)));
    assert_eq!(importer.repository().count_records().await.unwrap(), 0);
}

#[tokio::test]
async fn test_current_month_cost_and_target_pro_rated() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::default());

    // 天数与已过工作日一致（3）,无需确认
    let rows = vec![RowBuilder::new("ACME", "Logistics", 2025, "Aug")
        .days(3)
        .cost(310_000.0)
        .target(1_000_000.0)
        .revenue(500_000.0)
        .receivables(1_000.0)
        .build()];

    let result = importer
        .ingest_on(rows, None, processing_date())
        .await
        .unwrap()
        .committed()
        .unwrap();
    assert_eq!(result.inserted, 1);

    let record = importer
        .repository()
        .find_by_key(&RevenueKey::new("ACME", "Logistics", 2025, 8))
        .await
        .unwrap()
        .unwrap();
    assert!((record.target - 161_290.32).abs() < 0.01);
    assert!((record.cost - 50_000.0).abs() < 1e-6);
    assert_eq!(record.revenue, 500_000.0);
    assert_eq!(record.receivables_collected, 1_000.0);
    assert_eq!(record.original_target, 1_000_000.0);
    assert_eq!(record.calendar_days, 31);
}

#[tokio::test]
async fn test_pro_rating_disabled_by_config() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = MockConfig {
        prorate_current_month: false,
        ..MockConfig::default()
    };
    let importer = create_test_importer(&db_path, config);

    let rows = vec![RowBuilder::new("ACME", "Logistics", 2025, "Aug")
        .days(3)
        .target(1_000_000.0)
        .build()];

    importer
        .ingest_on(rows, None, processing_date())
        .await
        .unwrap()
        .committed()
        .unwrap();

    let record = importer
        .repository()
        .find_by_key(&RevenueKey::new("ACME", "Logistics", 2025, 8))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.target, 1_000_000.0);
}

#[tokio::test]
async fn test_missing_days_calendar_default_policy() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::default());

    let rows = vec![RowBuilder::new("ACME", "Logistics", 2025, "Feb").build()];

    let result = importer
        .ingest_on(rows, None, processing_date())
        .await
        .unwrap()
        .committed()
        .unwrap();
    assert_eq!(result.corrected, 0);

    let record = importer
        .repository()
        .find_by_key(&RevenueKey::new("ACME", "Logistics", 2025, 2))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.days, 28);
    assert!(!record.was_corrected);
}

#[tokio::test]
async fn test_missing_days_placeholder_policy_auto_corrects() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::placeholder_policy(30));

    let rows = vec![RowBuilder::new("ACME", "Logistics", 2025, "Feb").build()];

    let result = importer
        .ingest_on(rows, None, processing_date())
        .await
        .unwrap()
        .committed()
        .unwrap();
    assert_eq!(result.corrected, 1);

    let record = importer
        .repository()
        .find_by_key(&RevenueKey::new("ACME", "Logistics", 2025, 2))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.days, 28);
    assert!(record.was_corrected);
}

#[tokio::test]
async fn test_commit_failure_surfaces_as_error() {
    logging::init_test();

    let repo = FailingRepository::default();
    let received = repo.received.clone();
    let importer = RevenueImporterImpl::new(repo, MockConfig::default(), Box::new(FieldMapperImpl));

    let rows = vec![
        past_valid_row("ACME", "Jan", 31),
        past_valid_row("ACME", "Feb", 28),
    ];

    let err = importer
        .ingest_on(rows, None, processing_date())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ImportError::CommitFailure(RepositoryError::DatabaseTransactionError(_))
    ));
    assert_eq!(*received.lock().unwrap(), 2);
}

#[tokio::test]
async fn test_batch_log_written_with_counts() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::default());

    let rows = vec![
        past_valid_row("ACME", "Jan", 30),
        past_valid_row("ACME", "Feb", 28),
    ];

    let result = importer
        .ingest_on(rows, None, processing_date())
        .await
        .unwrap()
        .committed()
        .unwrap();

    let batches = importer.repository().get_recent_batches(10).await.unwrap();
    assert_eq!(batches.len(), 1);

    let batch = &batches[0];
    assert_eq!(batch.batch_id, result.batch_id);
    assert_eq!(batch.total_rows, 2);
    assert_eq!(batch.inserted_rows, 2);
    assert_eq!(batch.updated_rows, 0);
    assert_eq!(batch.corrected_rows, 1);
    assert_eq!(batch.auto_corrections, 1);
    assert_eq!(batch.processing_date, processing_date());
    assert!(batch.validation_summary_json.is_some());
}

#[tokio::test]
async fn test_duplicate_key_only_mismatched_row_counted_as_corrected() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::default());

    let rows = vec![
        RowBuilder::new("ACME", "Logistics", 2025, "Jan").days(1).revenue(1.0).build(),
        RowBuilder::new("ACME", "Logistics", 2025, "Jan").days(31).revenue(2.0).build(),
    ];

    let result = importer
        .ingest_on(rows, None, processing_date())
        .await
        .unwrap()
        .committed()
        .unwrap();

    assert_eq!(result.validation_summary.auto_corrections, 1);
    assert_eq!(result.corrected, 1);
    assert_eq!(result.inserted, 1);
    assert_eq!(result.updated, 1);

    let record = importer
        .repository()
        .find_by_key(&RevenueKey::new("ACME", "Logistics", 2025, 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.revenue, 2.0);
    assert_eq!(record.days, 31);
    assert!(!record.was_corrected);
    assert_eq!(record.validation_note, None);
}

#[tokio::test]
async fn test_placeholder_days_accepted_for_future_month() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let importer = create_test_importer(&db_path, MockConfig::placeholder_policy(30));

    let rows = vec![RowBuilder::new("ACME", "Logistics", 2025, "Oct").build()];

    importer
        .ingest_on(rows, Some(UserDecisions::new()), processing_date())
        .await
        .unwrap()
        .committed()
        .unwrap();

    let record = importer
        .repository()
        .find_by_key(&RevenueKey::new("ACME", "Logistics", 2025, 10))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.days, 30);
    assert_eq!(
        record.validation_note.as_deref(),
        Some("Future month 10/2025: This is a simulation/forecast with 30 projected work days. Proceed with simulation?")
    );
}
