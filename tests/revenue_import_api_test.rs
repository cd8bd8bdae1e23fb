// ==========================================
// RevenueImportApi 集成测试
// ==========================================
// 测试目标: 两步导入（校验 → 确认）、配置覆写、查询接口
// ==========================================

mod test_helpers;

use revenue_ingest::api::{ApiError, RevenueImportApi};
use revenue_ingest::config::config_keys;
use revenue_ingest::domain::{RevenueKey, UserDecision, UserDecisions};
use revenue_ingest::logging;
use test_helpers::{create_test_db, insert_test_config, past_valid_row, processing_date, RowBuilder};

#[tokio::test]
async fn test_two_step_upload_flow() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let api = RevenueImportApi::new(&db_path).expect("Failed to create api");

    let rows = vec![
        past_valid_row("ACME", "Jul", 31),
        RowBuilder::new("ACME", "Logistics", 2025, "Aug").days(10).build(),
        RowBuilder::new("ACME", "Logistics", 2025, "Sep").days(21).build(),
    ];

    // 第一步: 存在待确认记录,不落库
    let response = api
        .validate_upload_on(rows, processing_date())
        .await
        .unwrap();
    assert!(response.validation_required);
    assert!(response.results.is_none());

    let summary = response.summary.unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.valid, 1);
    assert_eq!(summary.confirmation_needed, 2);
    assert_eq!(api.count_records().await.unwrap(), 0);

    // 第二步: 带回原始行与决策
    let key_aug = RevenueKey::new("ACME", "Logistics", 2025, 8);
    let decisions = UserDecisions::new()
        .with_key(&key_aug, UserDecision::UseSuggested)
        .with_index(1, UserDecision::Accepted);

    let result = api
        .confirm_upload_on(response.rows.unwrap(), decisions, processing_date())
        .await
        .unwrap();
    assert_eq!(result.inserted, 3);
    assert_eq!(result.validation_summary.confirmations, 2);

    let aug = api.find_record(&key_aug).await.unwrap();
    assert_eq!(aug.days, 3);

    let sep = api
        .find_record(&RevenueKey::new("ACME", "Logistics", 2025, 9))
        .await
        .unwrap();
    assert_eq!(sep.days, 21);
}

#[tokio::test]
async fn test_validate_upload_commits_when_nothing_to_confirm() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let api = RevenueImportApi::new(&db_path).unwrap();

    let rows = vec![past_valid_row("ACME", "Jan", 31), past_valid_row("ACME", "Apr", 31)];

    let response = api
        .validate_upload_on(rows, processing_date())
        .await
        .unwrap();
    assert!(!response.validation_required);
    assert!(response.validation.is_none());

    let results = response.results.unwrap();
    assert_eq!(results.inserted, 2);
    // 4 月只有 30 天
    assert_eq!(results.corrected, 1);
    assert_eq!(api.find_record(&RevenueKey::new("ACME", "Logistics", 2025, 4)).await.unwrap().days, 30);
}

#[tokio::test]
async fn test_future_days_cap_read_from_config() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    insert_test_config(&db_path, config_keys::FUTURE_SUGGESTED_DAYS_CAP, "20").unwrap();
    let api = RevenueImportApi::new(&db_path).unwrap();

    let rows = vec![RowBuilder::new("ACME", "Logistics", 2025, "Dec").days(25).build()];
    let response = api
        .validate_upload_on(rows, processing_date())
        .await
        .unwrap();

    let validation = response.validation.unwrap();
    assert_eq!(validation.requires_confirmation[0].validation.suggested_days, Some(20));
}

#[tokio::test]
async fn test_custom_value_outside_month_rejected() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let api = RevenueImportApi::new(&db_path).unwrap();

    let rows = vec![RowBuilder::new("ACME", "Logistics", 2025, "Sep").days(21).build()];
    let decisions = UserDecisions::new().with_index(0, UserDecision::CustomValue(31));

    let err = api
        .confirm_upload_on(rows, decisions, processing_date())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert_eq!(api.count_records().await.unwrap(), 0);
}

#[tokio::test]
async fn test_recent_batches_default_limit_from_config() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    insert_test_config(&db_path, config_keys::BATCH_HISTORY_LIMIT, "2").unwrap();
    let api = RevenueImportApi::new(&db_path).unwrap();

    for _ in 0..3 {
        api.validate_upload_on(vec![past_valid_row("ACME", "Jan", 31)], processing_date())
            .await
            .unwrap();
    }

    assert_eq!(api.recent_batches(None).await.unwrap().len(), 2);
    assert_eq!(api.recent_batches(Some(10)).await.unwrap().len(), 3);
    assert_eq!(api.count_records().await.unwrap(), 1);
}

#[tokio::test]
async fn test_query_errors() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let api = RevenueImportApi::new(&db_path).unwrap();

    let err = api
        .find_record(&RevenueKey::new("Nobody", "Logistics", 2025, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = api.list_period(2025, 13).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
