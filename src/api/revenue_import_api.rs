// ==========================================
// 营收数据导入 API
// ==========================================
// 职责: 封装两步导入（校验 → 确认）与查询
// 流程:
//   validate_upload: 无待确认记录时直接提交；否则返回校验报告与原始行
//   confirm_upload:  携带原始行与用户决策再次提交
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, IngestConfigReader};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::revenue::{
    ImportBatch, IngestOutcome, IngestionResult, RawRow, RevenueKey, RevenueRecord,
};
use crate::domain::validation::{DatasetValidationReport, UserDecisions, ValidationSummary};
use crate::importer::{FieldMapperImpl, RevenueImporter, RevenueImporterImpl};
use crate::repository::{RevenueRepository, RevenueRepositoryImpl};
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::info;

/// 校验上传响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadValidateResponse {
    /// 是否需要用户确认
    pub validation_required: bool,
    /// 校验汇总（需要确认时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ValidationSummary>,
    /// 校验报告（需要确认时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<DatasetValidationReport>,
    /// 原始行（确认时原样带回）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<RawRow>>,
    /// 已提交的导入结果（无需确认时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<IngestionResult>,
}

impl From<IngestOutcome> for UploadValidateResponse {
    fn from(outcome: IngestOutcome) -> Self {
        match outcome {
            IngestOutcome::ConfirmationRequired(pending) => Self {
                validation_required: true,
                summary: Some(pending.report.summary),
                validation: Some(pending.report),
                rows: Some(pending.rows),
                results: None,
            },
            IngestOutcome::Committed(result) => Self {
                validation_required: false,
                summary: None,
                validation: None,
                rows: None,
                results: Some(result),
            },
        }
    }
}

/// 营收导入API
pub struct RevenueImportApi {
    importer: RevenueImporterImpl<RevenueRepositoryImpl, ConfigManager>,
}

impl RevenueImportApi {
    /// 打开数据库（不存在则建库）并创建 API 实例
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建（仓储与配置共用同一连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(format!("锁获取失败: {}", e)))?;
            ensure_schema(&guard).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        }

        let repo = RevenueRepositoryImpl::from_connection(conn.clone());
        let config = ConfigManager::from_connection(conn)
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        Ok(Self {
            importer: RevenueImporterImpl::new(repo, config, Box::new(FieldMapperImpl)),
        })
    }

    /// 第一步：校验上传（以当前本地日期为处理日期）
    pub async fn validate_upload(&self, rows: Vec<RawRow>) -> ApiResult<UploadValidateResponse> {
        self.validate_upload_on(rows, Local::now().date_naive()).await
    }

    pub async fn validate_upload_on(
        &self,
        rows: Vec<RawRow>,
        today: NaiveDate,
    ) -> ApiResult<UploadValidateResponse> {
        let outcome = self.importer.ingest_on(rows, None, today).await?;
        let response = UploadValidateResponse::from(outcome);
        info!(validation_required = response.validation_required, "上传校验完成");
        Ok(response)
    }

    /// 第二步：携带用户决策确认上传
    pub async fn confirm_upload(
        &self,
        rows: Vec<RawRow>,
        decisions: UserDecisions,
    ) -> ApiResult<IngestionResult> {
        self.confirm_upload_on(rows, decisions, Local::now().date_naive())
            .await
    }

    pub async fn confirm_upload_on(
        &self,
        rows: Vec<RawRow>,
        decisions: UserDecisions,
        today: NaiveDate,
    ) -> ApiResult<IngestionResult> {
        match self.importer.ingest_on(rows, Some(decisions), today).await? {
            IngestOutcome::Committed(result) => Ok(result),
            IngestOutcome::ConfirmationRequired(_) => Err(ApiError::InternalError(
                "已提供用户决策但导入仍要求确认".to_string(),
            )),
        }
    }

    /// 最近导入批次（limit 缺省时读取配置 batch_history_limit）
    pub async fn recent_batches(&self, limit: Option<usize>) -> ApiResult<Vec<ImportBatch>> {
        let limit = match limit {
            Some(n) => n,
            None => self
                .importer
                .config()
                .get_batch_history_limit()
                .await
                .map_err(|e| ApiError::ConfigError(e.to_string()))?,
        };
        Ok(self.importer.repository().get_recent_batches(limit).await?)
    }

    /// 按自然键查询记录
    pub async fn find_record(&self, key: &RevenueKey) -> ApiResult<RevenueRecord> {
        self.importer
            .repository()
            .find_by_key(key)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("营收记录 {}", key)))
    }

    /// 查询期间全部记录
    pub async fn list_period(&self, year: i32, month: u32) -> ApiResult<Vec<RevenueRecord>> {
        if !(1..=12).contains(&month) {
            return Err(ApiError::InvalidInput(format!("月份越界: {}", month)));
        }
        Ok(self.importer.repository().list_by_period(year, month).await?)
    }

    /// 营收记录总数
    pub async fn count_records(&self) -> ApiResult<usize> {
        Ok(self.importer.repository().count_records().await?)
    }
}
