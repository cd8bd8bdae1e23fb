// ==========================================
// 营收数据导入 - 营收领域模型
// ==========================================
// 职责: 营收事实记录 / 自然键 / 导入批次 / 导入结果
// 红线: 自然键 (customer, service_type, year, month) 在库内唯一
// ==========================================

use crate::domain::types::month_abbrev;
use crate::domain::validation::{DatasetValidationReport, ValidationSummary};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 原始行（由表格解析器产出,列名大小写/空白不固定）
pub type RawRow = HashMap<String, serde_json::Value>;

// ==========================================
// RevenueKey - 自然键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RevenueKey {
    pub customer: String,
    pub service_type: String,
    pub year: i32,
    pub month: u32, // 1-12
}

impl RevenueKey {
    pub fn new(customer: &str, service_type: &str, year: i32, month: u32) -> Self {
        Self {
            customer: customer.trim().to_string(),
            service_type: service_type.trim().to_string(),
            year,
            month,
        }
    }
}

// 格式: customer|service_type|year|Mon（用户决策按键寻址时使用）
impl fmt::Display for RevenueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match month_abbrev(self.month) {
            Some(name) => write!(
                f,
                "{}|{}|{}|{}",
                self.customer, self.service_type, self.year, name
            ),
            None => write!(
                f,
                "{}|{}|{}|{}",
                self.customer, self.service_type, self.year, self.month
            ),
        }
    }
}

// ==========================================
// RevenueRecord - 营收事实记录
// ==========================================
// 用途: 清洗层产出,仓储层按自然键 upsert
// 对齐: revenue_data 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRecord {
    // ===== 自然键 =====
    pub customer: String,
    pub service_type: String,
    pub year: i32,
    pub month: u32,

    // ===== 数值字段 =====
    pub cost: f64,                  // 成本（当月按比例折算后）
    pub target: f64,                // 目标（当月按比例折算后）
    pub revenue: f64,               // 营收（从不折算）
    pub receivables_collected: f64, // 回款（从不折算）

    // ===== 期间天数 =====
    pub days: i32,          // 实际采用的期间天数
    pub calendar_days: u32, // 该月日历天数（28/29/30/31）

    // ===== 折算前原值 =====
    pub original_cost: f64,
    pub original_target: f64,

    // ===== 校验痕迹 =====
    pub was_corrected: bool,             // 是否经过自动纠正
    pub validation_note: Option<String>, // 纠正/用户决策说明
    pub analysis_date: NaiveDate,        // 本次导入的处理日期
}

impl RevenueRecord {
    pub fn key(&self) -> RevenueKey {
        RevenueKey {
            customer: self.customer.clone(),
            service_type: self.service_type.clone(),
            year: self.year,
            month: self.month,
        }
    }

    /// 是否做过按比例折算
    pub fn is_pro_rated(&self) -> bool {
        self.cost != self.original_cost || self.target != self.original_target
    }
}

// ==========================================
// ImportBatch - 导入批次记录
// ==========================================
// 对齐: import_batch 表（与营收记录同一事务写入）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,
    pub total_rows: i32,
    pub inserted_rows: i32,
    pub updated_rows: i32,
    pub error_rows: i32,
    pub corrected_rows: i32,
    pub auto_corrections: i32,
    pub confirmations: i32,
    pub processing_date: NaiveDate,
    pub imported_at: DateTime<Utc>,
    pub elapsed_ms: Option<i64>,
    pub validation_summary_json: Option<String>,
}

/// upsert 统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
}

// ==========================================
// IngestionResult - 提交成功后的导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionResult {
    pub batch_id: String,
    pub total_records: usize,
    pub inserted: usize,
    pub updated: usize,
    pub errors: usize,
    pub corrected: usize,
    pub validation_summary: CommittedValidationSummary,
}

/// 已提交批次的校验摘要
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedValidationSummary {
    pub auto_corrections: usize,
    pub confirmations: usize,
    pub valid_records: usize,
}

impl From<&ValidationSummary> for CommittedValidationSummary {
    fn from(summary: &ValidationSummary) -> Self {
        Self {
            auto_corrections: summary.errors,
            confirmations: summary.confirmation_needed,
            valid_records: summary.valid,
        }
    }
}

// ==========================================
// PendingIngestion - 待确认的导入
// ==========================================
// 调用方收集用户决策后,携带 rows 再次调用导入
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingIngestion {
    pub report: DatasetValidationReport,
    pub rows: Vec<RawRow>,
}

// ==========================================
// IngestOutcome - 一次导入调用的结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestOutcome {
    /// 存在待确认记录且未提供决策,未落库
    ConfirmationRequired(PendingIngestion),
    /// 已整批提交
    Committed(IngestionResult),
}

impl IngestOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, IngestOutcome::Committed(_))
    }

    pub fn committed(self) -> Option<IngestionResult> {
        match self {
            IngestOutcome::Committed(result) => Some(result),
            IngestOutcome::ConfirmationRequired(_) => None,
        }
    }

    pub fn pending(self) -> Option<PendingIngestion> {
        match self {
            IngestOutcome::ConfirmationRequired(pending) => Some(pending),
            IngestOutcome::Committed(_) => None,
        }
    }
}
