// ==========================================
// 营收数据导入 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、校验结论
// 红线: 不含数据访问逻辑,不含校验/清洗逻辑
// ==========================================

pub mod revenue;
pub mod types;
pub mod validation;

// 重导出核心类型
pub use revenue::{
    CommittedValidationSummary, ImportBatch, IngestOutcome, IngestionResult, PendingIngestion,
    RawRow, RevenueKey, RevenueRecord, UpsertSummary,
};
pub use types::{month_abbrev, MissingDaysPolicy, PeriodKind, ValidationType, MONTH_ABBREVIATIONS};
pub use validation::{
    DatasetValidationReport, UserDecision, UserDecisions, ValidatedRecord, ValidationCandidate,
    ValidationSummary, ValidationVerdict,
};
