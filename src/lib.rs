// ==========================================
// 营收数据导入 - 核心库
// ==========================================
// 职责: 月度营收数据的期间天数校验、纠正与按比例折算
// 技术栈: Rust + SQLite
// 系统定位: 导入管道 (待确认记录由人工决策)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 日历与天数校验
pub mod engine;

// 导入层 - 导入管道
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{MissingDaysPolicy, PeriodKind, ValidationType};

// 领域实体
pub use domain::{
    DatasetValidationReport, ImportBatch, IngestOutcome, IngestionResult, RawRow, RevenueKey,
    RevenueRecord, UserDecision, UserDecisions, ValidationSummary, ValidationVerdict,
};

// 引擎
pub use engine::{calendar_days, classify_period, elapsed_business_days, DaysValidator};

// 导入
pub use importer::{
    CorrectionLedger, DataCleanerImpl, DatasetValidator, ImportError, RevenueImporter,
    RevenueImporterImpl,
};

// API
pub use api::{ApiError, RevenueImportApi, UploadValidateResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "营收数据导入";
