// ==========================================
// 营收数据导入 - 导入层
// ==========================================
// 职责: 原始行 → 天数校验 → 纠正/确认 → 清洗折算 → 落库
// 输入: 已由表格解析器产出的原始行（RawRow）
// ==========================================

// 模块声明
pub mod correction_ledger;
pub mod data_cleaner;
pub mod dataset_validator;
pub mod error;
pub mod field_mapper;
pub mod revenue_importer_impl;
pub mod revenue_importer_trait;

// 重导出核心类型
pub use correction_ledger::{CorrectionDirective, CorrectionLedger};
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use dataset_validator::{DatasetValidator, DEFAULT_MISSING_DAYS_PLACEHOLDER};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{normalize_key, FieldMapper as FieldMapperImpl, MappedRow, RowFieldIndex};
pub use revenue_importer_impl::RevenueImporterImpl;

// 重导出 Trait 接口
pub use revenue_importer_trait::{FieldMapper, RevenueImporter, RowCleaner};
