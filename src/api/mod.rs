// ==========================================
// 营收数据导入 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 CLI 或上层服务调用
// ==========================================

pub mod error;
pub mod revenue_import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use revenue_import_api::{RevenueImportApi, UploadValidateResponse};
