// ==========================================
// 营收数据导入 - 引擎层
// ==========================================
// 职责: 日历计算与天数校验规则,纯计算,不拼 SQL
// 红线: 所有结论必须携带 message（给人看的理由）
// ==========================================

pub mod calendar;
pub mod days_validator;

pub use calendar::{
    calendar_days, classify_period, elapsed_business_days, elapsed_fraction, is_leap_year,
    parse_month,
};
pub use days_validator::{DaysValidator, DEFAULT_FUTURE_DAYS_CAP};
