// ==========================================
// 营收数据导入 - 期间天数校验引擎
// ==========================================
// 职责: 判定提交天数 通过 / 自动纠正 / 待确认
// 输入: (year, month, submitted_days, today)
// 输出: ValidationVerdict（结论互斥,每次只有一种校验类型）
// ==========================================
// 历史月份: 日历天数是事实,不符即强制纠正
// 当月: 建议已过工作日,交由用户确认
// 未来月份: 一律视为模拟/预测,需用户确认
// ==========================================

use crate::domain::types::{PeriodKind, ValidationType};
use crate::domain::validation::ValidationVerdict;
use crate::engine::calendar::{calendar_days, classify_period, elapsed_business_days};
use chrono::NaiveDate;
use tracing::debug;

/// 未来月份建议天数上限（通用工作日近似值）
pub const DEFAULT_FUTURE_DAYS_CAP: i32 = 22;

// ==========================================
// DaysValidator - 期间天数校验引擎
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct DaysValidator {
    future_days_cap: i32,
}

impl Default for DaysValidator {
    fn default() -> Self {
        Self::new(DEFAULT_FUTURE_DAYS_CAP)
    }
}

impl DaysValidator {
    pub fn new(future_days_cap: i32) -> Self {
        Self { future_days_cap }
    }

    /// 校验单条记录的期间天数
    ///
    /// # 参数
    /// - year/month: 记录所属期间（month 为 1-12）
    /// - submitted_days: 上传的天数
    /// - today: 处理日期
    pub fn validate_days(
        &self,
        year: i32,
        month: u32,
        submitted_days: i32,
        today: NaiveDate,
    ) -> ValidationVerdict {
        let period = classify_period(year, month, today);
        let calendar = calendar_days(year, month) as i32;

        let verdict = match period {
            PeriodKind::Past => {
                if submitted_days == calendar {
                    ValidationVerdict::passed(submitted_days)
                } else {
                    ValidationVerdict {
                        is_valid: false,
                        corrected_days: calendar,
                        requires_confirmation: false,
                        validation_type: ValidationType::AutoCorrected,
                        suggested_days: Some(calendar),
                        message: format!(
                            "Past month {}/{}: Days ({}) doesn't match calendar days ({}). Auto-corrected to {}.",
                            month, year, submitted_days, calendar, calendar
                        ),
                    }
                }
            }
            PeriodKind::Current => {
                // Current 分支下 elapsed 必为 Some
                let elapsed = elapsed_business_days(year, month, today).unwrap_or(0) as i32;
                if submitted_days == elapsed {
                    ValidationVerdict::passed(submitted_days)
                } else {
                    ValidationVerdict {
                        is_valid: true,
                        corrected_days: submitted_days,
                        requires_confirmation: true,
                        validation_type: ValidationType::CurrentMonthVariance,
                        suggested_days: Some(elapsed),
                        message: format!(
                            "Current month {}/{}: {} work days entered, but {} business days have elapsed. Accept or reject?",
                            month, year, submitted_days, elapsed
                        ),
                    }
                }
            }
            PeriodKind::Future => ValidationVerdict {
                is_valid: true,
                corrected_days: submitted_days,
                requires_confirmation: true,
                validation_type: ValidationType::FutureSimulation,
                suggested_days: Some(self.future_days_cap.min(calendar)),
                message: format!(
                    "Future month {}/{}: This is a simulation/forecast with {} projected work days. Proceed with simulation?",
                    month, year, submitted_days
                ),
            },
        };

        debug!(
            year,
            month,
            submitted_days,
            period = %period,
            validation_type = %verdict.validation_type,
            "天数校验完成"
        );

        verdict
    }

    /// 天数缺失时的日历默认结论（不参与比对,记入 warnings 桶）
    pub fn calendar_default(&self, year: i32, month: u32) -> ValidationVerdict {
        let calendar = calendar_days(year, month) as i32;
        ValidationVerdict {
            is_valid: true,
            corrected_days: calendar,
            requires_confirmation: false,
            validation_type: ValidationType::CalendarDefault,
            suggested_days: Some(calendar),
            message: format!(
                "Month {}/{}: Days not provided. Defaulted to calendar days ({}).",
                month, year, calendar
            ),
        }
    }
}
