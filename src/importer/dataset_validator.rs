// ==========================================
// 营收数据导入 - 数据集天数校验
// ==========================================
// 职责: 对全部候选记录执行天数校验并分桶
// 分桶顺序:
//   is_valid=false          → errors（需自动修正,不是失败）
//   requires_confirmation   → requires_confirmation
//   validation_type != none → warnings
//   其余                    → valid
// 红线: total = valid + errors + confirmation_needed + warnings
// ==========================================

use crate::domain::types::{MissingDaysPolicy, ValidationType};
use crate::domain::validation::{
    DatasetValidationReport, ValidatedRecord, ValidationCandidate, ValidationSummary,
};
use crate::engine::days_validator::DaysValidator;
use chrono::NaiveDate;
use tracing::{info, instrument};

/// VALIDATE_PLACEHOLDER 策略的默认占位天数
pub const DEFAULT_MISSING_DAYS_PLACEHOLDER: i32 = 30;

// ==========================================
// DatasetValidator - 数据集校验器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct DatasetValidator {
    days_validator: DaysValidator,
    missing_days_policy: MissingDaysPolicy,
    missing_days_placeholder: i32,
}

impl Default for DatasetValidator {
    fn default() -> Self {
        Self::new(
            DaysValidator::default(),
            MissingDaysPolicy::CalendarDefault,
            DEFAULT_MISSING_DAYS_PLACEHOLDER,
        )
    }
}

impl DatasetValidator {
    pub fn new(
        days_validator: DaysValidator,
        missing_days_policy: MissingDaysPolicy,
        missing_days_placeholder: i32,
    ) -> Self {
        Self {
            days_validator,
            missing_days_policy,
            missing_days_placeholder,
        }
    }

    /// 校验数据集并分桶
    #[instrument(skip(self, candidates), fields(total = candidates.len()))]
    pub fn validate_dataset(
        &self,
        candidates: &[ValidationCandidate],
        today: NaiveDate,
    ) -> DatasetValidationReport {
        let mut report = DatasetValidationReport::default();

        for candidate in candidates {
            let key = &candidate.key;
            let validation = match (candidate.submitted_days, self.missing_days_policy) {
                (Some(days), _) => self.days_validator.validate_days(key.year, key.month, days, today),
                (None, MissingDaysPolicy::ValidatePlaceholder) => self.days_validator.validate_days(
                    key.year,
                    key.month,
                    self.missing_days_placeholder,
                    today,
                ),
                (None, MissingDaysPolicy::CalendarDefault) => {
                    self.days_validator.calendar_default(key.year, key.month)
                }
            };

            let record = ValidatedRecord {
                row_number: candidate.row_number,
                key: key.clone(),
                submitted_days: candidate.submitted_days,
                validation,
            };

            if !record.validation.is_valid {
                report.errors.push(record);
            } else if record.validation.requires_confirmation {
                report.requires_confirmation.push(record);
            } else if record.validation.validation_type != ValidationType::None {
                report.warnings.push(record);
            } else {
                report.valid.push(record);
            }
        }

        report.summary = ValidationSummary {
            total: candidates.len(),
            valid: report.valid.len(),
            warnings: report.warnings.len(),
            errors: report.errors.len(),
            confirmation_needed: report.requires_confirmation.len(),
        };

        info!(
            total = report.summary.total,
            valid = report.summary.valid,
            auto_corrections = report.summary.errors,
            confirmation_needed = report.summary.confirmation_needed,
            warnings = report.summary.warnings,
            "数据集天数校验完成"
        );

        report
    }
}
