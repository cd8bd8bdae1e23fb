// ==========================================
// 营收数据导入 - 行清洗器实现
// ==========================================
// 职责: 标准字段 → 营收记录（确定天数 + 当月按比例折算）
// 天数优先级: 台账自动纠正 > 台账用户决策 > 提交值 > 日历天数
// 折算: 仅进行中月份的 cost / target,revenue 与回款从不折算
// ==========================================

use crate::domain::revenue::{RawRow, RevenueRecord};
use crate::engine::calendar::{calendar_days, elapsed_fraction};
use crate::importer::correction_ledger::{CorrectionDirective, CorrectionLedger};
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{FieldMapper, MappedRow};
use crate::importer::revenue_importer_trait::{FieldMapper as _, RowCleaner};
use chrono::NaiveDate;
use tracing::{debug, info};

pub struct DataCleaner {
    field_mapper: FieldMapper,
    prorate_current_month: bool,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DataCleaner {
    pub fn new(prorate_current_month: bool) -> Self {
        Self {
            field_mapper: FieldMapper,
            prorate_current_month,
        }
    }

    /// 从已映射的行构建记录（不重复做字段映射）
    pub fn clean_mapped(
        &self,
        mapped: MappedRow,
        ledger: &CorrectionLedger,
        today: NaiveDate,
    ) -> RevenueRecord {
        let key = &mapped.key;
        let calendar = calendar_days(key.year, key.month);

        // 1. 确定天数
        let (days, was_corrected, validation_note) = match ledger.get(key) {
            // 同键多行时,只有自身提交值不符的行才算被纠正
            Some(CorrectionDirective::AutoCorrect { corrected_days, .. })
                if mapped.submitted_days == Some(*corrected_days) =>
            {
                (*corrected_days, false, None)
            }
            Some(CorrectionDirective::AutoCorrect {
                corrected_days,
                message,
            }) => {
                info!(
                    row_number = mapped.row_number,
                    key = %key,
                    from = ?mapped.submitted_days,
                    to = corrected_days,
                    "历史月份天数已自动纠正"
                );
                (*corrected_days, true, Some(message.clone()))
            }
            Some(CorrectionDirective::Confirmed {
                resolved_days,
                note,
            }) => (
                resolved_days.or(mapped.submitted_days).unwrap_or(calendar as i32),
                false,
                Some(note.clone()),
            ),
            None => match mapped.submitted_days {
                Some(days) => (days, false, None),
                None => {
                    debug!(row_number = mapped.row_number, key = %key, "天数缺失，按日历天数补齐");
                    (calendar as i32, false, None)
                }
            },
        };

        // 2. 进行中月份折算 cost / target
        let fraction = if self.prorate_current_month {
            elapsed_fraction(key.year, key.month, today)
        } else {
            None
        };
        let (cost, target) = match fraction {
            Some(fraction) => (mapped.cost * fraction, mapped.target * fraction),
            None => (mapped.cost, mapped.target),
        };

        RevenueRecord {
            customer: mapped.key.customer.clone(),
            service_type: mapped.key.service_type.clone(),
            year: key.year,
            month: key.month,
            cost,
            target,
            revenue: mapped.revenue,
            receivables_collected: mapped.receivables_collected,
            days,
            calendar_days: calendar,
            original_cost: mapped.cost,
            original_target: mapped.target,
            was_corrected,
            validation_note,
            analysis_date: today,
        }
    }
}

impl RowCleaner for DataCleaner {
    fn clean_row(
        &self,
        row: &RawRow,
        row_number: usize,
        ledger: &CorrectionLedger,
        today: NaiveDate,
    ) -> ImportResult<RevenueRecord> {
        let mapped = self.field_mapper.map_row(row, row_number)?;
        Ok(self.clean_mapped(mapped, ledger, today))
    }
}
