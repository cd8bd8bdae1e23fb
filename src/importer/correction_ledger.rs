// ==========================================
// 营收数据导入 - 纠正台账
// ==========================================
// 职责: 记录单次导入调用内每个自然键的天数处理指令
// 来源: errors 桶（自动纠正） + requires_confirmation 桶（用户决策）
// 红线: 台账归属单次 ingest 调用,不跨调用共享
// ==========================================

use crate::domain::revenue::RevenueKey;
use crate::domain::validation::{DatasetValidationReport, UserDecision, UserDecisions, ValidatedRecord};
use crate::engine::calendar::calendar_days;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;
use tracing::{debug, warn};

/// 单个自然键的天数处理指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrectionDirective {
    /// 历史月份强制纠正（清洗时 was_corrected = true）
    AutoCorrect { corrected_days: i32, message: String },
    /// 用户已确认；resolved_days 为 None 表示沿用提交值（提交值也缺失时按日历天数）
    Confirmed {
        resolved_days: Option<i32>,
        note: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct CorrectionLedger {
    entries: HashMap<RevenueKey, CorrectionDirective>,
}

impl CorrectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由校验报告与用户决策构建台账
    ///
    /// # 错误
    /// - InvalidDecision: 决策下标越界 / 决策键不在待确认桶中 / 自定义天数越界
    pub fn build(
        report: &DatasetValidationReport,
        decisions: Option<&UserDecisions>,
    ) -> ImportResult<Self> {
        let mut ledger = Self::new();

        for record in &report.errors {
            ledger.record_auto_correction(record);
        }

        let Some(decisions) = decisions else {
            return Ok(ledger);
        };

        let pending = &report.requires_confirmation;
        if let Some(index) = decisions.by_index.keys().find(|i| **i >= pending.len()) {
            return Err(ImportError::InvalidDecision(format!(
                "决策下标 {} 超出待确认记录数 {}",
                index,
                pending.len()
            )));
        }
        if let Some(key) = decisions
            .by_key
            .keys()
            .find(|k| !pending.iter().any(|r| r.key.to_string() == **k))
        {
            return Err(ImportError::InvalidDecision(format!(
                "决策键 {} 不在待确认记录中",
                key
            )));
        }

        for (index, record) in pending.iter().enumerate() {
            let decision = decisions
                .decision_for(index, &record.key)
                .unwrap_or_else(|| {
                    warn!(index, key = %record.key, "待确认记录缺少用户决策，按接受处理");
                    UserDecision::Accepted
                });
            ledger.record_decision(record, decision)?;
        }

        Ok(ledger)
    }

    pub fn record_auto_correction(&mut self, record: &ValidatedRecord) {
        debug!(key = %record.key, corrected_days = record.validation.corrected_days, "登记自动纠正");
        self.entries.insert(
            record.key.clone(),
            CorrectionDirective::AutoCorrect {
                corrected_days: record.validation.corrected_days,
                message: record.validation.message.clone(),
            },
        );
    }

    pub fn record_decision(
        &mut self,
        record: &ValidatedRecord,
        decision: UserDecision,
    ) -> ImportResult<()> {
        let submitted = record
            .submitted_days
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());

        let directive = match decision {
            // 提交值缺失时沿用参与校验的天数（占位值）
            UserDecision::Accepted => CorrectionDirective::Confirmed {
                resolved_days: record
                    .submitted_days
                    .or(Some(record.validation.corrected_days)),
                note: record.validation.message.clone(),
            },
            UserDecision::UseSuggested => {
                let suggested = record.validation.suggested_days.or(record.submitted_days);
                CorrectionDirective::Confirmed {
                    resolved_days: suggested,
                    note: format!(
                        "Changed from {} to {} ({})",
                        submitted,
                        suggested.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                        record.validation.validation_type
                    ),
                }
            }
            UserDecision::CustomValue(days) => {
                let max = calendar_days(record.key.year, record.key.month) as i32;
                if !(0..=max).contains(&days) {
                    return Err(ImportError::InvalidDecision(format!(
                        "{} 的自定义天数 {} 超出范围 0..={}",
                        record.key, days, max
                    )));
                }
                CorrectionDirective::Confirmed {
                    resolved_days: Some(days),
                    note: format!("User override: {} days", days),
                }
            }
        };

        debug!(key = %record.key, ?decision, "登记用户决策");
        self.entries.insert(record.key.clone(), directive);
        Ok(())
    }

    pub fn get(&self, key: &RevenueKey) -> Option<&CorrectionDirective> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
