// ==========================================
// 营收数据导入 - 天数校验领域模型
// ==========================================
// 职责: 校验结论 / 数据集校验报告 / 用户决策
// 生命周期: 仅在单次导入调用内,不落库
// ==========================================

use crate::domain::revenue::RevenueKey;
use crate::domain::types::ValidationType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ==========================================
// ValidationVerdict - 单条天数校验结论
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    /// 仅在强制自动纠正时为 false
    pub is_valid: bool,
    /// 无人工干预时将采用的天数
    pub corrected_days: i32,
    pub requires_confirmation: bool,
    pub validation_type: ValidationType,
    pub suggested_days: Option<i32>,
    pub message: String,
}

impl ValidationVerdict {
    /// 通过（保留提交值）
    pub fn passed(submitted_days: i32) -> Self {
        Self {
            is_valid: true,
            corrected_days: submitted_days,
            requires_confirmation: false,
            validation_type: ValidationType::None,
            suggested_days: None,
            message: String::new(),
        }
    }
}

// ==========================================
// ValidationCandidate - 校验前置提取结果
// ==========================================
// 仅提取自然键与提交天数,其余字段留给清洗层
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationCandidate {
    pub row_number: usize,
    pub key: RevenueKey,
    pub submitted_days: Option<i32>,
}

// ==========================================
// ValidatedRecord - 带结论的记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedRecord {
    pub row_number: usize,
    pub key: RevenueKey,
    pub submitted_days: Option<i32>,
    pub validation: ValidationVerdict,
}

// ==========================================
// DatasetValidationReport - 数据集校验报告
// ==========================================
// errors 桶表示"需要自动修正",不是失败
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetValidationReport {
    pub valid: Vec<ValidatedRecord>,
    pub warnings: Vec<ValidatedRecord>,
    pub errors: Vec<ValidatedRecord>,
    pub requires_confirmation: Vec<ValidatedRecord>,
    pub summary: ValidationSummary,
}

impl DatasetValidationReport {
    pub fn needs_confirmation(&self) -> bool {
        !self.requires_confirmation.is_empty()
    }
}

/// 校验汇总（total = valid + errors + confirmation_needed + warnings）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub warnings: usize,
    pub errors: usize,
    pub confirmation_needed: usize,
}

impl ValidationSummary {
    pub fn is_balanced(&self) -> bool {
        self.total == self.valid + self.errors + self.confirmation_needed + self.warnings
    }
}

// ==========================================
// UserDecision - 用户对待确认记录的决策
// ==========================================
// JSON: "accepted" | "useSuggested" | {"customValue": 20}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserDecision {
    /// 保留提交值
    Accepted,
    /// 采用系统建议值
    UseSuggested,
    /// 采用用户自定义值
    CustomValue(i32),
}

// ==========================================
// UserDecisions - 决策集合
// ==========================================
// by_index: 按待确认桶下标寻址
// by_key: 按自然键字符串（customer|service_type|year|Mon）寻址
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDecisions {
    #[serde(default)]
    pub by_index: BTreeMap<usize, UserDecision>,
    #[serde(default)]
    pub by_key: HashMap<String, UserDecision>,
}

impl UserDecisions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, index: usize, decision: UserDecision) -> Self {
        self.by_index.insert(index, decision);
        self
    }

    pub fn with_key(mut self, key: &RevenueKey, decision: UserDecision) -> Self {
        self.by_key.insert(key.to_string(), decision);
        self
    }

    /// 同一记录两种寻址都有时,下标优先
    pub fn decision_for(&self, index: usize, key: &RevenueKey) -> Option<UserDecision> {
        self.by_index
            .get(&index)
            .or_else(|| self.by_key.get(&key.to_string()))
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty() && self.by_key.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_index.len() + self.by_key.len()
    }
}
