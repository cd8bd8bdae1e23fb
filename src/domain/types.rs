// ==========================================
// 营收数据导入 - 领域类型定义
// ==========================================
// 职责: 期间分类 / 校验类型 / 缺失天数策略
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 月份三字母缩写（1 月 → 下标 0）
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// 月份编号 → 三字母缩写（越界返回 None）
pub fn month_abbrev(month: u32) -> Option<&'static str> {
    match month {
        1..=12 => Some(MONTH_ABBREVIATIONS[(month - 1) as usize]),
        _ => None,
    }
}

// ==========================================
// 期间分类 (Period Kind)
// ==========================================
// 按 (year, month) 元组与处理月份比较,不看日
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodKind {
    Past,    // 已结束月份
    Current, // 进行中月份
    Future,  // 预测月份
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKind::Past => write!(f, "PAST"),
            PeriodKind::Current => write!(f, "CURRENT"),
            PeriodKind::Future => write!(f, "FUTURE"),
        }
    }
}

// ==========================================
// 校验类型 (Validation Type)
// ==========================================
// 序列化格式: kebab-case (与前端校验报告一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationType {
    None,                 // 通过
    AutoCorrected,        // 历史月份天数强制纠正
    CurrentMonthVariance, // 当月天数与已过工作日不符,待确认
    FutureSimulation,     // 未来月份,按模拟/预测处理,待确认
    CalendarDefault,      // 天数缺失,按日历天数补齐
}

impl ValidationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationType::None => "none",
            ValidationType::AutoCorrected => "auto-corrected",
            ValidationType::CurrentMonthVariance => "current-month-variance",
            ValidationType::FutureSimulation => "future-simulation",
            ValidationType::CalendarDefault => "calendar-default",
        }
    }
}

impl fmt::Display for ValidationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 缺失天数策略 (Missing Days Policy)
// ==========================================
// 配置键: missing_days_policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissingDaysPolicy {
    /// 不走天数校验,记入 warnings 桶,清洗时按日历天数补齐
    CalendarDefault,
    /// 以占位天数参与天数校验（历史月份会被自动纠正）
    ValidatePlaceholder,
}

impl MissingDaysPolicy {
    /// 从配置值解析,未知值回退为 CalendarDefault
    pub fn from_config_value(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "VALIDATE_PLACEHOLDER" => MissingDaysPolicy::ValidatePlaceholder,
            _ => MissingDaysPolicy::CalendarDefault,
        }
    }
}

impl fmt::Display for MissingDaysPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingDaysPolicy::CalendarDefault => write!(f, "CALENDAR_DEFAULT"),
            MissingDaysPolicy::ValidatePlaceholder => write!(f, "VALIDATE_PLACEHOLDER"),
        }
    }
}
