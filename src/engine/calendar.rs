// ==========================================
// 营收数据导入 - 日历计算
// ==========================================
// 职责: 闰年判定 / 月日历天数 / 当月已过工作日 / 期间分类
// 红线: 纯函数,不读系统时间（today 由调用方注入）
// ==========================================

use crate::domain::types::{PeriodKind, MONTH_ABBREVIATIONS};
use chrono::{Datelike, NaiveDate, Weekday};

/// 闰年判定（对所有整数有定义,含非正年份）
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// 月日历天数
///
/// # 返回
/// - 28/29/30/31: month 在 1-12 内
/// - 0: month 越界（调用方应只传入已解析的月份）
pub fn calendar_days(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// 当月已过工作日数（周一至周五,含 today 当天）
///
/// # 返回
/// - Some(n): (year, month) 即 today 所在月份
/// - None: 其他月份（"已过"对未开始/已结束的月份无意义）
pub fn elapsed_business_days(year: i32, month: u32, today: NaiveDate) -> Option<u32> {
    if year != today.year() || month != today.month() {
        return None;
    }

    let count = (1..=today.day())
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
        .count();

    Some(count as u32)
}

/// 期间分类：按 (year, month) 元组与处理月份比较
pub fn classify_period(year: i32, month: u32, today: NaiveDate) -> PeriodKind {
    match (year, month).cmp(&(today.year(), today.month())) {
        std::cmp::Ordering::Less => PeriodKind::Past,
        std::cmp::Ordering::Equal => PeriodKind::Current,
        std::cmp::Ordering::Greater => PeriodKind::Future,
    }
}

/// 当月已过比例（today.day / calendar_days）,仅对进行中月份有意义
pub fn elapsed_fraction(year: i32, month: u32, today: NaiveDate) -> Option<f64> {
    if classify_period(year, month, today) != PeriodKind::Current {
        return None;
    }
    let days = calendar_days(year, month);
    if days == 0 {
        return None;
    }
    Some(today.day() as f64 / days as f64)
}

/// 解析月份：三字母缩写 / 英文全称（大小写不敏感）/ 数字 1-12
pub fn parse_month(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(n) = trimmed.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }

    let lower = trimmed.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTH_ABBREVIATIONS
        .iter()
        .position(|abbr| lower.starts_with(&abbr.to_lowercase()))
        .filter(|_| lower.len() == 3 || is_full_month_name(&lower))
        .map(|idx| idx as u32 + 1)
}

fn is_full_month_name(lower: &str) -> bool {
    const FULL_NAMES: [&str; 13] = [
        "january", "february", "march", "april", "may", "june", "july", "august",
        "september", "october", "november", "december", "sept",
    ];
    FULL_NAMES.contains(&lower)
}
