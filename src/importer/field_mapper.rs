// ==========================================
// 营收数据导入 - 字段映射器实现
// ==========================================
// 职责: 原始行 → 标准字段提取 + 类型转换
// 红线: 列名规范化规则只在 normalize_key 一处定义
// ==========================================
// 列名规范化: 转小写,只保留字母数字
//   "Service Type" / "service_type" / " SERVICETYPE " → "servicetype"
// ==========================================

use crate::domain::revenue::{RawRow, RevenueKey};
use crate::domain::validation::ValidationCandidate;
use crate::engine::calendar::parse_month;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::revenue_importer_trait::FieldMapper as FieldMapperTrait;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

// ==========================================
// 标准字段与列名别名（规范化后的形式）
// ==========================================
pub mod fields {
    pub const CUSTOMER: (&str, &[&str]) = ("Customer", &["customer"]);
    pub const SERVICE_TYPE: (&str, &[&str]) = ("Service Type", &["servicetype", "serviceline"]);
    pub const YEAR: (&str, &[&str]) = ("Year", &["year"]);
    pub const MONTH: (&str, &[&str]) = ("Month", &["month"]);
    pub const DAYS: (&str, &[&str]) = ("Days", &["days"]);
    pub const COST: (&str, &[&str]) = ("Cost", &["cost"]);
    pub const TARGET: (&str, &[&str]) = ("Target", &["target"]);
    pub const REVENUE: (&str, &[&str]) = ("Revenue", &["revenue"]);
    pub const RECEIVABLES_COLLECTED: (&str, &[&str]) = (
        "Receivables Collected",
        &["receivablescollected", "receivables"],
    );
}

/// 列名规范化
pub fn normalize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

// ==========================================
// RowFieldIndex - 单行规范化列名索引
// ==========================================
// 每行构建一次,之后所有字段查询都走索引
pub struct RowFieldIndex<'a> {
    values: HashMap<String, &'a Value>,
}

impl<'a> RowFieldIndex<'a> {
    pub fn build(row: &'a RawRow) -> Self {
        let mut values = HashMap::with_capacity(row.len());
        for (key, value) in row {
            let normalized = normalize_key(key);
            if normalized.is_empty() {
                continue;
            }
            // 同一规范名出现多次时,保留第一个非空值
            let slot = values.entry(normalized).or_insert(value);
            if is_blank(*slot) && !is_blank(value) {
                *slot = value;
            }
        }
        Self { values }
    }

    /// 按别名顺序取第一个非空值
    pub fn get(&self, aliases: &[&str]) -> Option<&'a Value> {
        aliases
            .iter()
            .filter_map(|alias| self.values.get(*alias).copied())
            .find(|value| !is_blank(value))
    }

    /// 文本字段（字符串去首尾空白,数字转字符串）
    pub fn text(&self, aliases: &[&str]) -> Option<String> {
        match self.get(aliases)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// 数值字段（去千分位逗号）
    ///
    /// # 返回
    /// - Some(f64): 可解析
    /// - None: 缺失或无法解析
    pub fn number(&self, aliases: &[&str]) -> Option<f64> {
        let parsed = match self.get(aliases)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|v| v.is_finite())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

// ==========================================
// MappedRow - 映射后的中间结构
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub row_number: usize,
    pub key: RevenueKey,
    pub submitted_days: Option<i32>,
    pub cost: f64,
    pub target: f64,
    pub revenue: f64,
    pub receivables_collected: f64,
}

impl MappedRow {
    pub fn candidate(&self) -> ValidationCandidate {
        ValidationCandidate {
            row_number: self.row_number,
            key: self.key.clone(),
            submitted_days: self.submitted_days,
        }
    }
}

// ==========================================
// FieldMapper - 字段映射器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_row(&self, row: &RawRow, row_number: usize) -> ImportResult<MappedRow> {
        let index = RowFieldIndex::build(row);

        let customer = Self::required_text(&index, fields::CUSTOMER, row_number)?;
        let service_type = Self::required_text(&index, fields::SERVICE_TYPE, row_number)?;
        let year = Self::parse_year(&index, row_number)?;
        let month_raw = Self::required_text(&index, fields::MONTH, row_number)?;
        let month = parse_month(&month_raw).ok_or_else(|| ImportError::InvalidMonth {
            row: row_number,
            value: month_raw.clone(),
        })?;

        // 天数按整数截断（"30.0" → 30）
        let submitted_days = index.number(fields::DAYS.1).map(|d| d.trunc() as i32);

        Ok(MappedRow {
            row_number,
            key: RevenueKey::new(&customer, &service_type, year, month),
            submitted_days,
            cost: Self::number_or_zero(&index, fields::COST, row_number),
            target: Self::number_or_zero(&index, fields::TARGET, row_number),
            revenue: Self::number_or_zero(&index, fields::REVENUE, row_number),
            receivables_collected: Self::number_or_zero(
                &index,
                fields::RECEIVABLES_COLLECTED,
                row_number,
            ),
        })
    }
}

impl FieldMapper {
    fn required_text(
        index: &RowFieldIndex,
        (name, aliases): (&str, &[&str]),
        row_number: usize,
    ) -> ImportResult<String> {
        index
            .text(aliases)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ImportError::MissingField {
                row: row_number,
                field: name.to_string(),
            })
    }

    /// 年份必须为非零整数,否则视同缺失
    fn parse_year(index: &RowFieldIndex, row_number: usize) -> ImportResult<i32> {
        let (name, aliases) = fields::YEAR;
        index
            .number(aliases)
            .map(|y| y.trunc())
            .filter(|y| *y != 0.0 && *y >= i32::MIN as f64 && *y <= i32::MAX as f64)
            .map(|y| y as i32)
            .ok_or_else(|| ImportError::MissingField {
                row: row_number,
                field: name.to_string(),
            })
    }

    /// 数值字段缺失或无法解析时按 0 处理
    fn number_or_zero(index: &RowFieldIndex, (name, aliases): (&str, &[&str]), row_number: usize) -> f64 {
        match index.number(aliases) {
            Some(v) => v,
            None => {
                if index.get(aliases).is_some() {
                    debug!(row_number, field = name, "数值无法解析，按 0 处理");
                }
                0.0
            }
        }
    }
}
