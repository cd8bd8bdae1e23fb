// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、原始行构造等功能
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use revenue_ingest::db::{ensure_schema, open_sqlite_connection};
use revenue_ingest::domain::RawRow;
use rusqlite::{params, Connection};
use serde_json::{json, Value};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接（统一 PRAGMA）
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 写入全局配置
pub fn insert_test_config(db_path: &str, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let conn = open_test_connection(db_path)?;
    conn.execute(
        r#"
        INSERT INTO config_kv (scope_id, key, value)
        VALUES ('global', ?1, ?2)
        ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value
        "#,
        params![key, value],
    )?;
    Ok(())
}

/// 固定处理日期: 2025-08-05（8 月已过 3 个工作日）
pub fn processing_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 5).unwrap()
}

// ==========================================
// RowBuilder - 原始行构造器
// ==========================================
// 表头使用上传文件中的原始写法（大小写/空格与文件一致）
pub struct RowBuilder {
    cells: serde_json::Map<String, Value>,
}

impl RowBuilder {
    pub fn new(customer: &str, service_type: &str, year: i32, month: &str) -> Self {
        let mut cells = serde_json::Map::new();
        cells.insert("Customer".to_string(), json!(customer));
        cells.insert("Service Type".to_string(), json!(service_type));
        cells.insert("Year".to_string(), json!(year));
        cells.insert("Month".to_string(), json!(month));
        Self { cells }
    }

    pub fn days(self, days: i64) -> Self {
        self.cell("Days", json!(days))
    }

    pub fn cost(self, cost: f64) -> Self {
        self.cell("Cost", json!(cost))
    }

    pub fn target(self, target: f64) -> Self {
        self.cell("Target", json!(target))
    }

    pub fn revenue(self, revenue: f64) -> Self {
        self.cell("Revenue", json!(revenue))
    }

    pub fn receivables(self, receivables: f64) -> Self {
        self.cell("Receivables Collected", json!(receivables))
    }

    pub fn cell(mut self, header: &str, value: Value) -> Self {
        self.cells.insert(header.to_string(), value);
        self
    }

    pub fn without(mut self, header: &str) -> Self {
        self.cells.remove(header);
        self
    }

    pub fn build(self) -> RawRow {
        self.cells.into_iter().collect()
    }
}

/// 历史月份、天数与日历一致的行（校验直接通过）
pub fn past_valid_row(customer: &str, month: &str, days: i64) -> RawRow {
    RowBuilder::new(customer, "Logistics", 2025, month)
        .days(days)
        .cost(1000.0)
        .target(2000.0)
        .revenue(1500.0)
        .receivables(800.0)
        .build()
}
