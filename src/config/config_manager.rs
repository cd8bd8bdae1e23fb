// ==========================================
// 营收数据导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::ingest_config_trait::IngestConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::MissingDaysPolicy;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;

        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 获取 global scope 配置快照（key → value）
    pub fn get_config_snapshot(&self) -> Result<HashMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(config_map)
    }

    /// 解析数值型配置,格式错误时记录告警并回退默认值
    fn parse_or_default<T: std::str::FromStr>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    warn!(config_key = key, value = %raw, "配置值格式错误，使用默认值");
                    Ok(default)
                }
            },
        }
    }
}

// ==========================================
// 实现 IngestConfigReader Trait
// ==========================================
#[async_trait]
impl IngestConfigReader for ConfigManager {
    // ===== 天数校验配置 =====

    async fn get_future_suggested_days_cap(&self) -> Result<i32, Box<dyn Error>> {
        let cap = self.parse_or_default(config_keys::FUTURE_SUGGESTED_DAYS_CAP, 22)?;
        if cap <= 0 {
            warn!(config_key = config_keys::FUTURE_SUGGESTED_DAYS_CAP, cap, "配置值非正，使用默认值");
            return Ok(22);
        }
        Ok(cap)
    }

    async fn get_missing_days_policy(&self) -> Result<MissingDaysPolicy, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::MISSING_DAYS_POLICY, "CALENDAR_DEFAULT")?;
        Ok(MissingDaysPolicy::from_config_value(&value))
    }

    async fn get_missing_days_placeholder(&self) -> Result<i32, Box<dyn Error>> {
        self.parse_or_default(config_keys::MISSING_DAYS_PLACEHOLDER, 30)
    }

    // ===== 折算配置 =====

    async fn get_prorate_current_month(&self) -> Result<bool, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::PRORATE_CURRENT_MONTH, "true")?;
        match value.trim().to_lowercase().as_str() {
            "false" | "0" | "no" => Ok(false),
            _ => Ok(true),
        }
    }

    // ===== 批次配置 =====

    async fn get_batch_history_limit(&self) -> Result<usize, Box<dyn Error>> {
        self.parse_or_default(config_keys::BATCH_HISTORY_LIMIT, 20)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 天数校验
    pub const FUTURE_SUGGESTED_DAYS_CAP: &str = "future_suggested_days_cap";
    pub const MISSING_DAYS_POLICY: &str = "missing_days_policy";
    pub const MISSING_DAYS_PLACEHOLDER: &str = "missing_days_placeholder";

    // 折算
    pub const PRORATE_CURRENT_MONTH: &str = "prorate_current_month";

    // 批次
    pub const BATCH_HISTORY_LIMIT: &str = "batch_history_limit";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let config = setup();

        assert_eq!(config.get_future_suggested_days_cap().await.unwrap(), 22);
        assert_eq!(
            config.get_missing_days_policy().await.unwrap(),
            MissingDaysPolicy::CalendarDefault
        );
        assert_eq!(config.get_missing_days_placeholder().await.unwrap(), 30);
        assert!(config.get_prorate_current_month().await.unwrap());
        assert_eq!(config.get_batch_history_limit().await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_overrides_are_read_back() {
        let config = setup();
        config
            .set_global_config_value(config_keys::FUTURE_SUGGESTED_DAYS_CAP, "20")
            .unwrap();
        config
            .set_global_config_value(config_keys::MISSING_DAYS_POLICY, "VALIDATE_PLACEHOLDER")
            .unwrap();
        config
            .set_global_config_value(config_keys::PRORATE_CURRENT_MONTH, "false")
            .unwrap();

        assert_eq!(config.get_future_suggested_days_cap().await.unwrap(), 20);
        assert_eq!(
            config.get_missing_days_policy().await.unwrap(),
            MissingDaysPolicy::ValidatePlaceholder
        );
        assert!(!config.get_prorate_current_month().await.unwrap());

        let snapshot = config.get_config_snapshot().unwrap();
        assert_eq!(snapshot.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_value_falls_back() {
        let config = setup();
        config
            .set_global_config_value(config_keys::FUTURE_SUGGESTED_DAYS_CAP, "many")
            .unwrap();
        assert_eq!(config.get_future_suggested_days_cap().await.unwrap(), 22);
    }
}
