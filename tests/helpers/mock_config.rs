// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use revenue_ingest::config::IngestConfigReader;
use revenue_ingest::domain::types::MissingDaysPolicy;
use std::error::Error;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub future_days_cap: i32,
    pub missing_days_policy: MissingDaysPolicy,
    pub missing_days_placeholder: i32,
    pub prorate_current_month: bool,
    pub batch_history_limit: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            future_days_cap: 22,
            missing_days_policy: MissingDaysPolicy::CalendarDefault,
            missing_days_placeholder: 30,
            prorate_current_month: true,
            batch_history_limit: 20,
        }
    }
}

impl MockConfig {
    /// 缺失天数按占位值参与校验
    pub fn placeholder_policy(placeholder: i32) -> Self {
        Self {
            missing_days_policy: MissingDaysPolicy::ValidatePlaceholder,
            missing_days_placeholder: placeholder,
            ..Self::default()
        }
    }
}

#[async_trait]
impl IngestConfigReader for MockConfig {
    async fn get_future_suggested_days_cap(&self) -> Result<i32, Box<dyn Error>> {
        Ok(self.future_days_cap)
    }

    async fn get_missing_days_policy(&self) -> Result<MissingDaysPolicy, Box<dyn Error>> {
        Ok(self.missing_days_policy)
    }

    async fn get_missing_days_placeholder(&self) -> Result<i32, Box<dyn Error>> {
        Ok(self.missing_days_placeholder)
    }

    async fn get_prorate_current_month(&self) -> Result<bool, Box<dyn Error>> {
        Ok(self.prorate_current_month)
    }

    async fn get_batch_history_limit(&self) -> Result<usize, Box<dyn Error>> {
        Ok(self.batch_history_limit)
    }
}
