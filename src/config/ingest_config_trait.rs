// ==========================================
// 营收数据导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入管道所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::MissingDaysPolicy;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// IngestConfigReader Trait
// ==========================================
// 用途: 导入管道所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait IngestConfigReader: Send + Sync {
    // ===== 天数校验配置 =====

    /// 未来月份建议天数上限
    ///
    /// # 默认值
    /// - 22
    async fn get_future_suggested_days_cap(&self) -> Result<i32, Box<dyn Error>>;

    /// 天数缺失时的处理策略
    ///
    /// # 默认值
    /// - CALENDAR_DEFAULT
    async fn get_missing_days_policy(&self) -> Result<MissingDaysPolicy, Box<dyn Error>>;

    /// VALIDATE_PLACEHOLDER 策略下参与校验的占位天数
    ///
    /// # 默认值
    /// - 30
    async fn get_missing_days_placeholder(&self) -> Result<i32, Box<dyn Error>>;

    // ===== 折算配置 =====

    /// 是否对进行中月份的成本/目标按比例折算
    ///
    /// # 默认值
    /// - true
    async fn get_prorate_current_month(&self) -> Result<bool, Box<dyn Error>>;

    // ===== 批次配置 =====

    /// 批次历史查询默认条数
    ///
    /// # 默认值
    /// - 20
    async fn get_batch_history_limit(&self) -> Result<usize, Box<dyn Error>>;
}
