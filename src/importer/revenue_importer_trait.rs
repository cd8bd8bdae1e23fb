// ==========================================
// 营收数据导入 - 导入管道 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// ==========================================

use crate::domain::revenue::{IngestOutcome, RawRow, RevenueRecord};
use crate::domain::validation::UserDecisions;
use crate::importer::correction_ledger::CorrectionLedger;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::MappedRow;
use async_trait::async_trait;
use chrono::NaiveDate;

// ==========================================
// RevenueImporter Trait
// ==========================================
// 用途: 营收导入主接口
// 实现者: RevenueImporterImpl
#[async_trait]
pub trait RevenueImporter: Send + Sync {
    /// 以当前本地日期为处理日期导入
    async fn ingest(
        &self,
        rows: Vec<RawRow>,
        decisions: Option<UserDecisions>,
    ) -> ImportResult<IngestOutcome>;

    /// 以指定处理日期导入
    ///
    /// # 返回
    /// - Ok(ConfirmationRequired): 存在待确认记录且未提供决策,未落库
    /// - Ok(Committed): 已整批提交
    /// - Err(InvalidDecision): 决策无法对应到待确认记录
    /// - Err(CommitFailure): 事务失败,整批回滚
    ///
    /// # 流程
    /// 1. 前置提取自然键与天数 + 数据集校验
    /// 2. 待确认且无决策 → 暂停
    /// 3. 构建纠正台账
    /// 4. 逐行清洗（缺失必填字段的行计入 errors）
    /// 5. 单事务 upsert
    async fn ingest_on(
        &self,
        rows: Vec<RawRow>,
        decisions: Option<UserDecisions>,
        today: NaiveDate,
    ) -> ImportResult<IngestOutcome>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 原始行 → 标准字段
// 实现者: field_mapper::FieldMapper
pub trait FieldMapper: Send + Sync {
    /// # 错误
    /// - MissingField: Customer / Service Type / Year / Month 缺失
    /// - InvalidMonth: 月份无法识别
    fn map_row(&self, row: &RawRow, row_number: usize) -> ImportResult<MappedRow>;
}

// ==========================================
// RowCleaner Trait
// ==========================================
// 用途: 确定最终天数 + 按比例折算
// 实现者: data_cleaner::DataCleaner
pub trait RowCleaner: Send + Sync {
    fn clean_row(
        &self,
        row: &RawRow,
        row_number: usize,
        ledger: &CorrectionLedger,
        today: NaiveDate,
    ) -> ImportResult<RevenueRecord>;
}
