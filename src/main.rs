// ==========================================
// 营收数据导入 - 命令行入口
// ==========================================
// 用法:
//   revenue-ingest <rows.json> [decisions.json]
//
// rows.json:      原始行数组（表头 → 单元格值）
// decisions.json: {"byIndex": {"0": "accepted"}, "byKey": {...}}
//
// 不带决策文件时执行第一步校验；带决策文件时执行确认提交。
// 数据库路径: REVENUE_INGEST_DB_PATH,缺省为系统数据目录
// ==========================================

use anyhow::{bail, Context};
use revenue_ingest::domain::{RawRow, UserDecisions};
use revenue_ingest::{logging, RevenueImportApi};
use std::path::{Path, PathBuf};

const DB_PATH_ENV: &str = "REVENUE_INGEST_DB_PATH";

/// 默认数据库路径
fn default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./revenue_ingest.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("revenue-ingest");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("revenue_ingest.db");
        }
    }

    path.to_string_lossy().to_string()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("读取文件失败: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("JSON 解析失败: {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let Some(rows_path) = args.next() else {
        bail!("用法: revenue-ingest <rows.json> [decisions.json]");
    };
    let decisions_path = args.next();

    let rows: Vec<RawRow> = read_json(Path::new(&rows_path))?;

    let db_path = default_db_path();
    tracing::info!(db_path = %db_path, version = revenue_ingest::VERSION, "使用数据库");
    let api = RevenueImportApi::new(&db_path)?;

    let output = match decisions_path {
        None => serde_json::to_string_pretty(&api.validate_upload(rows).await?)?,
        Some(path) => {
            let decisions: UserDecisions = read_json(Path::new(&path))?;
            serde_json::to_string_pretty(&api.confirm_upload(rows, decisions).await?)?
        }
    };

    println!("{}", output);
    Ok(())
}
