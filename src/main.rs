//! 需求進度診斷命令列
//!
//! 讀取資料庫，輸出診斷報告 JSON 到 stdout。

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use demand_diag::{
    logging, AppConfig, CompletionMode, DiagnosticEngine, SqliteStore,
};

#[derive(Parser, Debug)]
#[command(name = "demand-diag", version, about = "需求進度診斷")]
struct Cli {
    /// JSON 配置檔
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 資料庫路徑（覆蓋配置檔）
    #[arg(short, long)]
    database: Option<String>,

    /// 建立缺少的資料表
    #[arg(long)]
    init_schema: bool,

    /// 完成狀態回寫方式: detached | awaited | disabled
    #[arg(long)]
    completion_mode: Option<CompletionMode>,

    /// 格式化輸出
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(database) = cli.database {
        config.store.database_path = database;
    }
    if cli.init_schema {
        config.store.create_schema = true;
    }
    if let Some(mode) = cli.completion_mode {
        config.diagnostic.completion_mode = mode;
    }

    logging::init(config.log_filter.as_deref());
    tracing::info!("需求進度診斷 v{}", demand_diag::VERSION);

    let store = SqliteStore::open(&config.store)
        .map_err(demand_diag::EngineError::StoreOpen)
        .with_context(|| format!("無法開啟資料庫 {}", config.store.database_path))?;
    let engine = DiagnosticEngine::new(store, config.diagnostic.clone());

    let outcome = engine.compute().await?;

    // 命令列結束即離開，背景回寫會被中斷，一律等待
    if config.diagnostic.writes_completions() {
        let summary = engine.apply_completions(&outcome.completions).await;
        tracing::info!(
            "回寫完成 {} 筆，失敗 {} 筆",
            summary.completed.len(),
            summary.failed.len()
        );
    }

    let output = if cli.pretty {
        serde_json::to_string_pretty(&outcome.report)?
    } else {
        serde_json::to_string(&outcome.report)?
    };
    println!("{}", output);

    Ok(())
}
