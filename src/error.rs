//! 服務層錯誤類型

use std::path::PathBuf;
use thiserror::Error;

use demand_store::StoreError;

/// 服務層錯誤
#[derive(Error, Debug)]
pub enum EngineError {
    /// 任一讀取失敗，整次診斷中止
    #[error("資料載入失敗: {0}")]
    IngestionFailure(#[source] StoreError),

    #[error("資料庫開啟失敗: {0}")]
    StoreOpen(#[source] StoreError),

    #[error("配置檔讀取失敗 ({path}): {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置檔格式錯誤: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
