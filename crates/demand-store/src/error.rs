//! 資料存取層錯誤類型

use thiserror::Error;

/// 資料存取層錯誤
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("記錄未找到: {entity} with id={id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("資料庫連接失敗: {0}")]
    Connection(String),

    #[error("資料庫鎖獲取失敗: {0}")]
    Lock(String),

    #[error("資料庫查詢失敗: {0}")]
    Query(String),

    #[error("欄位解碼失敗 (field={field}): {message}")]
    Decode { field: &'static str, message: String },

    #[error("背景任務失敗: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => StoreError::Query(msg),
            rusqlite::Error::FromSqlConversionFailure(index, _, source) => StoreError::Decode {
                field: "column",
                message: format!("#{}: {}", index, source),
            },
            _ => StoreError::Query(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode {
            field: "json",
            message: err.to_string(),
        }
    }
}

/// Result 類型別名
pub type StoreResult<T> = Result<T, StoreError>;
