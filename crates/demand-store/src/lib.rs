//! # Demand Store
//!
//! 需求診斷的資料存取層：讀取契約與 SQLite 實作

pub mod config;
pub mod db;
pub mod error;
pub mod repository;
pub mod sqlite;

// Re-export 主要類型
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use repository::DiagnosticStore;
pub use sqlite::SqliteStore;
