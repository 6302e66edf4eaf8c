//! # Demand Diagnostic
//!
//! 需求進度診斷服務：載入資料、彙總進度、回寫完成狀態

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;

// Re-export 主要類型
pub use config::AppConfig;
pub use engine::{CompletionSummary, DiagnosticEngine};
pub use error::EngineError;

pub use demand_calc::{DiagnosticInput, DiagnosticOutcome};
pub use demand_core::{CompletionMode, DiagnosticConfig, DiagnosticReport};
pub use demand_store::{DiagnosticStore, SqliteStore, StoreConfig};

/// 系統版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
