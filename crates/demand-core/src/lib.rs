//! # Demand Core
//!
//! 需求診斷的核心資料模型與類型定義

pub mod aggregate;
pub mod arremate;
pub mod config;
pub mod demand;
pub mod product;
pub mod production;

// Re-export 主要類型
pub use aggregate::{AggregateRow, DiagnosticReport, ProgressTally, TallyKey};
pub use arremate::{ArremateEntry, ArremateTotals, EntryType};
pub use config::{CompletionMode, DiagnosticConfig};
pub use demand::{normalize_sku, Demand, DemandStatus};
pub use product::{CompositionEntry, GradeEntry, Product, ProductRow, ProductShape};
pub use production::{OrderStatus, ProductionOrder, Stage};

/// 診斷錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum DiagnosticError {
    #[error("無效的需求狀態: {0}")]
    InvalidDemandStatus(String),

    #[error("grade 欄位解析錯誤: {0}")]
    GradeParse(#[from] serde_json::Error),

    #[error("無效的完成模式: {0}")]
    InvalidCompletionMode(String),
}

pub type Result<T> = std::result::Result<T, DiagnosticError>;
