//! # Demand Diagnostic Engine
//!
//! 需求進度彙總計算（純計算，不含資料存取）

pub mod aggregate;
pub mod calculator;
pub mod catalog;
pub mod completion;
pub mod explosion;
pub mod ordering;
pub mod progress;

// Re-export 主要類型
pub use calculator::DiagnosticCalculator;
pub use catalog::{ProductCatalog, ResolvedProduct};
pub use completion::{CompletionCandidate, CompletionPlanner};
pub use progress::{ArremateBook, ProgressLedger};

use demand_core::{ArremateEntry, Demand, DiagnosticReport, ProductRow, ProductionOrder};

/// 診斷計算的輸入資料列
#[derive(Debug, Clone, Default)]
pub struct DiagnosticInput {
    /// 未封存的需求（依優先級、提出時間排序）
    pub demands: Vec<Demand>,

    /// 關聯需求的生產工單
    pub production_orders: Vec<ProductionOrder>,

    /// 生產類整燙帳目
    pub arremates: Vec<ArremateEntry>,

    /// 產品目錄
    pub products: Vec<ProductRow>,
}

/// 診斷計算結果
#[derive(Debug, Clone)]
pub struct DiagnosticOutcome {
    /// 回傳給呼叫端的報告
    pub report: DiagnosticReport,

    /// 應標記為完成的需求
    pub completions: Vec<CompletionCandidate>,

    /// 警告信息
    pub warnings: Vec<DiagnosticWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl DiagnosticOutcome {
    /// 創建空的計算結果
    pub fn empty() -> Self {
        Self {
            report: DiagnosticReport::default(),
            completions: Vec::new(),
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: DiagnosticWarning) {
        self.warnings.push(warning);
    }

    /// 無法對應 SKU 的需求ID
    pub fn unresolved_demand_ids(&self) -> Vec<i64> {
        self.warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Warning)
            .filter_map(|w| match w.subject {
                WarningSubject::Demand(id) => Some(id),
                WarningSubject::Product(_) => None,
            })
            .collect()
    }
}

/// 警告對象
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSubject {
    Demand(i64),
    Product(i64),
}

/// 診斷警告
#[derive(Debug, Clone)]
pub struct DiagnosticWarning {
    pub subject: WarningSubject,
    pub message: String,
    pub severity: WarningSeverity,
}

impl DiagnosticWarning {
    pub fn new(subject: WarningSubject, message: String, severity: WarningSeverity) -> Self {
        Self {
            subject,
            message,
            severity,
        }
    }

    /// 需求 SKU 在目錄中找不到
    pub fn unresolved_demand(demand_id: i64, sku: &str) -> Self {
        Self::new(
            WarningSubject::Demand(demand_id),
            format!("找不到 SKU {:?} 對應的產品，需求略過", sku),
            WarningSeverity::Warning,
        )
    }

    /// 套組需求沒有可展開的組成
    pub fn empty_kit(demand_id: i64, sku: &str) -> Self {
        Self::new(
            WarningSubject::Demand(demand_id),
            format!("套組 SKU {:?} 沒有組成，需求不產生彙總列", sku),
            WarningSeverity::Info,
        )
    }

    /// 產品 grade 欄位無法解析
    pub fn malformed_grade(product_id: i64, error: &demand_core::DiagnosticError) -> Self {
        Self::new(
            WarningSubject::Product(product_id),
            format!("grade 無法解析，視為無變體: {}", error),
            WarningSeverity::Warning,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
}
