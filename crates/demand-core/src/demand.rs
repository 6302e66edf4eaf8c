//! 需求模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DiagnosticError;

/// 需求狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandStatus {
    /// 待處理
    Pending,
    /// 生產中
    InProduction,
    /// 已完成
    Completed,
    /// 已封存（由外部排程處理）
    Archived,
}

impl DemandStatus {
    /// 資料庫中的字串表示
    pub fn as_db_str(&self) -> &'static str {
        match self {
            DemandStatus::Pending => "pending",
            DemandStatus::InProduction => "in_production",
            DemandStatus::Completed => "completed",
            DemandStatus::Archived => "archived",
        }
    }

    /// 診斷時需要載入的狀態
    pub fn loaded_by_diagnostic() -> [DemandStatus; 3] {
        [
            DemandStatus::Pending,
            DemandStatus::InProduction,
            DemandStatus::Completed,
        ]
    }
}

impl fmt::Display for DemandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl FromStr for DemandStatus {
    type Err = DiagnosticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(DemandStatus::Pending),
            "in_production" => Ok(DemandStatus::InProduction),
            "completed" => Ok(DemandStatus::Completed),
            "archived" => Ok(DemandStatus::Archived),
            other => Err(DiagnosticError::InvalidDemandStatus(other.to_string())),
        }
    }
}

/// 需求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demand {
    /// 需求ID
    pub id: i64,

    /// 產品 SKU（可能是套組或套組內某個 grade 的 SKU）
    pub product_sku: String,

    /// 需求數量
    pub quantity_requested: i64,

    /// 優先級（數字越小越緊急）
    pub priority: i32,

    /// 狀態
    pub status: DemandStatus,

    /// 提出時間
    pub requested_at: Option<DateTime<Utc>>,

    /// 完成時間
    pub completion_date: Option<DateTime<Utc>>,
}

impl Demand {
    /// 創建新的需求（狀態為待處理）
    pub fn new(id: i64, product_sku: impl Into<String>, quantity_requested: i64) -> Self {
        Self {
            id,
            product_sku: product_sku.into(),
            quantity_requested,
            priority: 0,
            status: DemandStatus::Pending,
            requested_at: None,
            completion_date: None,
        }
    }

    /// 建構器模式：設置優先級
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: DemandStatus) -> Self {
        self.status = status;
        self
    }

    /// 建構器模式：設置提出時間
    pub fn with_requested_at(mut self, requested_at: DateTime<Utc>) -> Self {
        self.requested_at = Some(requested_at);
        self
    }

    /// 用於目錄比對的 SKU（去空白、轉大寫）
    pub fn normalized_sku(&self) -> String {
        normalize_sku(&self.product_sku)
    }

    pub fn is_completed(&self) -> bool {
        self.status == DemandStatus::Completed
    }
}

/// SKU 正規化：去除前後空白並轉大寫
pub fn normalize_sku(sku: &str) -> String {
    sku.trim().to_uppercase()
}
