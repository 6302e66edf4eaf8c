//! 整燙（arremate）帳目模型

use serde::{Deserialize, Serialize};

/// 帳目類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    /// 生產入帳
    Production,
    /// 人工調整
    Adjustment,
    #[serde(other)]
    Unknown,
}

impl EntryType {
    pub fn from_db_str(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PRODUCTION" => EntryType::Production,
            "ADJUSTMENT" => EntryType::Adjustment,
            _ => EntryType::Unknown,
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            EntryType::Production => "PRODUCTION",
            EntryType::Adjustment => "ADJUSTMENT",
            EntryType::Unknown => "UNKNOWN",
        }
    }
}

/// 整燙帳目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArremateEntry {
    /// 對應的工單號
    pub production_order_number: i64,

    /// 已整燙數量
    pub quantity_finished: i64,

    /// 已包裝數量
    pub quantity_already_packaged: i64,

    /// 帳目類型
    pub entry_type: EntryType,
}

impl ArremateEntry {
    /// 創建生產入帳
    pub fn production(production_order_number: i64, finished: i64, packaged: i64) -> Self {
        Self {
            production_order_number,
            quantity_finished: finished,
            quantity_already_packaged: packaged,
            entry_type: EntryType::Production,
        }
    }

    /// 建構器模式：設置帳目類型
    pub fn with_entry_type(mut self, entry_type: EntryType) -> Self {
        self.entry_type = entry_type;
        self
    }

    pub fn is_production(&self) -> bool {
        self.entry_type == EntryType::Production
    }
}

/// 單一工單的整燙彙總
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArremateTotals {
    /// 已整燙合計
    pub finished: i64,
    /// 已包裝合計
    pub packaged: i64,
}

impl ArremateTotals {
    /// 累加一筆帳目
    pub fn add(&mut self, entry: &ArremateEntry) {
        self.finished += entry.quantity_finished;
        self.packaged += entry.quantity_already_packaged;
    }
}
