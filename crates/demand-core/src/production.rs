//! 生產工單模型

use serde::{Deserialize, Serialize};

/// 工單狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// 已開立（裁剪中）
    Open,
    /// 進行中（車縫中）
    InProgress,
    /// 已完工
    Finalized,
    /// 已取消
    Cancelled,
    /// 無法辨識的狀態
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// 從資料庫字串解析，無法辨識時回傳 `Unknown`
    pub fn from_db_str(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" => OrderStatus::Open,
            "in_progress" => OrderStatus::InProgress,
            "finalized" => OrderStatus::Finalized,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Unknown,
        }
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Finalized => "finalized",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown => "unknown",
        }
    }

    /// 仍在裁剪/車縫階段
    pub fn is_in_sewing(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::InProgress)
    }
}

/// 工單製程階段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// 階段名稱
    pub label: String,

    /// 是否已報工
    #[serde(default)]
    pub launched: bool,

    /// 報工數量
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl Stage {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            launched: false,
            quantity: None,
        }
    }

    /// 建構器模式：標記為已報工
    pub fn launched_with(mut self, quantity: i64) -> Self {
        self.launched = true;
        self.quantity = Some(quantity);
        self
    }
}

/// 生產工單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionOrder {
    /// 工單號
    pub id: i64,

    /// 關聯需求
    pub demand_id: Option<i64>,

    /// 產品ID
    pub product_id: i64,

    /// 變體（尺寸/顏色等）
    pub variant: Option<String>,

    /// 名目數量
    pub quantity: i64,

    /// 狀態
    pub status: OrderStatus,

    /// 製程階段（依順序）
    #[serde(default)]
    pub stages: Vec<Stage>,
}

impl ProductionOrder {
    /// 創建新的生產工單
    pub fn new(id: i64, product_id: i64, quantity: i64, status: OrderStatus) -> Self {
        Self {
            id,
            demand_id: None,
            product_id,
            variant: None,
            quantity,
            status,
            stages: Vec::new(),
        }
    }

    /// 建構器模式：設置關聯需求
    pub fn with_demand(mut self, demand_id: i64) -> Self {
        self.demand_id = Some(demand_id);
        self
    }

    /// 建構器模式：設置變體
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// 建構器模式：設置製程階段
    pub fn with_stages(mut self, stages: Vec<Stage>) -> Self {
        self.stages = stages;
        self
    }

    /// 實際產出數量
    ///
    /// 從最後一個階段往前找第一個已報工且有數量的階段；
    /// 找不到時回退為名目數量。
    pub fn produced_quantity(&self) -> i64 {
        self.stages
            .iter()
            .rev()
            .find(|stage| stage.launched && stage.quantity.is_some())
            .and_then(|stage| stage.quantity)
            .unwrap_or(self.quantity)
    }

    /// 損耗數量 = max(0, 名目 - 產出)
    pub fn loss_quantity(&self) -> i64 {
        (self.quantity - self.produced_quantity()).max(0)
    }
}
