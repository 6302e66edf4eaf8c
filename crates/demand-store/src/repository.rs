//! 診斷資料存取契約

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use demand_core::{ArremateEntry, Demand, ProductRow, ProductionOrder};

use crate::error::StoreResult;

/// 診斷資料存取
///
/// 四個讀取彼此獨立，可同時發出；寫入只有標記需求完成一項。
#[async_trait]
pub trait DiagnosticStore: Send + Sync {
    /// 狀態為待處理/生產中/已完成的需求，依優先級、提出時間排序
    async fn load_open_demands(&self) -> StoreResult<Vec<Demand>>;

    /// 關聯需求的生產工單
    async fn load_demand_orders(&self) -> StoreResult<Vec<ProductionOrder>>;

    /// 關聯需求工單的生產類整燙帳目
    async fn load_production_arremates(&self) -> StoreResult<Vec<ArremateEntry>>;

    /// 產品目錄
    async fn load_products(&self) -> StoreResult<Vec<ProductRow>>;

    /// 標記需求完成並記錄完成時間
    async fn mark_demand_completed(
        &self,
        demand_id: i64,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<()>;
}
