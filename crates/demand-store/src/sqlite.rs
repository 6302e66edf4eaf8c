//! SQLite 診斷資料存取實作

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use demand_core::{
    ArremateEntry, Demand, DemandStatus, EntryType, OrderStatus, ProductRow, ProductionOrder,
    Stage,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::StoreConfig;
use crate::db;
use crate::error::{StoreError, StoreResult};
use crate::repository::DiagnosticStore;

const DEMAND_COLUMNS: &str =
    "id, product_sku, quantity_requested, priority, status, requested_at, completion_date";

/// SQLite 診斷資料存取
///
/// 寫入共用一條以互斥鎖保護的連線；檔案資料庫的讀取每次另開唯讀連線，
/// 四個載入查詢因此可在 blocking 執行緒池上同時執行。
/// 記憶體資料庫只有一條連線，讀取會依序排隊。
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    /// 有值時讀取另開連線
    read_config: Option<StoreConfig>,
}

impl SqliteStore {
    /// 依配置開啟資料庫
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let conn =
            db::open_connection(config).map_err(|e| StoreError::Connection(e.to_string()))?;
        tracing::info!("開啟資料庫: {}", config.database_path);
        let read_config = (!config.is_in_memory()).then(|| config.clone());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            read_config,
        })
    }

    /// 開啟記憶體資料庫並建立資料表
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open(&StoreConfig::new(":memory:").with_create_schema(true))
    }

    /// 從已有連線創建
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            read_config: None,
        }
    }

    fn get_conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| StoreError::Lock(e.to_string()))
    }

    /// 建立缺少的資料表
    pub fn init_schema(&self) -> StoreResult<()> {
        let conn = self.get_conn()?;
        db::init_schema(&conn)?;
        Ok(())
    }

    /// 在 blocking 執行緒上以連線執行操作
    async fn with_conn<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|e| StoreError::Lock(e.to_string()))?;
            op(&guard)
        })
        .await?
    }

    /// 以唯讀連線執行查詢；沒有讀取配置時退回共用連線
    async fn with_read<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let Some(config) = self.read_config.clone() else {
            return self.with_conn(op).await;
        };
        tokio::task::spawn_blocking(move || {
            let conn = db::open_read_connection(&config)?;
            op(&conn)
        })
        .await?
    }

    // ===== 資料寫入 =====

    pub fn insert_demand(&self, demand: &Demand) -> StoreResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!("INSERT INTO demand ({DEMAND_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                demand.id,
                demand.product_sku,
                demand.quantity_requested,
                demand.priority,
                demand.status.as_db_str(),
                demand.requested_at.map(|t| t.to_rfc3339()),
                demand.completion_date.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// 寫入產品；字串形式的 grade 原樣保存
    pub fn insert_product(&self, product: &ProductRow) -> StoreResult<()> {
        let grade = product.grade.as_ref().and_then(|value| match value {
            Value::Null => None,
            Value::String(raw) => Some(raw.clone()),
            other => Some(other.to_string()),
        });

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO product (id, name, sku, is_kit, grade, image) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                product.id,
                product.name,
                product.sku,
                product.is_kit,
                grade,
                product.image,
            ],
        )?;
        Ok(())
    }

    pub fn insert_production_order(&self, order: &ProductionOrder) -> StoreResult<()> {
        let stages = serde_json::to_string(&order.stages)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO production_order (id, demand_id, product_id, variant, quantity, status, stages)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                order.id,
                order.demand_id,
                order.product_id,
                order.variant,
                order.quantity,
                order.status.as_db_str(),
                stages,
            ],
        )?;
        Ok(())
    }

    pub fn insert_arremate(&self, entry: &ArremateEntry) -> StoreResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO arremate (production_order_number, quantity_finished, quantity_already_packaged, entry_type)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                entry.production_order_number,
                entry.quantity_finished,
                entry.quantity_already_packaged,
                entry.entry_type.as_db_str(),
            ],
        )?;
        Ok(())
    }

    /// 按主鍵查詢需求
    pub fn find_demand(&self, demand_id: i64) -> StoreResult<Option<Demand>> {
        let conn = self.get_conn()?;
        let demand = conn
            .query_row(
                &format!("SELECT {DEMAND_COLUMNS} FROM demand WHERE id = ?1"),
                params![demand_id],
                map_demand,
            )
            .optional()?;
        Ok(demand)
    }
}

// ===== 查詢 =====

fn query_open_demands(conn: &Connection) -> StoreResult<Vec<Demand>> {
    let [pending, in_production, completed] = DemandStatus::loaded_by_diagnostic();
    let mut stmt = conn.prepare(&format!(
        "SELECT {DEMAND_COLUMNS} FROM demand \
         WHERE status IN (?1, ?2, ?3) \
         ORDER BY priority ASC, requested_at IS NULL, requested_at ASC, id ASC"
    ))?;
    let demands = stmt
        .query_map(
            params![
                pending.as_db_str(),
                in_production.as_db_str(),
                completed.as_db_str()
            ],
            map_demand,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(demands)
}

fn query_demand_orders(conn: &Connection) -> StoreResult<Vec<ProductionOrder>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, demand_id, product_id, variant, quantity, status, stages
        FROM production_order
        WHERE demand_id IS NOT NULL
        ORDER BY id
        "#,
    )?;
    let orders = stmt
        .query_map([], map_production_order)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(orders)
}

fn query_production_arremates(conn: &Connection) -> StoreResult<Vec<ArremateEntry>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT a.production_order_number, a.quantity_finished,
               a.quantity_already_packaged, a.entry_type
        FROM arremate a
        JOIN production_order op ON op.id = a.production_order_number
        WHERE a.entry_type = ?1 AND op.demand_id IS NOT NULL
        ORDER BY a.id
        "#,
    )?;
    let entries = stmt
        .query_map(params![EntryType::Production.as_db_str()], |row| {
            Ok(ArremateEntry {
                production_order_number: row.get(0)?,
                quantity_finished: row.get(1)?,
                quantity_already_packaged: row.get(2)?,
                entry_type: EntryType::from_db_str(&row.get::<_, String>(3)?),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

fn query_products(conn: &Connection) -> StoreResult<Vec<ProductRow>> {
    let mut stmt =
        conn.prepare("SELECT id, name, sku, is_kit, grade, image FROM product ORDER BY id")?;
    let products = stmt
        .query_map([], |row| {
            Ok(ProductRow {
                id: row.get(0)?,
                name: row.get(1)?,
                sku: row.get(2)?,
                is_kit: row.get(3)?,
                // 交給目錄索引解析，格式錯誤時在那裡降級
                grade: row.get::<_, Option<String>>(4)?.map(Value::String),
                image: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(products)
}

fn update_demand_completed(
    conn: &Connection,
    demand_id: i64,
    completed_at: DateTime<Utc>,
) -> StoreResult<()> {
    let changed = conn.execute(
        "UPDATE demand SET status = ?1, completion_date = ?2 WHERE id = ?3",
        params![
            DemandStatus::Completed.as_db_str(),
            completed_at.to_rfc3339(),
            demand_id
        ],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound {
            entity: "demand",
            id: demand_id,
        });
    }
    Ok(())
}

// ===== 資料列映射 =====

fn map_demand(row: &Row<'_>) -> rusqlite::Result<Demand> {
    let status: String = row.get(4)?;
    let status = status
        .parse::<DemandStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Demand {
        id: row.get(0)?,
        product_sku: row.get(1)?,
        quantity_requested: row.get(2)?,
        priority: row.get(3)?,
        status,
        requested_at: parse_timestamp(row.get(5)?),
        completion_date: parse_timestamp(row.get(6)?),
    })
}

fn map_production_order(row: &Row<'_>) -> rusqlite::Result<ProductionOrder> {
    let id: i64 = row.get(0)?;
    let raw_stages: Option<String> = row.get(6)?;
    let stages = match raw_stages.as_deref() {
        None | Some("") => Vec::new(),
        Some(raw) => serde_json::from_str::<Vec<Stage>>(raw).unwrap_or_else(|err| {
            tracing::warn!("工單 {} 的 stages 無法解析，以名目數量計: {}", id, err);
            Vec::new()
        }),
    };

    Ok(ProductionOrder {
        id,
        demand_id: row.get(1)?,
        product_id: row.get(2)?,
        variant: row.get(3)?,
        quantity: row.get(4)?,
        status: OrderStatus::from_db_str(&row.get::<_, String>(5)?),
        stages,
    })
}

fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|t| t.with_timezone(&Utc))
}

#[async_trait]
impl DiagnosticStore for SqliteStore {
    async fn load_open_demands(&self) -> StoreResult<Vec<Demand>> {
        self.with_read(query_open_demands).await
    }

    async fn load_demand_orders(&self) -> StoreResult<Vec<ProductionOrder>> {
        self.with_read(query_demand_orders).await
    }

    async fn load_production_arremates(&self) -> StoreResult<Vec<ArremateEntry>> {
        self.with_read(query_production_arremates).await
    }

    async fn load_products(&self) -> StoreResult<Vec<ProductRow>> {
        self.with_read(query_products).await
    }

    async fn mark_demand_completed(
        &self,
        demand_id: i64,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.with_conn(move |conn| update_demand_completed(conn, demand_id, completed_at))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn seeded_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();

        store
            .insert_demand(&Demand::new(1, "A", 10).with_priority(2).with_requested_at(t0))
            .unwrap();
        store
            .insert_demand(
                &Demand::new(2, "B", 5)
                    .with_priority(1)
                    .with_requested_at(t0 + chrono::Duration::hours(1)),
            )
            .unwrap();
        store
            .insert_demand(&Demand::new(3, "C", 5).with_priority(1).with_requested_at(t0))
            .unwrap();
        store
            .insert_demand(&Demand::new(4, "D", 5).with_status(DemandStatus::Archived))
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_open_demands_ordered_by_priority_then_date() {
        let store = seeded_store();
        let demands = store.load_open_demands().await.unwrap();

        let ids: Vec<i64> = demands.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert!(demands[0].requested_at.is_some());
    }

    #[tokio::test]
    async fn test_only_demand_linked_orders_and_production_entries() {
        let store = seeded_store();
        store
            .insert_production_order(
                &ProductionOrder::new(100, 7, 10, OrderStatus::Finalized)
                    .with_demand(1)
                    .with_variant("P")
                    .with_stages(vec![Stage::new("costura").launched_with(9)]),
            )
            .unwrap();
        store
            .insert_production_order(&ProductionOrder::new(101, 7, 10, OrderStatus::Open))
            .unwrap();
        store.insert_arremate(&ArremateEntry::production(100, 4, 2)).unwrap();
        store
            .insert_arremate(
                &ArremateEntry::production(100, 1, 1).with_entry_type(EntryType::Adjustment),
            )
            .unwrap();
        store.insert_arremate(&ArremateEntry::production(101, 3, 3)).unwrap();

        let orders = store.load_demand_orders().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].variant.as_deref(), Some("P"));
        assert_eq!(orders[0].produced_quantity(), 9);

        let entries = store.load_production_arremates().await.unwrap();
        assert_eq!(entries, vec![ArremateEntry::production(100, 4, 2)]);
    }

    #[tokio::test]
    async fn test_products_keep_raw_grade_text() {
        let store = seeded_store();
        store
            .insert_product(&ProductRow {
                id: 1,
                name: "Kit".to_string(),
                sku: Some("KIT".to_string()),
                is_kit: true,
                grade: Some(serde_json::json!([{"variation_name": "U"}])),
                image: None,
            })
            .unwrap();
        store
            .insert_product(&ProductRow {
                id: 2,
                name: "Quebrado".to_string(),
                sku: Some("BAD".to_string()),
                is_kit: false,
                grade: Some(Value::String("not json".to_string())),
                image: None,
            })
            .unwrap();

        let products = store.load_products().await.unwrap();
        assert_eq!(products.len(), 2);
        assert!(products[0].is_kit);
        assert_eq!(products[0].parse_grade().unwrap().len(), 1);
        assert!(products[1].parse_grade().is_err());
    }

    #[tokio::test]
    async fn test_mark_demand_completed() {
        let store = seeded_store();
        let at = Utc.with_ymd_and_hms(2025, 3, 2, 12, 0, 0).unwrap();

        store.mark_demand_completed(1, at).await.unwrap();
        // 重複寫入無副作用
        store.mark_demand_completed(1, at).await.unwrap();

        let demand = store.find_demand(1).unwrap().unwrap();
        assert_eq!(demand.status, DemandStatus::Completed);
        assert_eq!(demand.completion_date, Some(at));

        let missing = store.mark_demand_completed(999, at).await;
        assert!(matches!(missing, Err(StoreError::NotFound { id: 999, .. })));
    }

    #[tokio::test]
    async fn test_malformed_stages_fall_back_to_nominal() {
        let store = seeded_store();
        {
            let conn = store.get_conn().unwrap();
            conn.execute(
                "INSERT INTO production_order (id, demand_id, product_id, quantity, status, stages) \
                 VALUES (200, 1, 7, 12, 'finalized', '{oops')",
                [],
            )
            .unwrap();
        }

        let orders = store.load_demand_orders().await.unwrap();
        assert_eq!(orders[0].stages.len(), 0);
        assert_eq!(orders[0].produced_quantity(), 12);
    }
    #[tokio::test]
    async fn test_undated_demand_sorts_after_dated_of_same_priority() {
        let store = SqliteStore::open_in_memory().unwrap();
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        store
            .insert_demand(&Demand::new(1, "A", 1).with_priority(1).with_requested_at(t0))
            .unwrap();
        store.insert_demand(&Demand::new(2, "B", 1).with_priority(1)).unwrap();
        store.insert_demand(&Demand::new(3, "C", 1).with_priority(0)).unwrap();

        let ids: Vec<i64> = store
            .load_open_demands()
            .await
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_file_store_reads_do_not_wait_for_shared_connection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diag.db");
        let config = StoreConfig::new(path.to_string_lossy()).with_create_schema(true);
        let store = SqliteStore::open(&config).unwrap();
        store.insert_demand(&Demand::new(1, "A", 10)).unwrap();
        store
            .insert_production_order(
                &ProductionOrder::new(100, 7, 10, OrderStatus::Finalized).with_demand(1),
            )
            .unwrap();
        store.insert_arremate(&ArremateEntry::production(100, 10, 10)).unwrap();

        // 佔住寫入連線，讀取仍須完成
        let _guard = store.get_conn().unwrap();
        let loaded = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            tokio::try_join!(
                store.load_open_demands(),
                store.load_demand_orders(),
                store.load_production_arremates(),
                store.load_products(),
            )
        })
        .await
        .expect("讀取被共用連線阻塞");

        let (demands, orders, arremates, products) = loaded.unwrap();
        assert_eq!(demands.len(), 1);
        assert_eq!(orders.len(), 1);
        assert_eq!(arremates.len(), 1);
        assert!(products.is_empty());
    }
}
