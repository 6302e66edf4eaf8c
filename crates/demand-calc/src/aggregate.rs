//! 彙總列建立

use demand_core::{AggregateRow, Demand, TallyKey};
use std::collections::HashMap;

use crate::catalog::ProductCatalog;
use crate::explosion::DemandItem;
use crate::progress::ProgressLedger;

/// 彙總列建立器
///
/// 以鍵去重，保留首次出現的位置，使排序時同值項目維持查詢順序。
#[derive(Debug, Default)]
pub struct AggregateBuilder {
    rows: Vec<AggregateRow>,
    index: HashMap<TallyKey, usize>,
}

impl AggregateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 處理一個需求項目
    pub fn process_item(
        &mut self,
        demand: &Demand,
        item: &DemandItem,
        catalog: &ProductCatalog,
        ledger: &ProgressLedger,
    ) {
        let key = TallyKey::new(demand.id, item.product_id, item.variant.as_deref());
        let tally = ledger.tally(&key);
        let (product_name, image) = Self::display_for(catalog, item);

        let row = AggregateRow::from_tally(
            &key,
            &tally,
            item.required_qty,
            product_name,
            image,
            demand.priority,
        );

        tracing::trace!(
            "彙總 {}: 需求 {}, 已處理 {}, 排隊 {}",
            key,
            row.required_qty,
            row.total_processed,
            row.queue_backlog
        );

        match self.index.get(&key) {
            Some(&position) => self.rows[position] = row,
            None => {
                self.index.insert(key, self.rows.len());
                self.rows.push(row);
            }
        }
    }

    /// 顯示名稱與圖片：有對應變體時附加變體名稱，優先使用變體圖片
    fn display_for(catalog: &ProductCatalog, item: &DemandItem) -> (String, Option<String>) {
        let Some(product) = catalog.get(item.product_id) else {
            return (format!("#{}", item.product_id), None);
        };

        match item
            .variant
            .as_deref()
            .and_then(|variant| product.find_variant(variant))
        {
            Some(entry) => (
                format!("{} ({})", product.name, entry.variation_name),
                entry.image.clone().or_else(|| product.image.clone()),
            ),
            None => (product.name.clone(), product.image.clone()),
        }
    }

    pub fn into_rows(self) -> Vec<AggregateRow> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ArremateBook;
    use demand_core::{GradeEntry, OrderStatus, Product, ProductionOrder};

    fn catalog() -> ProductCatalog {
        ProductCatalog::from_products(vec![
            Product::simple(
                1,
                "Short",
                vec![GradeEntry::new("P").with_image("short-p.png"), GradeEntry::new("M")],
            )
            .with_image("short.png"),
        ])
    }

    fn item(variant: Option<&str>, required_qty: i64) -> DemandItem {
        DemandItem {
            product_id: 1,
            variant: variant.map(str::to_string),
            required_qty,
        }
    }

    #[test]
    fn test_row_with_variant_display() {
        let demand = Demand::new(1, "SHORT", 10).with_priority(2);
        let orders = vec![ProductionOrder::new(1, 1, 4, OrderStatus::Open)
            .with_demand(1)
            .with_variant("P")];
        let ledger = ProgressLedger::accumulate(&orders, &ArremateBook::default());

        let mut builder = AggregateBuilder::new();
        builder.process_item(&demand, &item(Some("P"), 10), &catalog(), &ledger);
        builder.process_item(&demand, &item(Some("M"), 3), &catalog(), &ledger);
        let rows = builder.into_rows();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_name, "Short (P)");
        assert_eq!(rows[0].image.as_deref(), Some("short-p.png"));
        assert_eq!(rows[0].sewing_qty, 4);
        assert_eq!(rows[0].queue_backlog, 6);
        assert_eq!(rows[0].credit_total, 10);
        assert_eq!(rows[0].priority, 2);
        assert_eq!(rows[0].demand_ids, vec![1]);

        // 變體沒有圖片時退回產品圖片
        assert_eq!(rows[1].product_name, "Short (M)");
        assert_eq!(rows[1].image.as_deref(), Some("short.png"));
    }

    #[test]
    fn test_same_key_overwrites_in_place() {
        let demand = Demand::new(1, "SHORT", 10);
        let ledger = ProgressLedger::default();

        let mut builder = AggregateBuilder::new();
        builder.process_item(&demand, &item(None, 10), &catalog(), &ledger);
        builder.process_item(&demand, &item(Some("P"), 1), &catalog(), &ledger);
        builder.process_item(&demand, &item(None, 4), &catalog(), &ledger);
        let rows = builder.into_rows();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].variant, None);
        assert_eq!(rows[0].required_qty, 4);
        assert_eq!(rows[0].product_name, "Short");
    }

    #[test]
    fn test_unknown_component_uses_placeholder_name() {
        let demand = Demand::new(1, "KIT", 1);
        let mut builder = AggregateBuilder::new();
        let missing = DemandItem {
            product_id: 99,
            variant: None,
            required_qty: 2,
        };
        builder.process_item(&demand, &missing, &catalog(), &ProgressLedger::default());

        let rows = builder.into_rows();
        assert_eq!(rows[0].product_name, "#99");
        assert_eq!(rows[0].queue_backlog, 2);
    }
}
