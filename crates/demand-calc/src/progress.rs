//! 生產進度累計

use demand_core::{
    ArremateEntry, ArremateTotals, OrderStatus, ProductionOrder, ProgressTally, TallyKey,
};
use std::collections::HashMap;

/// 依工單號彙總的整燙帳
#[derive(Debug, Clone, Default)]
pub struct ArremateBook {
    totals: HashMap<i64, ArremateTotals>,
}

impl ArremateBook {
    /// 只計入生產類帳目，同一工單的多筆帳目相加
    pub fn from_entries(entries: &[ArremateEntry]) -> Self {
        let mut totals: HashMap<i64, ArremateTotals> = HashMap::new();
        for entry in entries.iter().filter(|e| e.is_production()) {
            totals
                .entry(entry.production_order_number)
                .or_default()
                .add(entry);
        }
        Self { totals }
    }

    /// 工單的整燙合計，無帳目時為零
    pub fn totals_for(&self, order_number: i64) -> ArremateTotals {
        self.totals.get(&order_number).copied().unwrap_or_default()
    }
}

/// 以（需求、產品、變體）為鍵的進度帳
#[derive(Debug, Clone, Default)]
pub struct ProgressLedger {
    tallies: HashMap<TallyKey, ProgressTally>,
}

impl ProgressLedger {
    /// 從工單與整燙帳累計進度
    pub fn accumulate(orders: &[ProductionOrder], book: &ArremateBook) -> Self {
        let mut ledger = Self::default();
        for order in orders {
            ledger.record(order, book);
        }
        ledger
    }

    /// 累計單一工單
    ///
    /// 沒有關聯需求、或狀態不是開立/進行中/完工的工單不計入。
    pub fn record(&mut self, order: &ProductionOrder, book: &ArremateBook) {
        let Some(demand_id) = order.demand_id else {
            return;
        };
        let key = TallyKey::new(demand_id, order.product_id, order.variant.as_deref());

        match order.status {
            OrderStatus::Open | OrderStatus::InProgress => {
                let tally = self.tallies.entry(key).or_default();
                tally.sewing_qty += order.quantity.max(0);
            }
            OrderStatus::Finalized => {
                let produced = order.produced_quantity();
                let totals = book.totals_for(order.id);

                let tally = self.tallies.entry(key).or_default();
                tally.loss_qty += order.loss_quantity();
                tally.stock_qty += totals.packaged.max(0);
                tally.packaging_available_qty += (totals.finished - totals.packaged).max(0);
                tally.finishing_available_qty += (produced - totals.finished).max(0);
            }
            OrderStatus::Cancelled | OrderStatus::Unknown => {}
        }
    }

    /// 查詢進度，沒有紀錄時為全零
    pub fn tally(&self, key: &TallyKey) -> ProgressTally {
        self.tallies.get(key).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TallyKey, &ProgressTally)> {
        self.tallies.iter()
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }
}
