//! 進度彙總與診斷輸出模型

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// 彙總鍵：需求 × 產品 × 變體
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TallyKey {
    pub demand_id: i64,
    pub product_id: i64,
    /// 無變體時為空字串
    pub variant: String,
}

impl TallyKey {
    pub fn new(demand_id: i64, product_id: i64, variant: Option<&str>) -> Self {
        Self {
            demand_id,
            product_id,
            variant: variant.unwrap_or_default().to_string(),
        }
    }

    pub fn variant(&self) -> Option<&str> {
        if self.variant.is_empty() {
            None
        } else {
            Some(&self.variant)
        }
    }
}

impl fmt::Display for TallyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.demand_id, self.product_id, self.variant)
    }
}

/// 五個製程階段的進度累計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTally {
    /// 裁剪/車縫中
    pub sewing_qty: i64,
    /// 待整燙
    pub finishing_available_qty: i64,
    /// 待包裝
    pub packaging_available_qty: i64,
    /// 已入庫
    pub stock_qty: i64,
    /// 損耗
    pub loss_qty: i64,
}

impl ProgressTally {
    /// 各階段合計
    pub fn total_processed(&self) -> i64 {
        self.sewing_qty
            + self.finishing_available_qty
            + self.packaging_available_qty
            + self.stock_qty
            + self.loss_qty
    }

    pub fn is_non_negative(&self) -> bool {
        self.sewing_qty >= 0
            && self.finishing_available_qty >= 0
            && self.packaging_available_qty >= 0
            && self.stock_qty >= 0
            && self.loss_qty >= 0
    }
}

/// 彙總列（回傳給 UI 的單位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub demand_id: i64,
    pub product_id: i64,
    pub variant: Option<String>,

    /// 顯示名稱（含變體）
    pub product_name: String,
    pub image: Option<String>,
    pub priority: i32,

    pub required_qty: i64,
    pub sewing_qty: i64,
    pub finishing_available_qty: i64,
    pub packaging_available_qty: i64,
    pub stock_qty: i64,
    pub loss_qty: i64,

    pub total_processed: i64,
    /// 排隊餘額 = max(0, 需求 - 已處理)
    pub queue_backlog: i64,
    pub credit_total: i64,

    /// 來源需求
    pub demand_ids: Vec<i64>,
}

impl AggregateRow {
    /// 由進度累計與需求量建立彙總列
    pub fn from_tally(
        key: &TallyKey,
        tally: &ProgressTally,
        required_qty: i64,
        product_name: String,
        image: Option<String>,
        priority: i32,
    ) -> Self {
        let total_processed = tally.total_processed();
        let queue_backlog = (required_qty - total_processed).max(0);

        Self {
            demand_id: key.demand_id,
            product_id: key.product_id,
            variant: key.variant().map(str::to_string),
            product_name,
            image,
            priority,
            required_qty,
            sewing_qty: tally.sewing_qty,
            finishing_available_qty: tally.finishing_available_qty,
            packaging_available_qty: tally.packaging_available_qty,
            stock_qty: tally.stock_qty,
            loss_qty: tally.loss_qty,
            total_processed,
            queue_backlog,
            credit_total: total_processed + queue_backlog,
            demand_ids: vec![key.demand_id],
        }
    }

    pub fn key(&self) -> TallyKey {
        TallyKey::new(self.demand_id, self.product_id, self.variant.as_deref())
    }

    /// 入庫量已達需求量
    pub fn is_stocked(&self) -> bool {
        self.stock_qty >= self.required_qty
    }
}

/// 診斷報告
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// 逐需求明細，目前固定為空
    pub per_demand: Vec<Value>,

    /// 已排序的彙總列
    pub aggregated: Vec<AggregateRow>,
}

impl DiagnosticReport {
    pub fn new(aggregated: Vec<AggregateRow>) -> Self {
        Self {
            per_demand: Vec::new(),
            aggregated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_key_display() {
        assert_eq!(TallyKey::new(1, 2, Some("P")).to_string(), "1|2|P");
        assert_eq!(TallyKey::new(1, 2, None).to_string(), "1|2|");
        assert_eq!(TallyKey::new(1, 2, None).variant(), None);
    }

    #[test]
    fn test_row_backlog_and_credit() {
        let key = TallyKey::new(1, 2, None);
        let tally = ProgressTally {
            sewing_qty: 3,
            finishing_available_qty: 1,
            packaging_available_qty: 1,
            stock_qty: 2,
            loss_qty: 1,
        };

        let row = AggregateRow::from_tally(&key, &tally, 10, "Bata".into(), None, 1);
        assert_eq!(row.total_processed, 8);
        assert_eq!(row.queue_backlog, 2);
        assert_eq!(row.credit_total, 10);
        assert!(!row.is_stocked());
        assert_eq!(row.key(), key);
    }

    #[test]
    fn test_row_over_processed_has_zero_backlog() {
        let key = TallyKey::new(1, 2, Some("G"));
        let tally = ProgressTally {
            stock_qty: 12,
            ..Default::default()
        };

        let row = AggregateRow::from_tally(&key, &tally, 10, "Bata (G)".into(), None, 1);
        assert_eq!(row.queue_backlog, 0);
        assert_eq!(row.credit_total, 12);
        assert!(row.is_stocked());
        assert_eq!(row.variant.as_deref(), Some("G"));
    }

    #[test]
    fn test_report_serializes_wire_fields() {
        let report = DiagnosticReport::new(Vec::new());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["per_demand"], serde_json::json!([]));
        assert_eq!(json["aggregated"], serde_json::json!([]));
    }
}
