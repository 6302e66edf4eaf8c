//! 彙總列排序

use demand_core::AggregateRow;

/// 排序：未入庫完成者在前，同組內依優先級升冪；同值保持原順序
pub fn sort_for_presentation(rows: &mut [AggregateRow]) {
    rows.sort_by(|a, b| {
        a.is_stocked()
            .cmp(&b.is_stocked())
            .then(a.priority.cmp(&b.priority))
    });
}
