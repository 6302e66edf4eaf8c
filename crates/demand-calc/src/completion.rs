//! 需求自動完成判定

use demand_core::{AggregateRow, Demand};
use std::collections::{BTreeMap, HashMap};

/// 應標記為完成的需求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub demand_id: i64,
    /// 參與判定的子件列數
    pub component_rows: usize,
}

/// 完成判定器
pub struct CompletionPlanner;

impl CompletionPlanner {
    /// 找出所有子件都已入庫、且尚未標記完成的需求
    ///
    /// 判定只看入庫量；在整燙或包裝階段的數量不算完成。
    /// 沒有任何彙總列的需求不會被判定為完成。
    pub fn evaluate(rows: &[AggregateRow], demands: &[Demand]) -> Vec<CompletionCandidate> {
        let mut groups: BTreeMap<i64, (bool, usize)> = BTreeMap::new();
        for row in rows {
            let group = groups.entry(row.demand_id).or_insert((true, 0));
            group.0 &= row.is_stocked();
            group.1 += 1;
        }

        let demands_by_id: HashMap<i64, &Demand> = demands.iter().map(|d| (d.id, d)).collect();

        groups
            .into_iter()
            .filter(|(_, (all_stocked, _))| *all_stocked)
            .filter(|(demand_id, _)| {
                demands_by_id
                    .get(demand_id)
                    .map(|demand| !demand.is_completed())
                    .unwrap_or(false)
            })
            .map(|(demand_id, (_, component_rows))| CompletionCandidate {
                demand_id,
                component_rows,
            })
            .collect()
    }
}
