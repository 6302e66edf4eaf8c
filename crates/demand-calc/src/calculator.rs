//! 診斷主計算器

use demand_core::{DiagnosticConfig, DiagnosticReport};

use crate::aggregate::AggregateBuilder;
use crate::catalog::ProductCatalog;
use crate::completion::CompletionPlanner;
use crate::explosion::KitExplosion;
use crate::ordering::sort_for_presentation;
use crate::progress::{ArremateBook, ProgressLedger};
use crate::{DiagnosticInput, DiagnosticOutcome, DiagnosticWarning};

/// 診斷計算器
///
/// 每次計算都從原始資料列重建，不保留跨次狀態。
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCalculator {
    config: DiagnosticConfig,
}

impl DiagnosticCalculator {
    /// 創建新的診斷計算器
    pub fn new(config: DiagnosticConfig) -> Self {
        Self { config }
    }

    /// 主計算入口
    pub fn calculate(&self, input: &DiagnosticInput) -> DiagnosticOutcome {
        tracing::info!(
            "開始需求診斷：需求 {} 筆，工單 {} 筆，整燙帳 {} 筆，產品 {} 筆",
            input.demands.len(),
            input.production_orders.len(),
            input.arremates.len(),
            input.products.len()
        );

        let start_time = std::time::Instant::now();
        let mut outcome = DiagnosticOutcome::empty();

        // Step 1: 產品目錄索引
        tracing::debug!("Step 1: 產品目錄索引");
        let (catalog, catalog_warnings) = ProductCatalog::build(input.products.clone());
        outcome.warnings.extend(catalog_warnings);

        // Step 2: 累計生產進度
        tracing::debug!("Step 2: 累計生產進度");
        let book = ArremateBook::from_entries(&input.arremates);
        let ledger = ProgressLedger::accumulate(&input.production_orders, &book);
        tracing::debug!("進度鍵數量: {}", ledger.len());

        // Step 3: 套組展開與彙總
        tracing::debug!("Step 3: 套組展開與彙總");
        let mut builder = AggregateBuilder::new();
        for demand in &input.demands {
            let Some(resolved) = catalog.resolve_sku(&demand.product_sku) else {
                tracing::warn!(
                    "需求 {} 的 SKU {:?} 在目錄中找不到，略過",
                    demand.id,
                    demand.product_sku
                );
                if self.config.record_unresolved {
                    outcome.add_warning(DiagnosticWarning::unresolved_demand(
                        demand.id,
                        &demand.product_sku,
                    ));
                }
                continue;
            };

            let items = KitExplosion::explode(&resolved, demand.quantity_requested);
            if items.is_empty() {
                tracing::debug!("需求 {} 的套組沒有組成", demand.id);
                outcome.add_warning(DiagnosticWarning::empty_kit(demand.id, &demand.product_sku));
            }

            for item in &items {
                builder.process_item(demand, item, &catalog, &ledger);
            }
        }
        let mut rows = builder.into_rows();

        // Step 4: 完成判定
        tracing::debug!("Step 4: 完成判定");
        outcome.completions = CompletionPlanner::evaluate(&rows, &input.demands);

        // Step 5: 排序
        tracing::debug!("Step 5: 排序");
        sort_for_presentation(&mut rows);

        outcome.report = DiagnosticReport::new(rows);
        outcome.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!("需求診斷完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "彙總列 {} 筆，待完成需求 {} 筆，警告 {} 筆",
            outcome.report.aggregated.len(),
            outcome.completions.len(),
            outcome.warnings.len()
        );

        outcome
    }

    pub fn config(&self) -> &DiagnosticConfig {
        &self.config
    }
}
