//! 需求診斷服務
//!
//! 流程：四個讀取同時發出 → 彙總計算 → 回寫完成狀態 → 排序後回傳。
//! 計算與回寫可分開呼叫，由呼叫端（HTTP、排程）決定何時回寫。

use chrono::Utc;
use std::sync::Arc;

use demand_calc::{CompletionCandidate, DiagnosticCalculator, DiagnosticInput, DiagnosticOutcome};
use demand_core::{CompletionMode, DiagnosticConfig, DiagnosticReport};
use demand_store::DiagnosticStore;

use crate::error::EngineError;

/// 回寫結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSummary {
    pub completed: Vec<i64>,
    pub failed: Vec<i64>,
}

/// 需求診斷服務
pub struct DiagnosticEngine<S> {
    store: Arc<S>,
    calculator: DiagnosticCalculator,
}

impl<S> DiagnosticEngine<S>
where
    S: DiagnosticStore + 'static,
{
    pub fn new(store: S, config: DiagnosticConfig) -> Self {
        Self::from_shared(Arc::new(store), config)
    }

    pub fn from_shared(store: Arc<S>, config: DiagnosticConfig) -> Self {
        Self {
            store,
            calculator: DiagnosticCalculator::new(config),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &DiagnosticConfig {
        self.calculator.config()
    }

    /// 同時發出四個讀取；任一失敗即中止
    pub async fn load_input(&self) -> Result<DiagnosticInput, EngineError> {
        let (demands, production_orders, arremates, products) = tokio::try_join!(
            self.store.load_open_demands(),
            self.store.load_demand_orders(),
            self.store.load_production_arremates(),
            self.store.load_products(),
        )
        .map_err(|err| {
            tracing::error!("診斷資料載入失敗: {}", err);
            EngineError::IngestionFailure(err)
        })?;

        Ok(DiagnosticInput {
            demands,
            production_orders,
            arremates,
            products,
        })
    }

    /// 載入並計算，不做任何寫入
    pub async fn compute(&self) -> Result<DiagnosticOutcome, EngineError> {
        let input = self.load_input().await?;
        Ok(self.calculator.calculate(&input))
    }

    /// 將需求標記為完成；失敗只記錄日誌
    pub async fn apply_completions(&self, candidates: &[CompletionCandidate]) -> CompletionSummary {
        write_completions(self.store.as_ref(), candidates).await
    }

    /// 完整診斷：計算後依配置回寫完成狀態，回傳報告
    pub async fn compute_diagnostic(&self) -> Result<DiagnosticReport, EngineError> {
        let outcome = self.compute().await?;

        match self.config().completion_mode {
            CompletionMode::Disabled => {}
            CompletionMode::Awaited => {
                self.apply_completions(&outcome.completions).await;
            }
            CompletionMode::Detached if outcome.completions.is_empty() => {}
            CompletionMode::Detached => {
                let store = Arc::clone(&self.store);
                let candidates = outcome.completions.clone();
                tokio::spawn(async move {
                    write_completions(store.as_ref(), &candidates).await;
                });
            }
        }

        Ok(outcome.report)
    }
}

async fn write_completions<S>(store: &S, candidates: &[CompletionCandidate]) -> CompletionSummary
where
    S: DiagnosticStore + ?Sized,
{
    let completed_at = Utc::now();
    let mut summary = CompletionSummary::default();

    for candidate in candidates {
        match store
            .mark_demand_completed(candidate.demand_id, completed_at)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    "需求 {} 已全部入庫（{} 個子件），標記完成",
                    candidate.demand_id,
                    candidate.component_rows
                );
                summary.completed.push(candidate.demand_id);
            }
            Err(err) => {
                tracing::error!("需求 {} 標記完成失敗: {}", candidate.demand_id, err);
                summary.failed.push(candidate.demand_id);
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use demand_core::{
        ArremateEntry, Demand, OrderStatus, ProductRow, ProductionOrder, Stage,
    };
    use demand_store::{StoreError, StoreResult};
    use std::sync::Mutex;
    use std::time::Duration;

    /// 以記憶體資料列模擬的資料存取
    #[derive(Default)]
    struct FakeStore {
        demands: Vec<Demand>,
        orders: Vec<ProductionOrder>,
        arremates: Vec<ArremateEntry>,
        products: Vec<ProductRow>,
        fail_products: bool,
        fail_writes_for: Vec<i64>,
        written: Mutex<Vec<i64>>,
    }

    impl FakeStore {
        fn stocked() -> Self {
            Self {
                demands: vec![Demand::new(1, "ABC", 10), Demand::new(2, "ABC", 10)],
                orders: vec![
                    ProductionOrder::new(100, 1, 10, OrderStatus::Finalized)
                        .with_demand(1)
                        .with_stages(vec![Stage::new("costura").launched_with(10)]),
                    ProductionOrder::new(101, 1, 10, OrderStatus::Finalized)
                        .with_demand(2)
                        .with_stages(vec![Stage::new("costura").launched_with(10)]),
                ],
                arremates: vec![
                    ArremateEntry::production(100, 10, 10),
                    ArremateEntry::production(101, 10, 10),
                ],
                products: vec![ProductRow {
                    id: 1,
                    name: "Camiseta".to_string(),
                    sku: Some("ABC".to_string()),
                    is_kit: false,
                    grade: None,
                    image: None,
                }],
                ..Default::default()
            }
        }

        fn written(&self) -> Vec<i64> {
            self.written.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DiagnosticStore for FakeStore {
        async fn load_open_demands(&self) -> StoreResult<Vec<Demand>> {
            Ok(self.demands.clone())
        }

        async fn load_demand_orders(&self) -> StoreResult<Vec<ProductionOrder>> {
            Ok(self.orders.clone())
        }

        async fn load_production_arremates(&self) -> StoreResult<Vec<ArremateEntry>> {
            Ok(self.arremates.clone())
        }

        async fn load_products(&self) -> StoreResult<Vec<ProductRow>> {
            if self.fail_products {
                return Err(StoreError::Query("connection reset".to_string()));
            }
            Ok(self.products.clone())
        }

        async fn mark_demand_completed(
            &self,
            demand_id: i64,
            _completed_at: DateTime<Utc>,
        ) -> StoreResult<()> {
            if self.fail_writes_for.contains(&demand_id) {
                return Err(StoreError::Lock("busy".to_string()));
            }
            self.written.lock().unwrap().push(demand_id);
            Ok(())
        }
    }

    fn engine(store: FakeStore, mode: CompletionMode) -> DiagnosticEngine<FakeStore> {
        crate::logging::init_test();
        DiagnosticEngine::new(store, DiagnosticConfig::new().with_completion_mode(mode))
    }

    #[tokio::test]
    async fn test_ingestion_failure_aborts() {
        let store = FakeStore {
            fail_products: true,
            ..FakeStore::stocked()
        };
        let engine = engine(store, CompletionMode::Awaited);

        let result = engine.compute_diagnostic().await;
        assert!(matches!(result, Err(EngineError::IngestionFailure(_))));
        assert!(engine.store().written().is_empty());
    }

    #[tokio::test]
    async fn test_compute_does_not_write() {
        let engine = engine(FakeStore::stocked(), CompletionMode::Awaited);

        let outcome = engine.compute().await.unwrap();
        assert_eq!(outcome.completions.len(), 2);
        assert!(engine.store().written().is_empty());

        let summary = engine.apply_completions(&outcome.completions).await;
        assert_eq!(summary.completed, vec![1, 2]);
        assert_eq!(engine.store().written(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_failed_write_is_not_propagated() {
        let store = FakeStore {
            fail_writes_for: vec![1],
            ..FakeStore::stocked()
        };
        let engine = engine(store, CompletionMode::Awaited);

        let report = engine.compute_diagnostic().await.unwrap();
        assert_eq!(report.aggregated.len(), 2);
        assert_eq!(engine.store().written(), vec![2]);

        let outcome = engine.compute().await.unwrap();
        let summary = engine.apply_completions(&outcome.completions).await;
        assert_eq!(summary.failed, vec![1]);
    }

    #[tokio::test]
    async fn test_disabled_mode_skips_writes() {
        let engine = engine(FakeStore::stocked(), CompletionMode::Disabled);

        let report = engine.compute_diagnostic().await.unwrap();
        assert_eq!(report.aggregated.len(), 2);
        assert!(engine.store().written().is_empty());
    }

    #[tokio::test]
    async fn test_detached_mode_writes_in_background() {
        let engine = engine(FakeStore::stocked(), CompletionMode::Detached);

        let report = engine.compute_diagnostic().await.unwrap();
        assert!(report.aggregated.iter().all(|row| row.is_stocked()));

        let store = Arc::clone(engine.store());
        tokio::time::timeout(Duration::from_secs(5), async move {
            while store.written().len() < 2 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("背景回寫未完成");
        assert_eq!(engine.store().written(), vec![1, 2]);
    }
}
