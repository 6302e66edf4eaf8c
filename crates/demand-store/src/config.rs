//! 資料庫配置

use serde::{Deserialize, Serialize};

use crate::db::DEFAULT_BUSY_TIMEOUT_MS;

/// 資料庫連線配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 資料庫檔案路徑（`:memory:` 為記憶體資料庫）
    pub database_path: String,

    /// busy_timeout（毫秒）
    pub busy_timeout_ms: u64,

    /// 開啟時建立缺少的資料表
    pub create_schema: bool,
}

impl StoreConfig {
    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Self::default()
        }
    }

    /// 記憶體資料庫無法被第二個連線開啟
    pub fn is_in_memory(&self) -> bool {
        self.database_path == ":memory:" || self.database_path.contains("mode=memory")
    }

    /// 建構器模式：設置 busy_timeout
    pub fn with_busy_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.busy_timeout_ms = timeout_ms;
        self
    }

    /// 建構器模式：設置是否建立資料表
    pub fn with_create_schema(mut self, create: bool) -> Self {
        self.create_schema = create;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: "demand-diag.db".to_string(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            create_schema: false,
        }
    }
}
