//! 應用配置

use serde::{Deserialize, Serialize};
use std::path::Path;

use demand_core::DiagnosticConfig;
use demand_store::StoreConfig;

use crate::error::EngineError;

/// 應用配置（JSON 檔）
///
/// ```json
/// {
///   "store": { "database_path": "producao.db", "busy_timeout_ms": 5000 },
///   "diagnostic": { "completion_mode": "awaited" },
///   "log_filter": "demand_calc=debug,info"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub diagnostic: DiagnosticConfig,
    /// 日誌過濾器，未設置時使用 RUST_LOG
    pub log_filter: Option<String>,
}

impl AppConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// 從檔案載入
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}
