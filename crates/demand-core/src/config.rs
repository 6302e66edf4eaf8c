//! 診斷配置模型

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DiagnosticError;

/// 自動完成需求的寫入方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// 背景寫入，不等待結果
    #[default]
    Detached,
    /// 等待寫入完成後才回傳
    Awaited,
    /// 不寫入
    Disabled,
}

impl fmt::Display for CompletionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompletionMode::Detached => "detached",
            CompletionMode::Awaited => "awaited",
            CompletionMode::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

impl FromStr for CompletionMode {
    type Err = DiagnosticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detached" => Ok(CompletionMode::Detached),
            "awaited" => Ok(CompletionMode::Awaited),
            "disabled" => Ok(CompletionMode::Disabled),
            other => Err(DiagnosticError::InvalidCompletionMode(other.to_string())),
        }
    }
}

/// 診斷參數配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticConfig {
    /// 自動完成需求的寫入方式
    pub completion_mode: CompletionMode,

    /// 是否保留無法對應 SKU 的需求警告
    pub record_unresolved: bool,
}

impl DiagnosticConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self {
            completion_mode: CompletionMode::Detached,
            record_unresolved: true,
        }
    }

    /// 建構器模式：設置寫入方式
    pub fn with_completion_mode(mut self, mode: CompletionMode) -> Self {
        self.completion_mode = mode;
        self
    }

    /// 建構器模式：設置是否保留警告
    pub fn with_record_unresolved(mut self, record: bool) -> Self {
        self.record_unresolved = record;
        self
    }

    /// 是否需要寫回完成狀態
    pub fn writes_completions(&self) -> bool {
        self.completion_mode != CompletionMode::Disabled
    }
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self::new()
    }
}
