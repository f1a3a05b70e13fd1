//! JSON bodies returned by the manual-trigger endpoints.

use serde::{Deserialize, Serialize};

/// Result of a check cycle: `{success, changes}` or `{success:false, error}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResponse {
    pub fn ok(changes: Vec<String>) -> Self {
        Self {
            success: true,
            changes: Some(changes),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            changes: None,
            error: Some(error.into()),
        }
    }
}

/// Result of a current-stock listing: `{success, stock}` or `{success:false, error}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StockResponse {
    pub fn ok(stock: Vec<String>) -> Self {
        Self {
            success: true,
            stock: Some(stock),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            stock: None,
            error: Some(error.into()),
        }
    }
}
