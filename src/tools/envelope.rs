//! The `{ok, data, meta}` / `{ok: false, error}` response envelope shared by
//! the HTTP and MCP surfaces.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ActError;

/// Machine-readable failure description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub error_code: String,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

/// Result of one operation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolResponse {
    pub fn success(data: Value, meta: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            meta: Some(meta),
            error: None,
        }
    }

    pub fn failure(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            ok: false,
            data: None,
            meta: None,
            error: Some(ToolError {
                error_code: error_code.into(),
                message: message.into(),
                details,
            }),
        }
    }

    /// Envelope for an engine error; `details.retryable` tells the caller
    /// whether trying again can help.
    pub fn from_error(operation: &str, err: &ActError) -> Self {
        Self::failure(
            err.error_code(),
            err.to_string(),
            serde_json::json!({
                "operation": operation,
                "retryable": err.is_retryable(),
            }),
        )
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.error_code.as_str())
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
