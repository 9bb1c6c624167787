//! Structured error types for express_tables.
//!
//! Layout failures are raised before the host is touched wherever possible;
//! host failures carry the name of the document operation that rejected.

/// All errors that can occur while laying out or drawing a table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Non-positive width, height, column count or row count.
    #[error("Invalid dimensions: {0}")]
    InvalidDimension(String),

    /// Derived geometry that the clamping logic did not anticipate.
    #[error("Layout error: {0}")]
    Layout(String),

    /// The document service rejected or threw during a call.
    #[error("Host operation `{operation}` failed: {message}")]
    HostOperation {
        operation: &'static str,
        message: String,
    },

    /// A color string that is not `#RRGGBB`.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// A layout configuration that cannot produce a table.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON (de)serialization of metadata or CLI input.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableError>;

impl TableError {
    /// Build a host failure for the named operation.
    pub fn host(operation: &'static str, message: impl Into<String>) -> Self {
        Self::HostOperation {
            operation,
            message: message.into(),
        }
    }

    /// True for failures raised by the document service rather than by layout.
    pub fn is_host_failure(&self) -> bool {
        matches!(self, Self::HostOperation { .. })
    }
}

#[cfg(target_arch = "wasm32")]
impl From<TableError> for wasm_bindgen::JsValue {
    fn from(e: TableError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_message_names_operation() {
        let err = TableError::host("createGroup", "detached context");
        assert!(err.is_host_failure());
        assert_eq!(
            err.to_string(),
            "Host operation `createGroup` failed: detached context"
        );
    }

    #[test]
    fn test_layout_error_is_not_host_failure() {
        assert!(!TableError::Layout("negative row height".into()).is_host_failure());
    }
}
