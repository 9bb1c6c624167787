//! express_tables - table layout for scene-graph editors
//!
//! Draws configurable tables (header row plus data rows of rectangle+text
//! cells) into a host document and lets a panel select rows, columns or the
//! whole table afterwards:
//! - Column widths from header labels, clamped to a fixed range
//! - Word wrapping with row-height normalisation
//! - Uniform down-scaling when the table is wider than the page
//! - 20 built-in color presets
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { TableAddOn } from 'express_tables';
//! await init();
//! const tables = new TableAddOn(bridge);
//! tables.createTable({ columns: 3, rows: 4, textAlignment: 'left' });
//! tables.selectColumn(1);
//! ```
//!
//! # Usage (Rust)
//!
//! ```
//! use express_tables::host::MemoryDocument;
//! use express_tables::session::TableSession;
//! use express_tables::types::TableSpec;
//!
//! let mut session = TableSession::with_defaults(MemoryDocument::new()).unwrap();
//! let table = session
//!     .create_table(&TableSpec::from_records(["Name"], [vec!["Ann"], vec!["Bo"]]))
//!     .unwrap();
//! assert_eq!(table.rows.len(), 2);
//! assert!(session.select_row(1));
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod styles;
pub mod types;

pub mod host;
pub mod layout;
pub mod selection;
pub mod session;

#[cfg(target_arch = "wasm32")]
pub mod addon;

use wasm_bindgen::prelude::*;

pub use config::LayoutConfig;
pub use error::{Result, TableError};
pub use layout::{TableBuilder, TableGroup, TextMeasurer};
pub use selection::{CurrentTableRef, SelectionTracker};
pub use session::TableSession;

/// Built-in style presets as a JSON string
///
/// # Errors
/// Returns an error if serialization fails.
#[wasm_bindgen(js_name = "builtinStylesJson")]
pub fn builtin_styles_json() -> std::result::Result<String, JsValue> {
    serde_json::to_string(&styles::builtin_styles())
        .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
