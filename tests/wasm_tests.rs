//! Smoke tests for the WebAssembly exports.
//!
//! Run with: wasm-pack test --node
#![cfg(target_arch = "wasm32")]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use express_tables::addon::TableAddOn;
use express_tables::host::MemoryDocument;
use express_tables::types::TableSpec;
use express_tables::{TableError, TableSession};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::wasm_bindgen_test;

#[wasm_bindgen_test]
fn test_version_matches_package() {
    assert_eq!(express_tables::version(), env!("CARGO_PKG_VERSION"));
}

#[wasm_bindgen_test]
fn test_style_gallery_exported() {
    let styles = js_sys::Array::from(&TableAddOn::styles().unwrap());
    assert_eq!(styles.length(), 20);
    let json = express_tables::builtin_styles_json().unwrap();
    assert!(json.contains("Basic deep blue"));
}

#[wasm_bindgen_test]
fn test_panel_object_builds_table() {
    let payload = js_sys::JSON::parse(
        r#"{"columns": 2, "rows": 1, "columnValues": {"Column 1": "Name", "Column 2": "Email"},
            "rowData": [["Ann", "a@x.com"]]}"#,
    )
    .unwrap();
    let spec: TableSpec = serde_wasm_bindgen::from_value(payload).unwrap();
    assert_eq!(spec.column_label(1), Some("Email"));

    let mut session = TableSession::with_defaults(MemoryDocument::new()).unwrap();
    let table = session.create_table(&spec).unwrap();
    assert_eq!(table.rows.len(), 1);
    assert!(session.select_row(0));
}

#[wasm_bindgen_test]
fn test_errors_reach_js_as_strings() {
    let value: JsValue = TableError::InvalidDimension("got 0 columns".into()).into();
    let message = value.as_string().unwrap();
    assert!(message.contains("got 0 columns"));
}
