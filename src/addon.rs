//! wasm-bindgen entry point for the add-on panel.
//!
//! ```javascript
//! import init, { TableAddOn } from 'express_tables';
//! await init();
//! const tables = new TableAddOn(bridge);
//! const table = tables.createTable({ columns: 2, rows: 3, columnValues: {...} });
//! tables.selectRow(0);
//! ```

use wasm_bindgen::prelude::*;

use crate::config::LayoutConfig;
use crate::host::js::{HostBridge, JsDocumentHost};
use crate::session::TableSession;
use crate::styles;
use crate::types::TableSpec;

#[wasm_bindgen]
pub struct TableAddOn {
    session: TableSession<JsDocumentHost>,
}

#[wasm_bindgen]
impl TableAddOn {
    /// Wrap a bridge object. `config` may be `undefined` for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(bridge: HostBridge, config: JsValue) -> Result<TableAddOn, JsValue> {
        console_error_panic_hook::set_once();
        let config: LayoutConfig = if config.is_undefined() || config.is_null() {
            LayoutConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid layout config: {e}")))?
        };
        let session = TableSession::new(JsDocumentHost::new(bridge), config)?;
        Ok(Self { session })
    }

    /// Draw a table and return a summary of the created nodes
    #[wasm_bindgen(js_name = "createTable")]
    pub fn create_table(&mut self, spec: JsValue) -> Result<JsValue, JsValue> {
        let spec: TableSpec = serde_wasm_bindgen::from_value(spec)
            .map_err(|e| JsValue::from_str(&format!("Invalid table spec: {e}")))?;
        let table = self.session.create_table(&spec)?;
        serde_wasm_bindgen::to_value(&table)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    #[wasm_bindgen(js_name = "selectRow")]
    pub fn select_row(&mut self, row_index: i32) -> bool {
        self.session.select_row(i64::from(row_index))
    }

    #[wasm_bindgen(js_name = "selectColumn")]
    pub fn select_column(&mut self, column_index: i32) -> bool {
        self.session.select_column(i64::from(column_index))
    }

    #[wasm_bindgen(js_name = "selectAll")]
    pub fn select_all(&mut self) -> bool {
        self.session.select_all()
    }

    #[wasm_bindgen(js_name = "clearSelection")]
    pub fn clear_selection(&mut self) -> bool {
        self.session.clear_selection()
    }

    #[wasm_bindgen(js_name = "calculateTextWidth")]
    pub fn calculate_text_width(&mut self, text: &str) -> Result<f64, JsValue> {
        Ok(self.session.measure_text(text)?)
    }

    #[wasm_bindgen(js_name = "wrapText")]
    pub fn wrap_text(&mut self, text: &str, available_width: f64) -> Result<String, JsValue> {
        Ok(self.session.wrap_text(text, available_width)?)
    }

    /// Identification record of the tracked table, or `undefined`
    #[wasm_bindgen(js_name = "tableMetadata")]
    pub fn table_metadata(&self) -> Result<JsValue, JsValue> {
        match self.session.table_metadata() {
            Some(meta) => serde_wasm_bindgen::to_value(&meta)
                .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}"))),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = "tableMetadataKeys")]
    pub fn table_metadata_keys(&self) -> Vec<String> {
        self.session.table_metadata_keys()
    }

    /// Built-in style gallery
    #[wasm_bindgen]
    pub fn styles() -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&styles::builtin_styles())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Release the selection-change subscription
    #[wasm_bindgen]
    pub fn dispose(&mut self) -> Result<(), JsValue> {
        Ok(self.session.close()?)
    }
}
