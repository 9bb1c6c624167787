//! Document access through a JavaScript bridge object.
//!
//! The add-on's sandbox script wraps the editor SDK in a plain object whose
//! methods take and return node ids, and hands that object to
//! [`crate::addon::TableAddOn`]. Every bridge call may throw; throws become
//! [`TableError::HostOperation`].

use std::collections::HashMap;

use js_sys::Function;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::{DocumentHost, DocumentQuery, SelectionListener, SubscriptionId};
use crate::color::Rgba;
use crate::error::{Result, TableError};
use crate::types::{
    Bounds, CharacterStyle, NodeId, NodeKind, Point, Size, Stroke, TextAlignment, Transform,
};

#[wasm_bindgen]
extern "C" {
    /// Editor SDK wrapper provided by the sandbox script
    #[derive(Clone, Debug)]
    pub type HostBridge;

    #[wasm_bindgen(method, catch, js_name = documentRoot)]
    fn document_root(this: &HostBridge) -> std::result::Result<String, JsValue>;

    #[wasm_bindgen(method, catch, js_name = insertionParent)]
    fn insertion_parent(this: &HostBridge) -> std::result::Result<String, JsValue>;

    #[wasm_bindgen(method, catch, js_name = canvasSize)]
    fn canvas_size(this: &HostBridge) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = nodeKind)]
    fn node_kind(this: &HostBridge, id: &str) -> std::result::Result<String, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn children(this: &HostBridge, id: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn parent(this: &HostBridge, id: &str) -> std::result::Result<Option<String>, JsValue>;

    #[wasm_bindgen(method, catch, js_name = boundsLocal)]
    fn bounds_local(this: &HostBridge, id: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = transformMatrix)]
    fn transform_matrix(this: &HostBridge, id: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = setTransformMatrix)]
    fn set_transform_matrix(
        this: &HostBridge,
        id: &str,
        matrix: JsValue,
    ) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = getMetadata)]
    fn get_metadata(
        this: &HostBridge,
        id: &str,
        key: &str,
    ) -> std::result::Result<Option<String>, JsValue>;

    #[wasm_bindgen(method, catch, js_name = metadataKeys)]
    fn metadata_keys(this: &HostBridge, id: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = setMetadata)]
    fn set_metadata(
        this: &HostBridge,
        id: &str,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = getSelection)]
    fn get_selection(this: &HostBridge) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = setSelection)]
    fn set_selection(this: &HostBridge, ids: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = createRectangle)]
    fn create_rectangle(this: &HostBridge) -> std::result::Result<String, JsValue>;

    #[wasm_bindgen(method, catch, js_name = createText)]
    fn create_text(this: &HostBridge) -> std::result::Result<String, JsValue>;

    #[wasm_bindgen(method, catch, js_name = createGroup)]
    fn create_group(this: &HostBridge) -> std::result::Result<String, JsValue>;

    #[wasm_bindgen(method, catch, js_name = removeNode)]
    fn remove_node(this: &HostBridge, id: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setSize)]
    fn set_size(
        this: &HostBridge,
        id: &str,
        width: f64,
        height: f64,
    ) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setTranslation)]
    fn set_translation(this: &HostBridge, id: &str, x: f64, y: f64)
        -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setFill)]
    fn set_fill(this: &HostBridge, id: &str, color: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setStroke)]
    fn set_stroke(
        this: &HostBridge,
        id: &str,
        color: JsValue,
        width: f64,
    ) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setText)]
    fn set_text(this: &HostBridge, id: &str, text: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = applyCharacterStyles)]
    fn apply_character_styles(
        this: &HostBridge,
        id: &str,
        style: JsValue,
    ) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setTextAlignment)]
    fn set_text_alignment(this: &HostBridge, id: &str, code: u8)
        -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = appendChild)]
    fn append_child(this: &HostBridge, parent: &str, child: &str)
        -> std::result::Result<(), JsValue>;

    /// Returns a token that `offSelectionChange` accepts
    #[wasm_bindgen(method, catch, js_name = onSelectionChange)]
    fn on_selection_change(
        this: &HostBridge,
        handler: &Function,
    ) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = offSelectionChange)]
    fn off_selection_change(this: &HostBridge, token: JsValue) -> std::result::Result<(), JsValue>;
}

fn js_error(operation: &'static str, err: &JsValue) -> TableError {
    let message = err
        .as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"));
    tracing::error!(target: "express_tables::host", operation, %message, "bridge call threw");
    TableError::host(operation, message)
}

fn from_js<T: DeserializeOwned>(operation: &'static str, value: JsValue) -> Result<T> {
    serde_wasm_bindgen::from_value(value).map_err(|e| TableError::host(operation, e.to_string()))
}

fn to_js<T: Serialize + ?Sized>(operation: &'static str, value: &T) -> Result<JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| TableError::host(operation, e.to_string()))
}

fn ids(raw: Vec<String>) -> Vec<NodeId> {
    raw.into_iter().map(NodeId).collect()
}

struct Subscription {
    token: JsValue,
    _handler: Closure<dyn FnMut(JsValue)>,
}

/// [`DocumentHost`] over a [`HostBridge`]
pub struct JsDocumentHost {
    bridge: HostBridge,
    subscriptions: HashMap<SubscriptionId, Subscription>,
    next_subscription: u64,
}

impl JsDocumentHost {
    pub fn new(bridge: HostBridge) -> Self {
        Self {
            bridge,
            subscriptions: HashMap::new(),
            next_subscription: 1,
        }
    }
}

impl DocumentQuery for JsDocumentHost {
    fn document_root(&self) -> Result<NodeId> {
        self.bridge
            .document_root()
            .map(NodeId)
            .map_err(|e| js_error("documentRoot", &e))
    }

    fn insertion_parent(&self) -> Result<NodeId> {
        self.bridge
            .insertion_parent()
            .map(NodeId)
            .map_err(|e| js_error("insertionParent", &e))
    }

    fn canvas_size(&self) -> Result<Size> {
        let raw = self
            .bridge
            .canvas_size()
            .map_err(|e| js_error("canvasSize", &e))?;
        from_js("canvasSize", raw)
    }

    fn node_kind(&self, id: &NodeId) -> Result<NodeKind> {
        let kind = self
            .bridge
            .node_kind(id.as_str())
            .map_err(|e| js_error("nodeKind", &e))?;
        Ok(match kind.as_str() {
            "rectangle" | "Rectangle" => NodeKind::Rectangle,
            "text" | "Text" => NodeKind::Text,
            _ => NodeKind::Group,
        })
    }

    fn children(&self, id: &NodeId) -> Result<Vec<NodeId>> {
        let raw = self
            .bridge
            .children(id.as_str())
            .map_err(|e| js_error("children", &e))?;
        from_js::<Vec<String>>("children", raw).map(ids)
    }

    fn parent(&self, id: &NodeId) -> Result<Option<NodeId>> {
        self.bridge
            .parent(id.as_str())
            .map(|p| p.map(NodeId))
            .map_err(|e| js_error("parent", &e))
    }

    fn bounds_local(&self, id: &NodeId) -> Result<Bounds> {
        let raw = self
            .bridge
            .bounds_local(id.as_str())
            .map_err(|e| js_error("boundsLocal", &e))?;
        from_js("boundsLocal", raw)
    }

    fn transform(&self, id: &NodeId) -> Result<Transform> {
        let raw = self
            .bridge
            .transform_matrix(id.as_str())
            .map_err(|e| js_error("transformMatrix", &e))?;
        from_js::<[f64; 6]>("transformMatrix", raw).map(Transform::from_array)
    }

    fn metadata(&self, id: &NodeId, key: &str) -> Result<Option<String>> {
        self.bridge
            .get_metadata(id.as_str(), key)
            .map_err(|e| js_error("getMetadata", &e))
    }

    fn metadata_keys(&self, id: &NodeId) -> Result<Vec<String>> {
        let raw = self
            .bridge
            .metadata_keys(id.as_str())
            .map_err(|e| js_error("metadataKeys", &e))?;
        from_js("metadataKeys", raw)
    }

    fn selection(&self) -> Result<Vec<NodeId>> {
        let raw = self
            .bridge
            .get_selection()
            .map_err(|e| js_error("getSelection", &e))?;
        from_js::<Vec<String>>("getSelection", raw).map(ids)
    }
}

impl DocumentHost for JsDocumentHost {
    fn create_rectangle(&mut self) -> Result<NodeId> {
        self.bridge
            .create_rectangle()
            .map(NodeId)
            .map_err(|e| js_error("createRectangle", &e))
    }

    fn create_text(&mut self) -> Result<NodeId> {
        self.bridge
            .create_text()
            .map(NodeId)
            .map_err(|e| js_error("createText", &e))
    }

    fn create_group(&mut self) -> Result<NodeId> {
        self.bridge
            .create_group()
            .map(NodeId)
            .map_err(|e| js_error("createGroup", &e))
    }

    fn remove_node(&mut self, id: &NodeId) -> Result<()> {
        self.bridge
            .remove_node(id.as_str())
            .map_err(|e| js_error("removeNode", &e))
    }

    fn set_size(&mut self, id: &NodeId, width: f64, height: f64) -> Result<()> {
        self.bridge
            .set_size(id.as_str(), width, height)
            .map_err(|e| js_error("setSize", &e))
    }

    fn set_translation(&mut self, id: &NodeId, at: Point) -> Result<()> {
        self.bridge
            .set_translation(id.as_str(), at.x, at.y)
            .map_err(|e| js_error("setTranslation", &e))
    }

    fn set_fill(&mut self, id: &NodeId, color: Rgba) -> Result<()> {
        let color = to_js("setFill", &color)?;
        self.bridge
            .set_fill(id.as_str(), color)
            .map_err(|e| js_error("setFill", &e))
    }

    fn set_stroke(&mut self, id: &NodeId, stroke: Stroke) -> Result<()> {
        let color = to_js("setStroke", &stroke.color)?;
        self.bridge
            .set_stroke(id.as_str(), color, stroke.width)
            .map_err(|e| js_error("setStroke", &e))
    }

    fn set_text(&mut self, id: &NodeId, text: &str) -> Result<()> {
        self.bridge
            .set_text(id.as_str(), text)
            .map_err(|e| js_error("setText", &e))
    }

    fn apply_character_style(&mut self, id: &NodeId, style: &CharacterStyle) -> Result<()> {
        let style = to_js("applyCharacterStyles", style)?;
        self.bridge
            .apply_character_styles(id.as_str(), style)
            .map_err(|e| js_error("applyCharacterStyles", &e))
    }

    fn set_text_alignment(&mut self, id: &NodeId, alignment: TextAlignment) -> Result<()> {
        self.bridge
            .set_text_alignment(id.as_str(), alignment.host_code())
            .map_err(|e| js_error("setTextAlignment", &e))
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<()> {
        self.bridge
            .append_child(parent.as_str(), child.as_str())
            .map_err(|e| js_error("appendChild", &e))
    }

    fn set_transform(&mut self, id: &NodeId, transform: Transform) -> Result<()> {
        let matrix = to_js("setTransformMatrix", &transform.to_array())?;
        self.bridge
            .set_transform_matrix(id.as_str(), matrix)
            .map_err(|e| js_error("setTransformMatrix", &e))
    }

    fn set_metadata(&mut self, id: &NodeId, key: &str, value: &str) -> Result<()> {
        self.bridge
            .set_metadata(id.as_str(), key, value)
            .map_err(|e| js_error("setMetadata", &e))
    }

    fn set_selection(&mut self, ids: &[NodeId]) -> Result<()> {
        let raw: Vec<&str> = ids.iter().map(NodeId::as_str).collect();
        let value = to_js("setSelection", &raw)?;
        self.bridge
            .set_selection(value)
            .map_err(|e| js_error("setSelection", &e))
    }

    fn subscribe_selection_change(
        &mut self,
        mut listener: SelectionListener,
    ) -> Result<SubscriptionId> {
        let view = JsDocumentHost::new(self.bridge.clone());
        let handler = Closure::<dyn FnMut(JsValue)>::new(move |raw: JsValue| {
            match serde_wasm_bindgen::from_value::<Vec<String>>(raw) {
                Ok(selected) => listener(&view, &ids(selected)),
                Err(e) => tracing::warn!(
                    target: "express_tables::host",
                    error = %e,
                    "ignoring malformed selection notification"
                ),
            }
        });
        let token = self
            .bridge
            .on_selection_change(handler.as_ref().unchecked_ref())
            .map_err(|e| js_error("onSelectionChange", &e))?;

        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscriptions.insert(
            id,
            Subscription {
                token,
                _handler: handler,
            },
        );
        Ok(id)
    }

    fn unsubscribe_selection_change(&mut self, subscription: SubscriptionId) -> Result<()> {
        if let Some(sub) = self.subscriptions.remove(&subscription) {
            self.bridge
                .off_selection_change(sub.token)
                .map_err(|e| js_error("offSelectionChange", &e))?;
        }
        Ok(())
    }
}
