//! WebAssembly bindings for the DAG builder editor core.
//!
//! Exposes the engines to JavaScript/TypeScript via `wasm-bindgen`. Compile
//! with `wasm-pack build` to produce an npm-ready package. Graphs cross the
//! boundary as JSON strings in the `{ "nodes": [...], "edges": [...] }`
//! document shape; results come back as JSON strings too.
//!
//! ## Stateless API: [`validate`], [`layout`], [`render`]
//!
//! ```js
//! import init, { validate, layout } from './dagbuilder_wasm.js';
//! await init();
//!
//! const result = JSON.parse(validate(docJson, 'dag'));
//! // result: { valid, reason, offendingEdgeIds, violation }
//! const positions = JSON.parse(layout(docJson, 'layered', 'LR'));
//! // positions: { "<node id>": { x, y }, ... }
//! ```
//!
//! ## Session API: [`Editor`]
//!
//! ```js
//! const editor = Editor.fromJson(docJson, 'tree');
//! const id = editor.addNode('Load', 0, 0);
//! try {
//!   editor.connect(id, other, 'right', 'left', Date.now());
//! } catch (msg) {
//!   // refused; same-side attempts stay visible until tick() passes the deadline
//! }
//! setInterval(() => editor.tick(Date.now()), 250);
//! editor.undo();
//! ```

use dagbuilder::{
    ConnectError, Direction, EditorConfig, EditorSession, GraphDocument, Handle, LayoutConfig,
    LayoutMode, Position, ValidationMode,
};
use wasm_bindgen::prelude::*;

/// One-time initialisation called at the start of every exported function.
///
/// Installs the `console_error_panic_hook` when the feature is enabled so
/// that Rust panics are forwarded to the browser console as readable errors
/// rather than appearing as generic "unreachable" WASM traps.
fn setup() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Validate a graph document under `mode` (`dag`, `tree` or `bipartite`).
///
/// Returns the result as JSON:
/// ```json
/// { "valid": false, "reason": "Cycle detected: not a DAG",
///   "offendingEdgeIds": ["e1", "e2"], "violation": "cycle" }
/// ```
///
/// Throws only when the document or the mode cannot be parsed; an invalid
/// graph is a normal result.
#[wasm_bindgen]
pub fn validate(json: &str, mode: &str) -> Result<String, JsValue> {
    setup();
    let doc = parse_document(json)?;
    let mode: ValidationMode = mode.parse().map_err(|e: String| JsValue::from_str(&e))?;
    let result = dagbuilder::validate(&doc.nodes, &doc.edges, mode);
    encode(&result)
}

/// Compute node positions for a graph document.
///
/// `mode` is `layered` or `tree`. `direction` (`TB`, `BT`, `LR`, `RL`)
/// applies to the layered layout and defaults to `TB`. Returns a JSON object
/// mapping node id to its top-left corner.
#[wasm_bindgen]
pub fn layout(json: &str, mode: &str, direction: Option<String>) -> Result<String, JsValue> {
    setup();
    let doc = parse_document(json)?;
    let mode: LayoutMode = mode.parse().map_err(|e: String| JsValue::from_str(&e))?;
    let config = layout_config(direction.as_deref())?;
    let positions = dagbuilder::layout_with_config(&doc.nodes, &doc.edges, mode, &config);
    encode(&positions)
}

/// Render a graph document as human-readable text.
#[wasm_bindgen]
pub fn render(json: &str) -> Result<String, JsValue> {
    setup();
    let doc = parse_document(json)?;
    let graph = dagbuilder::Graph::new(&doc.nodes, &doc.edges);
    Ok(dagbuilder::render::render_graph(&graph))
}

/// A live editing session: graph state, undo/redo and refused-connection
/// highlights.
///
/// Timestamps are milliseconds from any monotonic JS clock such as
/// `Date.now()` or `performance.now()`.
#[wasm_bindgen]
pub struct Editor {
    inner: EditorSession,
}

#[wasm_bindgen]
impl Editor {
    /// Start with an empty canvas. `mode` defaults to `dag`.
    #[wasm_bindgen(constructor)]
    pub fn new(mode: Option<String>) -> Result<Editor, JsValue> {
        setup();
        let config = editor_config(mode.as_deref())?;
        Ok(Editor {
            inner: EditorSession::new(config),
        })
    }

    /// Open a graph document. It becomes the first undo snapshot.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str, mode: Option<String>) -> Result<Editor, JsValue> {
        setup();
        let doc = parse_document(json)?;
        let config = editor_config(mode.as_deref())?;
        Ok(Editor {
            inner: EditorSession::from_document(doc, config),
        })
    }

    /// Export the committed graph as a document JSON string.
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        encode(&self.inner.to_document())
    }

    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.inner.mode().to_string()
    }

    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode: ValidationMode = mode.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.inner.set_mode(mode);
        Ok(())
    }

    /// Current validation result as JSON; see [`validate`].
    pub fn validation(&self) -> Result<String, JsValue> {
        encode(&self.inner.validation())
    }

    /// Committed edges plus pending highlight edges, as a JSON array.
    #[wasm_bindgen(js_name = canvasEdges)]
    pub fn canvas_edges(&self) -> Result<String, JsValue> {
        encode(&self.inner.canvas_edges())
    }

    /// Add a node and return its generated id. Throws on an empty label.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, label: &str, x: f64, y: f64) -> Result<String, JsValue> {
        self.inner
            .add_node(label, Position::new(x, y))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Remove nodes and their edges. Returns how many nodes were removed.
    #[wasm_bindgen(js_name = removeNodes)]
    pub fn remove_nodes(&mut self, ids: Vec<String>) -> usize {
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        self.inner.remove_nodes(&ids)
    }

    #[wasm_bindgen(js_name = renameNode)]
    pub fn rename_node(&mut self, id: &str, label: &str) -> Result<(), JsValue> {
        self.inner
            .rename_node(id, label)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = moveNode)]
    pub fn move_node(&mut self, id: &str, x: f64, y: f64) -> Result<(), JsValue> {
        self.inner
            .move_node(id, Position::new(x, y))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Set or clear (with `undefined` or an empty string) an edge label.
    #[wasm_bindgen(js_name = setEdgeLabel)]
    pub fn set_edge_label(&mut self, id: &str, label: Option<String>) -> Result<(), JsValue> {
        self.inner
            .set_edge_label(id, label)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = removeEdges)]
    pub fn remove_edges(&mut self, ids: Vec<String>) -> usize {
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        self.inner.remove_edges(&ids)
    }

    /// Connect two nodes. Handles are `left` / `right` (or `a` / `b`).
    ///
    /// Returns the new edge id, or throws the refusal message. For a
    /// same-side refusal the thrown message is prefixed with the highlight
    /// edge's id and a tab so the host can track it.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        source_handle: &str,
        target_handle: &str,
        now_ms: f64,
    ) -> Result<String, JsValue> {
        let sh: Handle = source_handle.parse().map_err(|e: String| JsValue::from_str(&e))?;
        let th: Handle = target_handle.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.inner
            .connect(source, target, sh, th, clock(now_ms))
            .map_err(|e| match &e {
                ConnectError::SameSide { highlight_id, .. } => {
                    JsValue::from_str(&format!("{highlight_id}\t{e}"))
                }
                _ => JsValue::from_str(&e.to_string()),
            })
    }

    /// Remove expired highlights; returns their ids.
    pub fn tick(&mut self, now_ms: f64) -> Vec<String> {
        self.inner.tick(clock(now_ms))
    }

    #[wasm_bindgen(js_name = cancelHighlight)]
    pub fn cancel_highlight(&mut self, id: &str) -> bool {
        self.inner.cancel_highlight(id)
    }

    #[wasm_bindgen(js_name = clearHighlights)]
    pub fn clear_highlights(&mut self) {
        self.inner.clear_highlights();
    }

    /// Lay out every node (`layered` or `tree`) and record the result.
    /// Returns the new positions as JSON.
    #[wasm_bindgen(js_name = autoLayout)]
    pub fn auto_layout(&mut self, mode: &str) -> Result<String, JsValue> {
        let mode: LayoutMode = mode.parse().map_err(|e: String| JsValue::from_str(&e))?;
        encode(&self.inner.auto_layout(mode))
    }

    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }

    #[wasm_bindgen(getter, js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.inner.history().can_undo()
    }

    #[wasm_bindgen(getter, js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.inner.history().can_redo()
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn parse_document(json: &str) -> Result<GraphDocument, JsValue> {
    GraphDocument::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&format!("serialise error: {e}")))
}

fn layout_config(direction: Option<&str>) -> Result<LayoutConfig, JsValue> {
    let direction = match direction {
        Some(d) => d.parse().map_err(|e: String| JsValue::from_str(&e))?,
        None => Direction::TB,
    };
    Ok(LayoutConfig::default().with_direction(direction))
}

fn editor_config(mode: Option<&str>) -> Result<EditorConfig, JsValue> {
    let mut config = EditorConfig::default();
    if let Some(m) = mode {
        config.mode = m.parse().map_err(|e: String| JsValue::from_str(&e))?;
    }
    Ok(config)
}

/// JS clocks are `f64`; negative or NaN readings clamp to zero.
fn clock(now_ms: f64) -> u64 {
    if now_ms.is_finite() && now_ms > 0.0 {
        now_ms as u64
    } else {
        0
    }
}
