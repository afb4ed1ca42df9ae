//! WASM bridge for the whiteboard: exposes the Rust canvas engine to
//! JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The page forwards DOM
//! pointer, wheel and keyboard events here, draws whatever `scene_json`
//! describes, and performs collaborator calls (assistant, extraction,
//! persistence) itself, feeding results back through the `resolve_*`
//! methods.
//!
//! Methods that can fail return JSON: `{"ok":true,...}` or
//! `{"ok":false,"error":"..."}`.

use serde::Serialize;
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;
use wb_core::model::{ConnectionPatch, ConnectionType, Extraction};
use wb_core::{
    Alignment, BoardSnapshot, CanvasConfig, Clock, ConnectionId, ItemId, ItemTemplate, Point, Size, Viewport,
};
use wb_editor::{CollabError, InputEvent, LinkOutcome, Modifiers, Ticket, Whiteboard};

/// Wall clock backed by `Date.now()`.
struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> u64 {
        #[cfg(target_arch = "wasm32")]
        {
            js_sys::Date::now() as u64
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            wb_core::SystemClock.now_ms()
        }
    }
}

/// The main WASM-facing canvas controller. All interaction from the page
/// goes through this struct.
#[wasm_bindgen]
pub struct WhiteboardCanvas {
    wb: Whiteboard,
}

#[wasm_bindgen]
impl WhiteboardCanvas {
    /// Create a canvas with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        Self::build(CanvasConfig::default(), width, height)
    }

    /// Create a canvas from a (possibly partial) JSON config. Malformed
    /// config falls back to the defaults.
    pub fn with_config(config_json: &str, width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        let config = CanvasConfig::from_json(config_json).unwrap_or_else(|e| {
            log::warn!("ignoring invalid canvas config: {e}");
            CanvasConfig::default()
        });
        Self::build(config, width, height)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.wb.set_viewport(Viewport::new(width, height));
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Returns true if the scene needs a redraw.
    pub fn handle_pointer_down(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.wb.handle_event(&InputEvent::pointer_down(x, y, modifiers))
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.wb.handle_event(&InputEvent::pointer_move(x, y))
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.wb.handle_event(&InputEvent::pointer_up(x, y))
    }

    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        self.wb.handle_event(&InputEvent::Wheel { x, y, dy: delta_y })
    }

    /// `key` is the DOM `KeyboardEvent.key` value.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.wb.handle_event(&InputEvent::key(key, modifiers))
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) -> bool {
        self.wb.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.wb.zoom_out()
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.wb.reset_zoom()
    }

    pub fn get_scale(&self) -> f64 {
        self.wb.view().scale
    }

    /// Recenter on the world point under a minimap click/drag position.
    pub fn minimap_navigate(&mut self, x: f64, y: f64) {
        self.wb.minimap_navigate(Point::new(x, y));
    }

    /// Everything needed to draw a frame, as JSON.
    pub fn scene_json(&self) -> String {
        to_json(&self.wb.scene())
    }

    // ─── Items ───────────────────────────────────────────────────────────

    /// Create items from a template name (`youtube`, `doc`, `image`, `url`,
    /// `ai`, `tiktok`, `instagram`, `social`) and a JSON array of content
    /// strings. Returns `{"ok":true,"ids":[...]}`.
    pub fn add_items(&mut self, template: &str, contents_json: &str) -> String {
        let Some(template) = ItemTemplate::from_name(template) else {
            return error(format!("unknown template: {template}"));
        };
        let contents: Vec<String> = if contents_json.trim().is_empty() {
            Vec::new()
        } else {
            match serde_json::from_str(contents_json) {
                Ok(contents) => contents,
                Err(e) => return error(format!("invalid contents: {e}")),
            }
        };
        let contents: Vec<&str> = contents.iter().map(String::as_str).collect();
        let ids = self.wb.add_items(template, &contents);
        ok(json!({ "ids": ids }))
    }

    pub fn set_title(&mut self, id: &str, title: &str) -> bool {
        item_id(id).is_some_and(|id| self.wb.set_title(id, title))
    }

    pub fn set_source(&mut self, id: &str, source: &str) -> bool {
        item_id(id).is_some_and(|id| self.wb.set_source(id, source))
    }

    pub fn move_item(&mut self, id: &str, x: f64, y: f64) -> bool {
        item_id(id).is_some_and(|id| self.wb.move_item(id, Point::new(x, y)))
    }

    pub fn resize_item(&mut self, id: &str, width: f64, height: f64) -> bool {
        item_id(id).is_some_and(|id| self.wb.resize_item(id, Size::new(width, height)))
    }

    pub fn focus(&mut self, id: &str) -> bool {
        item_id(id).is_some_and(|id| self.wb.focus(id))
    }

    pub fn delete_item(&mut self, id: &str) -> bool {
        item_id(id).is_some_and(|id| self.wb.delete_items(&[id]) > 0)
    }

    pub fn delete_selected(&mut self) -> bool {
        self.wb.delete_selected() > 0
    }

    pub fn duplicate_selected(&mut self) -> bool {
        !self.wb.duplicate_selected().is_empty()
    }

    pub fn copy_selected(&mut self) -> u32 {
        self.wb.copy_selected() as u32
    }

    pub fn paste(&mut self) -> bool {
        !self.wb.paste().is_empty()
    }

    /// `alignment` is one of `left`, `center`, `right`, `top`, `middle`, `bottom`.
    pub fn align_selected(&mut self, alignment: &str) -> bool {
        Alignment::from_name(alignment).is_some_and(|a| self.wb.align_selected(a))
    }

    pub fn toggle_lock_selected(&mut self) -> bool {
        self.wb.toggle_lock_selected()
    }

    /// Ids of items matching a search query, as a JSON array.
    pub fn search(&self, query: &str) -> String {
        to_json(&self.wb.search(query))
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select_item(&mut self, id: &str, multi: bool) -> bool {
        item_id(id).is_some_and(|id| self.wb.select_item(id, multi))
    }

    pub fn select_all(&mut self) {
        self.wb.select_all();
    }

    pub fn clear_selection(&mut self) {
        self.wb.clear_selection();
    }

    pub fn get_selected_ids(&self) -> String {
        to_json(&self.wb.selection().selected_ids(self.wb.board().items()))
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Click on an item's connection handle from outside the canvas.
    /// Returns `{"ok":true,"outcome":"started|cancelled|connected|disconnected",...}`.
    pub fn toggle_link(&mut self, id: &str) -> String {
        let Some(id) = item_id(id) else {
            return error(format!("unknown item: {id}"));
        };
        match self.wb.toggle_link(id) {
            LinkOutcome::Started(from) => ok(json!({ "outcome": "started", "from": from })),
            LinkOutcome::Cancelled => ok(json!({ "outcome": "cancelled" })),
            LinkOutcome::Connected(c) => ok(json!({ "outcome": "connected", "connection": c })),
            LinkOutcome::Disconnected(c) => ok(json!({ "outcome": "disconnected", "connection": c })),
            LinkOutcome::Rejected(e) => error(e.to_string()),
        }
    }

    pub fn cancel_link(&mut self) -> bool {
        self.wb.cancel_link()
    }

    pub fn connect(&mut self, from: &str, to: &str, kind: &str) -> String {
        let Some(kind) = ConnectionType::from_name(kind) else {
            return error(format!("unknown connection type: {kind}"));
        };
        let (Some(from_id), Some(to_id)) = (item_id(from), item_id(to)) else {
            return error(format!("unknown item: {from} or {to}"));
        };
        match self.wb.connect(from_id, to_id, kind) {
            Ok(id) => ok(json!({ "connection": id })),
            Err(e) => error(e.to_string()),
        }
    }

    pub fn delete_connection(&mut self, id: &str) -> bool {
        ConnectionId::lookup(id).is_some_and(|id| self.wb.delete_connection(id))
    }

    /// Apply a JSON `ConnectionPatch` (every field optional).
    pub fn update_connection(&mut self, id: &str, patch_json: &str) -> String {
        let Some(conn) = ConnectionId::lookup(id) else {
            return error(format!("unknown connection: {id}"));
        };
        let patch: ConnectionPatch = match serde_json::from_str(patch_json) {
            Ok(patch) => patch,
            Err(e) => return error(format!("invalid patch: {e}")),
        };
        match self.wb.update_connection(conn, patch) {
            Ok(()) => ok(json!({})),
            Err(e) => error(e.to_string()),
        }
    }

    pub fn connection_stats(&self) -> String {
        to_json(&self.wb.stats())
    }

    pub fn shortest_path(&self, from: &str, to: &str) -> String {
        match (item_id(from), item_id(to)) {
            (Some(from), Some(to)) => to_json(&self.wb.shortest_path(from, to)),
            _ => "[]".to_string(),
        }
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.wb.undo().is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.wb.redo().is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.wb.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.wb.can_redo()
    }

    // ─── Collaborators ───────────────────────────────────────────────────

    /// Post a chat prompt. Returns the assistant request for the page to
    /// perform: `{"ok":true,"ticket":n,"item":..,"prompt":..,"thread":[..],"context":..}`.
    pub fn send_chat(&mut self, id: &str, prompt: &str) -> String {
        let Some(request) = item_id(id).and_then(|id| self.wb.send_chat(id, prompt)) else {
            return error("chat is busy, missing, or the prompt is empty");
        };
        ok(json!({
            "ticket": request.ticket.0,
            "item": request.item,
            "prompt": request.prompt,
            "thread": request.thread,
            "context": request.context,
        }))
    }

    /// Feed back an assistant reply (`ok = true`) or failure text.
    pub fn resolve_assistant(&mut self, ticket: f64, ok: bool, text: &str) -> bool {
        let reply = if ok {
            Ok(text.to_string())
        } else {
            Err(CollabError::Assistant(text.to_string()))
        };
        self.wb.resolve_assistant(Ticket(ticket as u64), reply)
    }

    /// Start content extraction for an item. Returns
    /// `{"ok":true,"ticket":n,"item":..,"kind":..,"source":..}`.
    pub fn request_extraction(&mut self, id: &str) -> String {
        let Some(request) = item_id(id).and_then(|id| self.wb.request_extraction(id)) else {
            return error("item has nothing to extract");
        };
        ok(json!({
            "ticket": request.ticket.0,
            "item": request.item,
            "kind": request.kind,
            "source": request.source,
        }))
    }

    /// Feed back a successful extraction as JSON
    /// `{"title":..,"extracted_text":..,"thumbnails":[..]}`.
    pub fn resolve_extraction(&mut self, ticket: f64, extraction_json: &str) -> bool {
        let result = serde_json::from_str::<Extraction>(extraction_json)
            .map_err(|e| CollabError::Extraction(format!("malformed extraction: {e}")));
        self.wb.resolve_extraction(Ticket(ticket as u64), result)
    }

    pub fn fail_extraction(&mut self, ticket: f64, message: &str) -> bool {
        self.wb
            .resolve_extraction(Ticket(ticket as u64), Err(CollabError::Extraction(message.to_string())))
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// The whole board as snapshot JSON, for the page to persist.
    pub fn snapshot_json(&self) -> String {
        match self.wb.snapshot().to_json() {
            Ok(json) => json,
            Err(e) => error(e.to_string()),
        }
    }

    /// Replace the board with a stored snapshot. Clears undo history.
    pub fn load_snapshot_json(&mut self, json: &str) -> String {
        match BoardSnapshot::from_json(json) {
            Ok(snapshot) => {
                self.wb.restore_snapshot(snapshot);
                ok(json!({ "items": self.wb.board().len() }))
            }
            Err(e) => error(e.to_string()),
        }
    }
}

impl WhiteboardCanvas {
    fn build(config: CanvasConfig, width: f64, height: f64) -> Self {
        Self {
            wb: Whiteboard::with_clock(config, Viewport::new(width, height), Box::new(BrowserClock)),
        }
    }
}

// ─── JSON helpers ────────────────────────────────────────────────────────

fn item_id(id: &str) -> Option<ItemId> {
    ItemId::lookup(id)
}

fn ok(fields: Value) -> String {
    let mut out = json!({ "ok": true });
    if let (Value::Object(out), Value::Object(fields)) = (&mut out, fields) {
        out.extend(fields);
    }
    out.to_string()
}

fn error(message: impl Into<String>) -> String {
    json!({ "ok": false, "error": message.into() }).to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| error(format!("serialization error: {e}")))
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("whiteboard WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone helpers (no canvas needed) ───────────────────────────────

/// Validate a snapshot. Returns `{"ok":true,"items":n}` or an error.
#[wasm_bindgen]
pub fn validate_snapshot(json: &str) -> String {
    match BoardSnapshot::from_json(json) {
        Ok(snapshot) => ok(json!({ "items": snapshot.items.len() })),
        Err(e) => error(e.to_string()),
    }
}

/// Connection types with their descriptions, for the type picker.
#[wasm_bindgen]
pub fn connection_types() -> String {
    let types: Vec<Value> = ConnectionType::ALL
        .iter()
        .map(|t| json!({ "type": t.name(), "description": t.description(), "style": wb_core::default_style(*t) }))
        .collect();
    Value::Array(types).to_string()
}
