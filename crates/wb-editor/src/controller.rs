//! The whiteboard controller.
//!
//! `Whiteboard` owns the board, the view and every piece of interaction
//! state, and is the only thing that mutates them. Input events drive a
//! small gesture state machine:
//!
//! | Pointer-down on…            | Gesture          |
//! |-----------------------------|------------------|
//! | empty canvas                | panning          |
//! | empty canvas + Shift        | box-selecting    |
//! | an item's title bar         | dragging-item    |
//! | an item's resize grip       | resizing-item    |
//! | an item's connection handle | linking          |
//!
//! Pointer-up ends every gesture except linking, which waits for a click
//! on a second item's connection handle (or anywhere else to abort).
//!
//! Every user-visible change is recorded in [`History`]; collaborator
//! replies are applied without recording. A drag or resize records its
//! entry at pointer-down and drops it again if the pointer never moved.
//! Keyboard shortcuts are ignored while a pointer gesture is in progress.

use crate::collab::{
    ASSISTANT_FAILURE_MESSAGE, AssistantRequest, BoardStore, CollabError, ExtractionRequest, Ticket,
};
use crate::history::{History, HistoryAction, HistoryEntry};
use crate::input::{InputEvent, Modifiers};
use crate::selection::Selection;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use std::collections::HashMap;
use wb_core::model::{
    ChatMessage, ChatRole, Connection, ConnectionPatch, ConnectionType, Extraction, Item, ItemContent, ScrapeState,
};
use wb_core::{
    Alignment, Board, BoardSnapshot, CanvasConfig, Clock, ConnectError, ConnectionId, ConnectionStats, ItemId, ItemSlot,
    ItemTemplate, Minimap, Point, Size, SystemClock, Vec2, ViewTransform, Viewport,
};
use wb_render::{Hit, ItemPart, RenderScene, SceneInput, build_scene, hit_test};

/// The active pointer gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Idle,
    Panning {
        /// Last pointer position, screen space.
        last: Point,
    },
    DraggingItem {
        id: ItemId,
        /// Pointer offset from the item origin, world space.
        grab: Vec2,
        moved: bool,
    },
    ResizingItem {
        id: ItemId,
        /// Pointer position at gesture start, world space.
        start: Point,
        start_size: Size,
        moved: bool,
    },
    BoxSelecting,
    Linking {
        from: ItemId,
    },
}

/// What a click on a connection handle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Started(ItemId),
    Cancelled,
    Connected(ConnectionId),
    Disconnected(ConnectionId),
    Rejected(ConnectError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Reply(ItemId),
    Extraction(ItemId),
}

pub struct Whiteboard {
    board: Board,
    selection: Selection,
    history: History,
    view: ViewTransform,
    viewport: Viewport,
    config: CanvasConfig,
    clock: Box<dyn Clock>,
    gesture: Gesture,
    clipboard: Vec<Item>,
    pending: HashMap<Ticket, Pending>,
    next_ticket: u64,
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new(CanvasConfig::default(), Viewport::default())
    }
}

impl Whiteboard {
    pub fn new(config: CanvasConfig, viewport: Viewport) -> Self {
        Self::with_clock(config, viewport, Box::new(SystemClock))
    }

    pub fn with_clock(config: CanvasConfig, viewport: Viewport, clock: Box<dyn Clock>) -> Self {
        Self {
            board: Board::new(),
            selection: Selection::new(),
            history: History::new(config.history_capacity),
            view: ViewTransform::default(),
            viewport,
            config,
            clock,
            gesture: Gesture::Idle,
            clipboard: Vec::new(),
            pending: HashMap::new(),
            next_ticket: 0,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn linking_from(&self) -> Option<ItemId> {
        match self.gesture {
            Gesture::Linking { from } => Some(from),
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clipboard_len(&self) -> usize {
        self.clipboard.len()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn stats(&self) -> ConnectionStats {
        self.board.graph().stats(self.config.stats_top_n)
    }

    pub fn shortest_path(&self, from: ItemId, to: ItemId) -> Vec<ItemId> {
        self.board.graph().shortest_path(from, to)
    }

    pub fn search(&self, query: &str) -> Vec<ItemId> {
        self.board.search(query).into_iter().map(|i| i.id).collect()
    }

    /// Derive the render scene for the current state.
    pub fn scene(&self) -> RenderScene {
        build_scene(SceneInput {
            board: &self.board,
            view: &self.view,
            viewport: self.viewport,
            selected: self.selection.ids(),
            selection_box: self.selection.box_rect(),
            linking_from: self.linking_from(),
            config: &self.config,
        })
    }

    fn record(&mut self, action: HistoryAction, before: Vec<ItemSlot>, connections: Vec<Connection>) {
        let entry = HistoryEntry::new(action, before, self.clock.now_ms()).with_connections(connections);
        self.history.record(entry);
    }

    fn next_ticket(&mut self, pending: Pending) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.pending.insert(ticket, pending);
        ticket
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Dispatch one input event. Returns whether anything visible changed.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => self.pointer_down(Point::new(*x, *y), *modifiers),
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp { x, y } => self.pointer_up(Point::new(*x, *y)),
            InputEvent::Wheel { x, y, dy } => self.wheel(Point::new(*x, *y), *dy),
            InputEvent::Key { key, modifiers } => self.key_down(key, *modifiers),
        }
    }

    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) -> bool {
        let world = self.view.to_world(screen);
        let hit = hit_test(self.board.items(), world);

        if self.linking_from().is_some() {
            return match hit {
                Some(Hit {
                    id,
                    part: ItemPart::ConnectionHandle(_),
                }) => {
                    self.toggle_link(id);
                    true
                }
                Some(_) => {
                    log::trace!("pointer down ignored while linking");
                    false
                }
                None => {
                    self.cancel_link();
                    true
                }
            };
        }

        if self.gesture != Gesture::Idle {
            log::trace!("pointer down ignored during {:?}", self.gesture);
            return false;
        }

        let Some(Hit { id, part }) = hit else {
            if modifiers.shift {
                self.selection.start_box(screen);
                self.gesture = Gesture::BoxSelecting;
            } else {
                self.selection.clear();
                self.gesture = Gesture::Panning { last: screen };
            }
            return true;
        };

        self.board.focus(id);
        if let ItemPart::ConnectionHandle(_) = part {
            self.gesture = Gesture::Linking { from: id };
            return true;
        }

        if modifiers.shift || !self.selection.is_selected(id) {
            self.selection.select_item(id, modifiers.shift);
        }

        let Some((locked, position, size)) = self.board.item(id).map(|i| (i.locked, i.position, i.size)) else {
            return true;
        };
        let (gesture, action) = match part {
            ItemPart::TitleBar => (
                Gesture::DraggingItem {
                    id,
                    grab: world - position,
                    moved: false,
                },
                HistoryAction::Move,
            ),
            ItemPart::ResizeHandle => (
                Gesture::ResizingItem {
                    id,
                    start: world,
                    start_size: size,
                    moved: false,
                },
                HistoryAction::Resize,
            ),
            _ => return true,
        };
        if locked {
            log::debug!("item {id} is locked; gesture rejected");
            return true;
        }
        // Recorded up front and dropped again if the pointer never moves.
        let entry = HistoryEntry::new(action, self.board.capture(&[id]), self.clock.now_ms());
        self.history.begin(entry);
        self.gesture = gesture;
        true
    }

    pub fn pointer_move(&mut self, screen: Point) -> bool {
        let world = self.view.to_world(screen);
        match &mut self.gesture {
            Gesture::Idle | Gesture::Linking { .. } => false,
            Gesture::Panning { last } => {
                let delta = screen - *last;
                *last = screen;
                self.view.pan += delta;
                true
            }
            Gesture::DraggingItem { id, grab, moved } => {
                *moved = true;
                let (id, position) = (*id, world - *grab);
                self.board.modify(id, |item| item.position = position)
            }
            Gesture::ResizingItem {
                id,
                start,
                start_size,
                moved,
            } => {
                *moved = true;
                let delta = world - *start;
                let size = Size::new(start_size.width + delta.x, start_size.height + delta.y);
                let (id, min) = (*id, self.config.min_item_size);
                self.board.modify(id, |item| *item = item.resized(size, min))
            }
            Gesture::BoxSelecting => {
                self.selection.update_box(screen);
                true
            }
        }
    }

    /// Finish a drag or resize. Its history entry stays only if the item
    /// actually moved.
    fn end_item_gesture(&mut self) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::DraggingItem { moved, .. } | Gesture::ResizingItem { moved, .. } => {
                if moved {
                    self.history.commit();
                } else {
                    self.history.discard();
                }
            }
            other => self.gesture = other,
        }
    }

    fn item_gesture_target(&self) -> Option<ItemId> {
        match self.gesture {
            Gesture::DraggingItem { id, .. } | Gesture::ResizingItem { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn pointer_up(&mut self, screen: Point) -> bool {
        if self.item_gesture_target().is_some() {
            self.end_item_gesture();
            return true;
        }
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => false,
            Gesture::Linking { from } => {
                self.gesture = Gesture::Linking { from };
                false
            }
            Gesture::BoxSelecting => {
                self.selection.update_box(screen);
                self.selection.end_box(self.board.items(), &self.view);
                true
            }
            Gesture::Panning { .. } | Gesture::DraggingItem { .. } | Gesture::ResizingItem { .. } => true,
        }
    }

    /// Zoom by a wheel delta, keeping the world point under `screen` fixed.
    pub fn wheel(&mut self, screen: Point, dy: f64) -> bool {
        let factor = (-dy / self.config.wheel_sensitivity).exp();
        if !factor.is_finite() {
            log::debug!("ignoring wheel delta {dy}");
            return false;
        }
        self.zoom_around(screen, self.view.scale * factor)
    }

    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) -> bool {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return false;
        };
        if !matches!(self.gesture, Gesture::Idle | Gesture::Linking { .. }) {
            log::trace!("shortcut {action:?} ignored during {:?}", self.gesture);
            return false;
        }
        log::trace!("shortcut {action:?}");
        match action {
            ShortcutAction::Undo => self.undo().is_some(),
            ShortcutAction::Redo => self.redo().is_some(),
            ShortcutAction::Delete => self.delete_selected() > 0,
            ShortcutAction::SelectAll => {
                self.selection.select_all(self.board.items());
                true
            }
            ShortcutAction::Duplicate => !self.duplicate_selected().is_empty(),
            ShortcutAction::Copy => {
                self.copy_selected();
                false
            }
            ShortcutAction::Paste => !self.paste().is_empty(),
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::ZoomReset => self.reset_zoom(),
            ShortcutAction::Deselect => {
                self.selection.clear();
                self.selection.cancel_box();
                self.cancel_link();
                true
            }
        }
    }

    // ─── View ────────────────────────────────────────────────────────────

    fn zoom_around(&mut self, screen: Point, scale: f64) -> bool {
        let next = self
            .view
            .zoom_at(screen, scale, self.config.min_scale, self.config.max_scale);
        let changed = next != self.view;
        self.view = next;
        changed
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_around(self.viewport.center(), self.view.scale + self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_around(self.viewport.center(), self.view.scale - self.config.zoom_step)
    }

    pub fn reset_zoom(&mut self) -> bool {
        let changed = self.view != ViewTransform::default();
        self.view = ViewTransform::default();
        changed
    }

    /// Center the viewport on the world point under a minimap click.
    pub fn minimap_navigate(&mut self, minimap: Point) {
        let map = Minimap::new(self.config.minimap_size, self.config.minimap_world_extent);
        self.view.pan = map.pan_for(minimap, self.view.scale, self.viewport);
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select_item(&mut self, id: ItemId, multi: bool) -> bool {
        if !self.board.contains(id) {
            return false;
        }
        self.selection.select_item(id, multi);
        true
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(self.board.items());
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn selected_ids(&self) -> Vec<ItemId> {
        self.selection.selected_ids(self.board.items())
    }

    // ─── Items ───────────────────────────────────────────────────────────

    /// Create one item per content string (one blank item when `contents`
    /// is empty) and record them as a single `add`.
    pub fn add_items(&mut self, template: ItemTemplate, contents: &[&str]) -> Vec<ItemId> {
        let ids = self
            .board
            .add_items(template, contents, &self.view, self.viewport, &self.config);
        self.record(HistoryAction::Add, ids.iter().map(|&id| (id, None)).collect(), Vec::new());
        ids
    }

    /// Edit an item in place, recorded as `update`.
    pub fn update_item(&mut self, id: ItemId, f: impl FnOnce(&mut Item)) -> bool {
        let before = self.board.capture(&[id]);
        if !self.board.modify(id, f) {
            return false;
        }
        self.record(HistoryAction::Update, before, Vec::new());
        true
    }

    pub fn set_title(&mut self, id: ItemId, title: &str) -> bool {
        self.update_item(id, |item| item.title = title.to_string())
    }

    pub fn set_source(&mut self, id: ItemId, source: &str) -> bool {
        let settable = self
            .board
            .item(id)
            .is_some_and(|item| !matches!(item.content, ItemContent::ChatAgent { .. }));
        settable && self.update_item(id, |item| {
            item.content.set_source(source);
        })
    }

    pub fn move_item(&mut self, id: ItemId, position: Point) -> bool {
        self.edit_unlocked(id, HistoryAction::Move, |item| item.position = position)
    }

    /// Resize, clamped to the minimum window size.
    pub fn resize_item(&mut self, id: ItemId, size: Size) -> bool {
        let min = self.config.min_item_size;
        self.edit_unlocked(id, HistoryAction::Resize, |item| *item = item.resized(size, min))
    }

    fn edit_unlocked(&mut self, id: ItemId, action: HistoryAction, f: impl FnOnce(&mut Item)) -> bool {
        match self.board.item(id) {
            None => return false,
            Some(item) if item.locked => {
                log::debug!("item {id} is locked; {} rejected", action.name());
                return false;
            }
            Some(_) => {}
        }
        let before = self.board.capture(&[id]);
        self.board.modify(id, f);
        self.record(action, before, Vec::new());
        true
    }

    /// Delete items, pruning every connection that touches them. Returns
    /// how many were removed.
    pub fn delete_items(&mut self, ids: &[ItemId]) -> usize {
        let existing: Vec<ItemId> = ids.iter().copied().filter(|&id| self.board.contains(id)).collect();
        if existing.is_empty() {
            return 0;
        }
        if self.item_gesture_target().is_some_and(|id| existing.contains(&id)) {
            self.end_item_gesture();
        }
        let before = self.board.capture(&self.board.with_referrers(&existing));
        let connections: Vec<Connection> = self
            .board
            .graph()
            .iter()
            .filter(|c| existing.iter().any(|&id| c.touches(id)))
            .cloned()
            .collect();

        let removed = self.board.remove_items(&existing).len();
        self.record(HistoryAction::Delete, before, connections);
        self.after_removal();
        log::debug!("deleted {removed} item(s)");
        removed
    }

    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selected_ids();
        self.delete_items(&ids)
    }

    /// Drop selection and gesture state that point at items that are gone.
    fn after_removal(&mut self) {
        self.selection.retain_existing(self.board.items());
        if let Some(from) = self.linking_from() {
            if !self.board.contains(from) {
                self.gesture = Gesture::Idle;
            }
        }
        if self.item_gesture_target().is_some_and(|id| !self.board.contains(id)) {
            self.end_item_gesture();
        }
    }

    /// Raise an item to the top. Not recorded.
    pub fn focus(&mut self, id: ItemId) -> bool {
        self.board.focus(id)
    }

    pub fn duplicate_selected(&mut self) -> Vec<ItemId> {
        let ids = self.selected_ids();
        if ids.is_empty() {
            return ids;
        }
        let offset = self.config.cascade_offset;
        let copies = self.board.duplicate(&ids, Vec2::new(offset, offset));
        self.record(HistoryAction::Add, copies.iter().map(|&id| (id, None)).collect(), Vec::new());
        self.selection.select_items(copies.iter().copied());
        copies
    }

    pub fn copy_selected(&mut self) -> usize {
        self.clipboard = self.board.collect(&self.selected_ids());
        self.clipboard.len()
    }

    /// Paste the clipboard at the viewport center, cascading each copy.
    pub fn paste(&mut self) -> Vec<ItemId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let at = self.viewport.world_center(&self.view);
        let pasted = self.board.paste(&self.clipboard, at, self.config.cascade_offset);
        self.record(HistoryAction::Add, pasted.iter().map(|&id| (id, None)).collect(), Vec::new());
        self.selection.select_items(pasted.iter().copied());
        pasted
    }

    pub fn align_selected(&mut self, alignment: Alignment) -> bool {
        let ids = self.selected_ids();
        let before = self.board.capture(&ids);
        if !self.board.align(&ids, alignment) {
            return false;
        }
        self.record(HistoryAction::Move, before, Vec::new());
        true
    }

    /// Unlock everything selected if anything selected is locked, else
    /// lock everything selected.
    pub fn toggle_lock_selected(&mut self) -> bool {
        let ids = self.selected_ids();
        if ids.is_empty() {
            return false;
        }
        let any_locked = self.board.collect(&ids).iter().any(|i| i.locked);
        let before = self.board.capture(&ids);
        self.board.set_locked(&ids, !any_locked);
        self.record(HistoryAction::Update, before, Vec::new());
        true
    }

    // ─── Connections ─────────────────────────────────────────────────────

    pub fn connect(&mut self, from: ItemId, to: ItemId, kind: ConnectionType) -> Result<ConnectionId, ConnectError> {
        let before = self.board.capture(&[from]);
        let id = self.board.connect(from, to, kind, self.clock.as_ref())?;
        let created = self.board.graph().by_id(id).cloned();
        self.record(HistoryAction::Connect, before, created.into_iter().collect());
        Ok(id)
    }

    /// Remove a connection from whichever item owns it. Unknown ids are a
    /// no-op.
    pub fn delete_connection(&mut self, id: ConnectionId) -> bool {
        let Some(owner) = self.board.graph().owner_of(id) else {
            log::debug!("delete_connection: unknown connection {id}");
            return false;
        };
        let before = self.board.capture(&[owner]);
        let Some(removed) = self.board.disconnect(id) else {
            return false;
        };
        self.record(HistoryAction::Disconnect, before, vec![removed]);
        true
    }

    pub fn update_connection(&mut self, id: ConnectionId, patch: ConnectionPatch) -> Result<(), ConnectError> {
        let owner = self
            .board
            .graph()
            .owner_of(id)
            .ok_or(ConnectError::UnknownConnection(id))?;
        let before = self.board.capture(&[owner]);
        self.board.update_connection(id, patch, self.clock.as_ref())?;
        let updated = self.board.graph().by_id(id).cloned();
        self.record(HistoryAction::Update, before, updated.into_iter().collect());
        Ok(())
    }

    /// Click on `id`'s connection handle: start a link, cancel it (same
    /// item), or complete it by removing a connection between the two
    /// items (either direction) or creating an `association`.
    pub fn toggle_link(&mut self, id: ItemId) -> LinkOutcome {
        let Some(from) = self.linking_from() else {
            if !self.board.contains(id) {
                return LinkOutcome::Rejected(ConnectError::MissingEndpoint(id));
            }
            self.gesture = Gesture::Linking { from: id };
            return LinkOutcome::Started(id);
        };
        self.gesture = Gesture::Idle;
        if from == id {
            return LinkOutcome::Cancelled;
        }

        let existing = self.board.graph().linking(from, id).cloned();
        if let Some(existing) = existing {
            let before = self.board.capture(&[existing.from]);
            if self.board.disconnect(existing.id).is_some() {
                let removed = existing.id;
                self.record(HistoryAction::Disconnect, before, vec![existing]);
                return LinkOutcome::Disconnected(removed);
            }
            return LinkOutcome::Cancelled;
        }

        match self.connect(from, id, ConnectionType::Association) {
            Ok(connection) => LinkOutcome::Connected(connection),
            Err(err) => {
                log::debug!("link rejected: {err}");
                LinkOutcome::Rejected(err)
            }
        }
    }

    pub fn cancel_link(&mut self) -> bool {
        if self.linking_from().is_none() {
            return false;
        }
        self.gesture = Gesture::Idle;
        true
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Step back one entry. An in-flight drag or resize is finished first.
    pub fn undo(&mut self) -> Option<HistoryAction> {
        self.end_item_gesture();
        let action = self.history.undo(&mut self.board)?;
        self.after_removal();
        self.settle_orphaned_requests();
        Some(action)
    }

    pub fn redo(&mut self) -> Option<HistoryAction> {
        self.end_item_gesture();
        let action = self.history.redo(&mut self.board)?;
        self.after_removal();
        self.settle_orphaned_requests();
        Some(action)
    }

    // ─── Collaborators ───────────────────────────────────────────────────

    /// Append a user message to a chat item and issue an assistant
    /// request for it. `None` when the item isn't an idle chat or the
    /// prompt is blank.
    pub fn send_chat(&mut self, id: ItemId, prompt: &str) -> Option<AssistantRequest> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }
        let Some(ItemContent::ChatAgent {
            awaiting_reply: false, ..
        }) = self.board.item(id).map(|i| &i.content)
        else {
            log::debug!("send_chat: {id} is not an idle chat");
            return None;
        };

        let mut thread = Vec::new();
        self.board.modify(id, |item| {
            if let ItemContent::ChatAgent {
                messages,
                awaiting_reply,
            } = &mut item.content
            {
                messages.push(ChatMessage {
                    role: ChatRole::User,
                    content: prompt.to_string(),
                });
                *awaiting_reply = true;
                thread = messages.clone();
            }
        });

        let ticket = self.next_ticket(Pending::Reply(id));
        Some(AssistantRequest {
            ticket,
            item: id,
            prompt: prompt.to_string(),
            thread,
            context: self.board.connected_context(id),
        })
    }

    /// Apply an assistant reply. Failures become an inline apology.
    /// Returns `false` for unknown tickets or chats deleted meanwhile.
    pub fn resolve_assistant(&mut self, ticket: Ticket, reply: Result<String, CollabError>) -> bool {
        let Some(Pending::Reply(id)) = self.take_pending(ticket, |p| matches!(p, Pending::Reply(_))) else {
            return false;
        };
        let content = reply.unwrap_or_else(|err| {
            log::warn!("assistant failed for {id}: {err}");
            ASSISTANT_FAILURE_MESSAGE.to_string()
        });
        let applied = self.board.modify(id, |item| {
            if let ItemContent::ChatAgent {
                messages,
                awaiting_reply,
            } = &mut item.content
            {
                messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content,
                });
                *awaiting_reply = false;
            }
        });
        if !applied {
            log::debug!("dropping reply for deleted chat {id}");
        }
        applied
    }

    /// Mark an item as loading and issue an extraction request for its
    /// source. `None` for kinds that don't scrape or items without a source.
    pub fn request_extraction(&mut self, id: ItemId) -> Option<ExtractionRequest> {
        let item = self.board.item(id)?;
        item.content.scrape()?;
        let source = item.content.source().filter(|s| !s.trim().is_empty())?.to_string();
        let kind = item.kind();

        self.board.modify(id, |item| {
            if let Some(scrape) = item.content.scrape_mut() {
                *scrape = ScrapeState::Loading;
            }
        });
        let ticket = self.next_ticket(Pending::Extraction(id));
        Some(ExtractionRequest {
            ticket,
            item: id,
            kind,
            source,
        })
    }

    pub fn resolve_extraction(&mut self, ticket: Ticket, result: Result<Extraction, CollabError>) -> bool {
        let Some(Pending::Extraction(id)) = self.take_pending(ticket, |p| matches!(p, Pending::Extraction(_))) else {
            return false;
        };
        let state = match result {
            Ok(data) => ScrapeState::Success { data },
            Err(err) => {
                log::warn!("extraction failed for {id}: {err}");
                ScrapeState::Error {
                    message: err.to_string(),
                }
            }
        };
        let applied = self.board.modify(id, |item| {
            if let Some(scrape) = item.content.scrape_mut() {
                *scrape = state;
            }
        });
        if !applied {
            log::debug!("dropping extraction for deleted item {id}");
        }
        applied
    }

    fn is_pending(&self, pending: Pending) -> bool {
        self.pending.values().any(|&p| p == pending)
    }

    /// Clear waiting and loading flags that no outstanding ticket will
    /// ever resolve, e.g. on a chat restored after its reply was dropped.
    fn settle_orphaned_requests(&mut self) {
        let orphaned: Vec<ItemId> = self
            .board
            .items()
            .iter()
            .filter(|item| match &item.content {
                ItemContent::ChatAgent {
                    awaiting_reply: true, ..
                } => !self.is_pending(Pending::Reply(item.id)),
                content => {
                    matches!(content.scrape(), Some(ScrapeState::Loading))
                        && !self.is_pending(Pending::Extraction(item.id))
                }
            })
            .map(|item| item.id)
            .collect();

        for id in orphaned {
            log::debug!("settling orphaned request on {id}");
            self.board.modify(id, |item| match &mut item.content {
                ItemContent::ChatAgent { awaiting_reply, .. } => *awaiting_reply = false,
                content => {
                    if let Some(scrape) = content.scrape_mut() {
                        *scrape = ScrapeState::Idle;
                    }
                }
            });
        }
    }

    fn take_pending(&mut self, ticket: Ticket, expected: impl Fn(&Pending) -> bool) -> Option<Pending> {
        let Some(pending) = self.pending.get(&ticket).copied() else {
            log::debug!("unknown ticket {ticket:?}");
            return None;
        };
        if !expected(&pending) {
            log::debug!("ticket {ticket:?} belongs to {pending:?}");
            return None;
        }
        self.pending.remove(&ticket)
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::of(&self.board)
    }

    /// Replace the board wholesale, resetting history, selection, the
    /// current gesture and pending tickets.
    pub fn restore_snapshot(&mut self, snapshot: BoardSnapshot) {
        self.board = snapshot.into_board();
        self.history.clear();
        self.selection = Selection::new();
        self.gesture = Gesture::Idle;
        self.pending.clear();
        self.settle_orphaned_requests();
    }

    pub fn save(&self, store: &mut dyn BoardStore, board_id: &str) -> Result<(), CollabError> {
        store.save(board_id, &self.snapshot())
    }

    /// Load a stored board. Returns `false` when nothing is stored under
    /// `board_id`, leaving the current board untouched.
    pub fn load(&mut self, store: &dyn BoardStore, board_id: &str) -> Result<bool, CollabError> {
        let Some(snapshot) = store.load(board_id)? else {
            return Ok(false);
        };
        self.restore_snapshot(snapshot);
        log::debug!("loaded board {board_id} with {} item(s)", self.board.len());
        Ok(true)
    }
}
