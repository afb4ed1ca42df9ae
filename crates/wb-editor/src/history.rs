//! Undo/redo history.
//!
//! A bounded linear log of reversible actions with a cursor at the last
//! applied entry. Each entry holds owned clones of the affected items as
//! they were before the action. Undo restores those; it first captures
//! the items' current state so redo can put back exactly what was there.
//!
//! Recording is suppressed while an entry is being replayed, so board
//! mutations made by undo/redo never create entries of their own.
//!
//! Chat threads and scrape state belong to the collaborators, not to the
//! user's actions: replaying an entry keeps whatever the live item holds
//! for those.
//!
//! A pointer gesture opens a provisional entry at gesture start. It is
//! committed when the gesture ends with motion and discarded otherwise,
//! so a plain click neither records anything nor drops the redo tail.

use std::collections::VecDeque;
use wb_core::model::Connection;
use wb_core::{Board, ItemId, ItemSlot, RestoreMode};

pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Add,
    Update,
    Delete,
    Move,
    Resize,
    Connect,
    Disconnect,
}

impl HistoryAction {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Move => "move",
            Self::Resize => "resize",
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
        }
    }

    /// Add and delete change which items exist; everything else only
    /// rewrites items that are already there.
    fn restore_mode(self) -> RestoreMode {
        match self {
            Self::Add | Self::Delete => RestoreMode::Upsert,
            _ => RestoreMode::ExistingOnly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Normal,
    ReplayingHistory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub action: HistoryAction,
    /// Pre-action state of every affected item; `None` for items the
    /// action created.
    pub before: Vec<ItemSlot>,
    /// Connections the action created or removed.
    pub connections: Vec<Connection>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Post-action state, captured when the entry is undone.
    after: Option<Vec<ItemSlot>>,
}

impl HistoryEntry {
    pub fn new(action: HistoryAction, before: Vec<ItemSlot>, timestamp: u64) -> Self {
        Self {
            action,
            before,
            connections: Vec::new(),
            timestamp,
            after: None,
        }
    }

    pub fn with_connections(mut self, connections: Vec<Connection>) -> Self {
        self.connections = connections;
        self
    }

    pub fn affected_ids(&self) -> Vec<ItemId> {
        self.before.iter().map(|(id, _)| *id).collect()
    }
}

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    /// Number of applied entries; the cursor is `applied - 1`.
    applied: usize,
    capacity: usize,
    mode: HistoryMode,
    /// The entry at the cursor is provisional; anything after it is the
    /// redo tail it will replace once committed.
    provisional: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            applied: 0,
            capacity,
            mode: HistoryMode::Normal,
            provisional: false,
        }
    }

    /// Append an entry, discarding anything that could have been redone.
    /// Returns `false` (and records nothing) while replaying.
    pub fn record(&mut self, entry: HistoryEntry) -> bool {
        if self.mode == HistoryMode::ReplayingHistory {
            log::trace!("history: ignoring {} during replay", entry.action.name());
            return false;
        }
        self.commit();
        self.entries.truncate(self.applied);
        self.entries.push_back(entry);
        self.enforce_capacity();
        true
    }

    /// Open a provisional entry at the cursor without touching the redo
    /// tail. Any earlier provisional entry is committed first.
    pub fn begin(&mut self, entry: HistoryEntry) -> bool {
        if self.mode == HistoryMode::ReplayingHistory {
            return false;
        }
        self.commit();
        self.entries.insert(self.applied, entry);
        self.applied += 1;
        self.provisional = true;
        true
    }

    /// Make the provisional entry permanent, dropping the redo tail.
    pub fn commit(&mut self) {
        if !std::mem::take(&mut self.provisional) {
            return;
        }
        self.entries.truncate(self.applied);
        self.enforce_capacity();
    }

    /// Drop the provisional entry, leaving the redo tail as it was.
    pub fn discard(&mut self) -> Option<HistoryEntry> {
        if !std::mem::take(&mut self.provisional) {
            return None;
        }
        self.applied -= 1;
        let entry = self.entries.remove(self.applied);
        if let Some(entry) = &entry {
            log::trace!("history: discarded provisional {}", entry.action.name());
        }
        entry
    }

    pub fn is_provisional(&self) -> bool {
        self.provisional
    }

    fn enforce_capacity(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.applied = self.entries.len();
    }

    /// Revert the entry at the cursor. Items that no longer exist are
    /// skipped.
    pub fn undo(&mut self, board: &mut Board) -> Option<HistoryAction> {
        self.commit();
        let index = self.applied.checked_sub(1)?;
        let entry = self.entries.get_mut(index)?;
        self.mode = HistoryMode::ReplayingHistory;

        let ids = board.with_referrers(&entry.affected_ids());
        entry.after = Some(board.capture(&ids));
        board.restore(&keep_live_collaborator_state(board, &entry.before), entry.action.restore_mode());
        let action = entry.action;

        self.applied = index;
        self.mode = HistoryMode::Normal;
        log::debug!("undo {}", action.name());
        Some(action)
    }

    /// Re-apply the entry after the cursor.
    pub fn redo(&mut self, board: &mut Board) -> Option<HistoryAction> {
        self.commit();
        let entry = self.entries.get(self.applied)?;
        self.mode = HistoryMode::ReplayingHistory;

        if let Some(after) = &entry.after {
            board.restore(&keep_live_collaborator_state(board, after), entry.action.restore_mode());
        }
        let action = entry.action;

        self.applied += 1;
        self.mode = HistoryMode::Normal;
        log::debug!("redo {}", action.name());
        Some(action)
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    /// Index of the last applied entry, `-1` when none is.
    pub fn cursor(&self) -> isize {
        self.applied as isize - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn mode(&self) -> HistoryMode {
        self.mode
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.applied = 0;
        self.provisional = false;
    }
}

/// Recorded slots with chat threads and scrape state replaced by what the
/// live board holds for the same item.
fn keep_live_collaborator_state(board: &Board, slots: &[ItemSlot]) -> Vec<ItemSlot> {
    slots
        .iter()
        .map(|(id, state)| {
            let state = state.clone().map(|mut item| {
                if let Some(live) = board.item(*id) {
                    item.content.adopt_collaborator_state(&live.content);
                }
                item
            });
            (*id, state)
        })
        .collect()
}
