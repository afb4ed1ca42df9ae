//! External collaborators: the AI assistant, content extraction and
//! board persistence.
//!
//! Assistant and extractor calls are fire-and-forget. The controller hands
//! out a request carrying a [`Ticket`]; the host performs the call however
//! it likes (usually asynchronously) and feeds the outcome back through
//! `Whiteboard::resolve_*`. Outcomes for items deleted in the meantime are
//! dropped.

use std::collections::HashMap;
use thiserror::Error;
use wb_core::model::{ChatMessage, Extraction, ItemKind};
use wb_core::{BoardSnapshot, ItemId, SnapshotError};

/// Shown in the chat thread when the assistant fails.
pub const ASSISTANT_FAILURE_MESSAGE: &str = "Sorry, I couldn't process that request.";

#[derive(Debug, Error)]
pub enum CollabError {
    #[error("assistant unavailable: {0}")]
    Assistant(String),
    #[error("could not extract content: {0}")]
    Extraction(String),
    #[error("storage failure: {0}")]
    Storage(String),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Correlates a request with its eventual response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantRequest {
    pub ticket: Ticket,
    /// The chat item that asked.
    pub item: ItemId,
    pub prompt: String,
    /// Thread so far, including the new prompt.
    pub thread: Vec<ChatMessage>,
    /// Extracted text of every item connected to the chat item.
    pub context: Option<String>,
}

impl AssistantRequest {
    /// Perform the request synchronously.
    pub fn run(&self, assistant: &dyn Assistant) -> Result<String, CollabError> {
        assistant.respond(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    pub ticket: Ticket,
    pub item: ItemId,
    pub kind: ItemKind,
    /// URL or file name handed to the extractor.
    pub source: String,
}

impl ExtractionRequest {
    pub fn run(&self, extractor: &dyn ContentExtractor) -> Result<Extraction, CollabError> {
        extractor.extract(self.kind, &self.source)
    }
}

pub trait Assistant {
    fn respond(&self, request: &AssistantRequest) -> Result<String, CollabError>;
}

pub trait ContentExtractor {
    fn extract(&self, kind: ItemKind, source: &str) -> Result<Extraction, CollabError>;
}

/// Persists whole-board snapshots by board id.
pub trait BoardStore {
    fn save(&mut self, board_id: &str, snapshot: &BoardSnapshot) -> Result<(), CollabError>;
    fn load(&self, board_id: &str) -> Result<Option<BoardSnapshot>, CollabError>;
}

/// In-process store keeping MessagePack-encoded snapshots.
#[derive(Debug, Default)]
pub struct MemoryStore {
    boards: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoded size of a stored board, if present.
    pub fn stored_bytes(&self, board_id: &str) -> Option<usize> {
        self.boards.get(board_id).map(Vec::len)
    }
}

impl BoardStore for MemoryStore {
    fn save(&mut self, board_id: &str, snapshot: &BoardSnapshot) -> Result<(), CollabError> {
        let bytes = snapshot.to_msgpack()?;
        log::debug!("saved board {board_id} ({} bytes)", bytes.len());
        self.boards.insert(board_id.to_string(), bytes);
        Ok(())
    }

    fn load(&self, board_id: &str) -> Result<Option<BoardSnapshot>, CollabError> {
        self.boards
            .get(board_id)
            .map(|bytes| BoardSnapshot::from_msgpack(bytes))
            .transpose()
            .map_err(CollabError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wb_core::Board;

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.load("missing").unwrap().is_none());

        let snapshot = BoardSnapshot::of(&Board::new());
        store.save("b1", &snapshot).unwrap();
        assert!(store.stored_bytes("b1").is_some());
        assert_eq!(store.load("b1").unwrap(), Some(snapshot));
    }

    #[test]
    fn corrupt_bytes_surface_as_snapshot_error() {
        let mut store = MemoryStore::new();
        store.boards.insert("bad".into(), vec![0xc1]);
        assert!(matches!(store.load("bad"), Err(CollabError::Snapshot(_))));
    }
}
