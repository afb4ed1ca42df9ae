pub mod collab;
pub mod controller;
pub mod history;
pub mod input;
pub mod selection;
pub mod shortcuts;

pub use collab::{
    ASSISTANT_FAILURE_MESSAGE, Assistant, AssistantRequest, BoardStore, CollabError, ContentExtractor,
    ExtractionRequest, MemoryStore, Ticket,
};
pub use controller::{Gesture, LinkOutcome, Whiteboard};
pub use history::{History, HistoryAction, HistoryEntry, HistoryMode};
pub use input::{InputEvent, Modifiers};
pub use selection::Selection;
pub use shortcuts::{ShortcutAction, ShortcutMap};
