//! Integration tests: undo/redo over every recorded action kind.
//!
//! Checks the inverse law (undo restores the exact pre-action items, redo
//! the exact post-action items), cursor bookkeeping, and that collaborator
//! results arriving between an action and its undo survive the undo.

use pretty_assertions::assert_eq;
use wb_core::{
    Alignment, CanvasConfig, ChatMessage, ChatRole, ConnectionPatch, ConnectionType, Extraction, Item, ItemContent,
    ItemId, ItemTemplate, ManualClock, Point, ScrapeState, Size, Viewport,
};
use wb_editor::{CollabError, HistoryAction, Whiteboard};

fn whiteboard(capacity: usize) -> Whiteboard {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = CanvasConfig {
        history_capacity: capacity,
        ..CanvasConfig::default()
    };
    Whiteboard::with_clock(config, Viewport::new(1200.0, 800.0), Box::new(ManualClock::default()))
}

fn items(wb: &Whiteboard) -> Vec<Item> {
    wb.board().items().to_vec()
}

fn chat_state(wb: &Whiteboard, id: ItemId) -> Option<(Vec<ChatMessage>, bool)> {
    match wb.board().item(id).map(|i| &i.content) {
        Some(ItemContent::ChatAgent {
            messages,
            awaiting_reply,
        }) => Some((messages.clone(), *awaiting_reply)),
        _ => None,
    }
}

#[test]
fn inverse_law_across_action_kinds() {
    let mut wb = whiteboard(50);
    let mut states = vec![items(&wb)];
    let mut actions = Vec::new();

    let ids = wb.add_items(ItemTemplate::WebPage, &["https://a.example", "https://b.example", "https://c.example"]);
    states.push(items(&wb));
    actions.push(HistoryAction::Add);

    wb.move_item(ids[1], Point::new(40.0, 600.0));
    states.push(items(&wb));
    actions.push(HistoryAction::Move);

    wb.resize_item(ids[2], Size::new(640.0, 480.0));
    states.push(items(&wb));
    actions.push(HistoryAction::Resize);

    let ab = wb.connect(ids[0], ids[1], ConnectionType::Flow).unwrap();
    states.push(items(&wb));
    actions.push(HistoryAction::Connect);

    wb.connect(ids[2], ids[1], ConnectionType::Reference).unwrap();
    states.push(items(&wb));
    actions.push(HistoryAction::Connect);

    let ac = wb.connect(ids[0], ids[2], ConnectionType::Dependency).unwrap();
    states.push(items(&wb));
    actions.push(HistoryAction::Connect);

    let patch = ConnectionPatch {
        label: Some("feeds".into()),
        bidirectional: Some(true),
        ..Default::default()
    };
    wb.update_connection(ab, patch).unwrap();
    states.push(items(&wb));
    actions.push(HistoryAction::Update);

    wb.select_all();
    wb.align_selected(Alignment::Top);
    states.push(items(&wb));
    actions.push(HistoryAction::Move);

    wb.toggle_lock_selected();
    states.push(items(&wb));
    actions.push(HistoryAction::Update);

    wb.delete_items(&[ids[1]]);
    states.push(items(&wb));
    actions.push(HistoryAction::Delete);

    assert_eq!(wb.board().graph().len(), 1, "only the link between survivors remains");
    assert!(wb.delete_connection(ac));
    states.push(items(&wb));
    actions.push(HistoryAction::Disconnect);

    assert_eq!(wb.history().len(), actions.len());

    for step in (0..actions.len()).rev() {
        assert!(wb.can_undo());
        assert_eq!(wb.undo(), Some(actions[step]));
        assert_eq!(items(&wb), states[step], "undo of step {step}");
        assert!(wb.can_redo());
    }
    assert!(!wb.can_undo());
    assert_eq!(wb.undo(), None);

    for step in 0..actions.len() {
        assert_eq!(wb.redo(), Some(actions[step]));
        assert_eq!(items(&wb), states[step + 1], "redo of step {step}");
    }
    assert!(!wb.can_redo());
    assert_eq!(wb.history().cursor(), actions.len() as isize - 1);
}

#[test]
fn new_action_after_undo_discards_redo() {
    let mut wb = whiteboard(50);
    let id = wb.add_items(ItemTemplate::Image, &[])[0];
    wb.move_item(id, Point::new(10.0, 10.0));
    wb.undo();
    assert!(wb.can_redo());

    wb.resize_item(id, Size::new(500.0, 500.0));
    assert!(!wb.can_redo());
    assert_eq!(wb.history().len(), 2);
}

#[test]
fn capacity_keeps_newest_entries() {
    let mut wb = whiteboard(3);
    for _ in 0..5 {
        wb.add_items(ItemTemplate::Image, &[]);
    }
    assert_eq!(wb.history().len(), 3);

    for _ in 0..3 {
        assert_eq!(wb.undo(), Some(HistoryAction::Add));
    }
    assert_eq!(wb.undo(), None);
    assert_eq!(wb.board().len(), 2);
}

#[test]
fn undo_clears_selection_of_removed_items() {
    let mut wb = whiteboard(50);
    let id = wb.add_items(ItemTemplate::Image, &[])[0];
    wb.select_item(id, false);
    wb.undo();
    assert!(wb.selection().is_empty());
}

#[test]
fn duplicate_undo_removes_only_copies() {
    let mut wb = whiteboard(50);
    let ids = wb.add_items(ItemTemplate::Image, &["x", "y"]);
    wb.select_all();
    let copies = wb.duplicate_selected();
    assert_eq!(copies.len(), 2);
    wb.undo();
    assert_eq!(wb.board().len(), 2);
    assert!(ids.iter().all(|&id| wb.board().contains(id)));
}

#[test]
fn collaborator_updates_do_not_enter_history() {
    let mut wb = whiteboard(50);
    let chat = wb.add_items(ItemTemplate::ChatAgent, &[])[0];
    let request = wb.send_chat(chat, "hello").unwrap();
    wb.resolve_assistant(request.ticket, Ok("hi".into()));
    assert_eq!(wb.history().len(), 1);
}

// ─── Collaborator results across undo ────────────────────────────────────

#[test]
fn undoing_a_move_keeps_a_reply_that_arrived_later() {
    let mut wb = whiteboard(50);
    let chat = wb.add_items(ItemTemplate::ChatAgent, &[])[0];
    let start = wb.board().item(chat).map(|i| i.position);
    let request = wb.send_chat(chat, "question").unwrap();
    wb.move_item(chat, Point::new(900.0, 900.0));
    assert!(wb.resolve_assistant(request.ticket, Ok("answer".into())));

    assert_eq!(wb.undo(), Some(HistoryAction::Move));
    assert_eq!(wb.board().item(chat).map(|i| i.position), start);
    let (messages, awaiting) = chat_state(&wb, chat).unwrap_or_default();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, "answer");
    assert!(!awaiting);
    assert!(wb.send_chat(chat, "follow-up").is_some());

    assert_eq!(wb.redo(), Some(HistoryAction::Move));
    assert_eq!(chat_state(&wb, chat).map(|(m, _)| m.len()), Some(3));
}

#[test]
fn undoing_a_move_keeps_a_finished_extraction() {
    let mut wb = whiteboard(50);
    let page = wb.add_items(ItemTemplate::WebPage, &["https://example.com"])[0];
    let request = wb.request_extraction(page).unwrap();
    wb.move_item(page, Point::new(900.0, 900.0));

    let data = Extraction {
        title: "Example".into(),
        extracted_text: "hello".into(),
        thumbnails: vec![],
    };
    assert!(wb.resolve_extraction(request.ticket, Ok(data.clone())));
    assert_eq!(wb.undo(), Some(HistoryAction::Move));
    assert_eq!(
        wb.board().item(page).and_then(|i| i.content.scrape()).cloned(),
        Some(ScrapeState::Success { data })
    );
}

#[test]
fn restored_chat_whose_reply_was_dropped_is_not_left_waiting() {
    let mut wb = whiteboard(50);
    let chat = wb.add_items(ItemTemplate::ChatAgent, &[])[0];
    let request = wb.send_chat(chat, "question").unwrap();
    wb.delete_items(&[chat]);
    assert!(!wb.resolve_assistant(request.ticket, Ok("lost".into())));

    assert_eq!(wb.undo(), Some(HistoryAction::Delete));
    let (messages, awaiting) = chat_state(&wb, chat).unwrap_or_default();
    assert_eq!(messages.len(), 1);
    assert!(!awaiting);
    assert!(wb.send_chat(chat, "again").is_some());
}

#[test]
fn restored_chat_still_receives_an_outstanding_reply() {
    let mut wb = whiteboard(50);
    let chat = wb.add_items(ItemTemplate::ChatAgent, &[])[0];
    let request = wb.send_chat(chat, "question").unwrap();
    wb.delete_items(&[chat]);
    wb.undo();
    assert_eq!(chat_state(&wb, chat).map(|(_, waiting)| waiting), Some(true));

    assert!(wb.resolve_assistant(request.ticket, Ok("answer".into())));
    let thread = vec![
        ChatMessage {
            role: ChatRole::User,
            content: "question".into(),
        },
        ChatMessage {
            role: ChatRole::Assistant,
            content: "answer".into(),
        },
    ];
    assert_eq!(chat_state(&wb, chat), Some((thread, false)));
}

#[test]
fn restored_page_with_dropped_extraction_leaves_loading() {
    let mut wb = whiteboard(50);
    let page = wb.add_items(ItemTemplate::WebPage, &["https://example.com"])[0];
    let request = wb.request_extraction(page).unwrap();
    wb.delete_items(&[page]);
    assert!(!wb.resolve_extraction(request.ticket, Err(CollabError::Extraction("offline".into()))));

    wb.undo();
    assert_eq!(
        wb.board().item(page).and_then(|i| i.content.scrape()).cloned(),
        Some(ScrapeState::Idle)
    );
}
