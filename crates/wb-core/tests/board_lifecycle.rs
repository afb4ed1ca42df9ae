//! Integration tests: item lifecycle and connection graph on a live board.
//!
//! Exercises placement → connection → graph query → deletion → snapshot.

use pretty_assertions::assert_eq;
use wb_core::{
    Board, BoardSnapshot, CanvasConfig, ConnectError, ConnectionType, ItemId, ItemKind, ItemTemplate, ManualClock,
    Point, ViewTransform, Viewport,
};

const VIEWPORT: Viewport = Viewport {
    width: 1200.0,
    height: 800.0,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn add(board: &mut Board, template: ItemTemplate, n: usize) -> Vec<ItemId> {
    let contents = vec!["https://example.com/page"; n];
    board.add_items(
        template,
        &contents,
        &ViewTransform::default(),
        VIEWPORT,
        &CanvasConfig::default(),
    )
}

fn chain(board: &mut Board, ids: &[ItemId], clock: &ManualClock) {
    for pair in ids.windows(2) {
        board.connect(pair[0], pair[1], ConnectionType::Flow, clock).unwrap();
    }
}

// ─── Placement ───────────────────────────────────────────────────────────

#[test]
fn grid_continues_across_calls() {
    init_logger();
    let mut board = Board::new();
    let first = add(&mut board, ItemTemplate::WebPage, 1);
    let second = add(&mut board, ItemTemplate::WebPage, 1);
    let a = board.item(first[0]).unwrap().position;
    let b = board.item(second[0]).unwrap().position;
    assert_eq!(b, Point::new(a.x + 480.0 + 20.0, a.y));
}

#[test]
fn template_kind_depends_on_url() {
    let mut board = Board::new();
    let config = CanvasConfig::default();
    let ids = board.add_items(
        ItemTemplate::TikTok,
        &["https://www.tiktok.com/@someone/video/123", "https://www.tiktok.com/@someone"],
        &ViewTransform::default(),
        VIEWPORT,
        &config,
    );
    let kinds: Vec<ItemKind> = board.collect(&ids).iter().map(|i| i.kind()).collect();
    assert_eq!(kinds, vec![ItemKind::ShortFormVideo, ItemKind::SocialProfile]);
}

// ─── Reachability ────────────────────────────────────────────────────────

#[test]
fn shortcut_shortens_path() {
    init_logger();
    let mut board = Board::new();
    let clock = ManualClock::default();
    let ids = add(&mut board, ItemTemplate::WebPage, 5);
    chain(&mut board, &ids, &clock);

    assert_eq!(board.graph().shortest_path(ids[0], ids[4]), ids);

    board.connect(ids[1], ids[4], ConnectionType::Reference, &clock).unwrap();
    let path = board.graph().shortest_path(ids[0], ids[4]);
    assert_eq!(path, vec![ids[0], ids[1], ids[4]]);
}

#[test]
fn disconnected_items_have_no_path() {
    let mut board = Board::new();
    let ids = add(&mut board, ItemTemplate::Document, 3);
    board
        .connect(ids[0], ids[1], ConnectionType::Dependency, &ManualClock::default())
        .unwrap();
    assert!(board.graph().shortest_path(ids[0], ids[2]).is_empty());
    assert_eq!(board.graph().shortest_path(ids[2], ids[2]), vec![ids[2]]);
}

// ─── Validation & pruning ────────────────────────────────────────────────

#[test]
fn rejected_connections_change_nothing() {
    let mut board = Board::new();
    let ids = add(&mut board, ItemTemplate::Image, 1);
    let clock = ManualClock::default();
    let snapshot = BoardSnapshot::of(&board);

    assert!(matches!(
        board.connect(ids[0], ids[0], ConnectionType::Flow, &clock),
        Err(ConnectError::SelfLoop(_))
    ));
    assert!(matches!(
        board.connect(ids[0], ItemId::intern("nowhere"), ConnectionType::Flow, &clock),
        Err(ConnectError::MissingEndpoint(_))
    ));
    assert_eq!(BoardSnapshot::of(&board), snapshot);
}

#[test]
fn deleting_hub_prunes_every_reference() {
    init_logger();
    let mut board = Board::new();
    let clock = ManualClock::default();
    let ids = add(&mut board, ItemTemplate::WebPage, 4);
    let hub = ids[0];
    for &spoke in &ids[1..] {
        board.connect(spoke, hub, ConnectionType::Association, &clock).unwrap();
    }
    board.connect(ids[1], ids[2], ConnectionType::Flow, &clock).unwrap();

    board.remove_items(&[hub]);
    let remaining: Vec<(ItemId, ItemId)> = board.graph().iter().map(|c| (c.from, c.to)).collect();
    assert_eq!(remaining, vec![(ids[1], ids[2])]);

    let stats = board.graph().stats(5);
    assert_eq!(stats.total, 1);
    assert_eq!(stats.average_per_item, 1.0);
}

// ─── Persistence ─────────────────────────────────────────────────────────

#[test]
fn snapshot_keeps_grid_cursor() {
    let mut board = Board::new();
    add(&mut board, ItemTemplate::WebPage, 2);
    let bytes = BoardSnapshot::of(&board).to_msgpack().unwrap();
    let mut restored = BoardSnapshot::from_msgpack(&bytes).unwrap().into_board();

    let next_original = add(&mut board, ItemTemplate::WebPage, 1);
    let next_restored = add(&mut restored, ItemTemplate::WebPage, 1);
    assert_eq!(
        board.item(next_original[0]).map(|i| i.position),
        restored.item(next_restored[0]).map(|i| i.position)
    );
    assert_eq!(restored.max_z(), 3);
}
