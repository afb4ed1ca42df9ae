//! Item lifecycle on a single board.
//!
//! `Board` owns the items, the z-order counter and the grid cursor. Items
//! are kept sorted by ascending z-order, which is also paint order. All
//! removals prune connections that would dangle.

use crate::clock::Clock;
use crate::config::CanvasConfig;
use crate::error::ConnectError;
use crate::geometry::ViewTransform;
use crate::graph::ConnectionGraph;
use crate::id::{ConnectionId, ItemId};
use crate::layout::{GridPlacer, Viewport};
use crate::model::{
    Connection, ConnectionPatch, ConnectionType, Item, ItemContent, Platform, ScrapeState, VideoEmbed,
};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;

pub const DEFAULT_VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
pub const SOCIAL_PLACEHOLDER: &str = "https://placehold.co/600x400.png";

const CHAT_SIZE: Size = Size::new(400.0, 550.0);
const REEL_SIZE: Size = Size::new(325.0, 580.0);

// ─── Templates ───────────────────────────────────────────────────────────

/// What the user asked to create. The resulting item kind can depend on
/// the supplied content (a TikTok video URL becomes a short-form video, a
/// profile URL a social profile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemTemplate {
    #[serde(rename = "youtube")]
    Video,
    #[serde(rename = "doc")]
    Document,
    Image,
    #[serde(rename = "url")]
    WebPage,
    #[serde(rename = "ai")]
    ChatAgent,
    TikTok,
    Instagram,
    Social,
}

impl ItemTemplate {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Video => "youtube",
            Self::Document => "doc",
            Self::Image => "image",
            Self::WebPage => "url",
            Self::ChatAgent => "ai",
            Self::TikTok => "tiktok",
            Self::Instagram => "instagram",
            Self::Social => "social",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Video,
            Self::Document,
            Self::Image,
            Self::WebPage,
            Self::ChatAgent,
            Self::TikTok,
            Self::Instagram,
            Self::Social,
        ]
        .into_iter()
        .find(|t| t.name() == name)
    }

    /// Build an unplaced item with this template's defaults applied.
    pub fn build(self, id: ItemId, content: &str, config: &CanvasConfig) -> Item {
        let content = content.trim();
        let mut item = Item::new(
            id,
            format!("New {}", capitalize(self.name())),
            ItemContent::Social {
                image_url: SOCIAL_PLACEHOLDER.to_string(),
            },
        );
        item.size = Size::new(config.window_width, config.window_height);

        match self {
            Self::Video => {
                let (url, embed, title) = if content.is_empty() {
                    (DEFAULT_VIDEO_URL, VideoEmbed::Single, "New Video")
                } else if content.contains("playlist?list=") {
                    (content, VideoEmbed::Playlist, "New Playlist")
                } else if ["/channel/", "/c/", "/user/"].iter().any(|p| content.contains(p)) {
                    (content, VideoEmbed::Channel, "New Channel")
                } else {
                    (content, VideoEmbed::Single, "New Video")
                };
                item.title = title.into();
                item.content = ItemContent::VideoEmbed {
                    url: url.into(),
                    embed,
                    scrape: ScrapeState::Idle,
                };
            }
            Self::Document => {
                item.title = "Document Upload".into();
                item.content = ItemContent::Document {
                    file_name: None,
                    scrape: ScrapeState::Idle,
                };
            }
            Self::Image => {
                item.title = "Image Upload".into();
                item.content = ItemContent::Image {
                    source: None,
                    scrape: ScrapeState::Idle,
                };
            }
            Self::WebPage => {
                item.title = "New Website".into();
                item.content = ItemContent::WebPage {
                    url: content.into(),
                    scrape: ScrapeState::Idle,
                };
            }
            Self::ChatAgent => {
                item.title = "AI Assistant".into();
                item.size = CHAT_SIZE;
                item.content = ItemContent::ChatAgent {
                    messages: Vec::new(),
                    awaiting_reply: false,
                };
            }
            Self::TikTok => short_form(&mut item, Platform::TikTok, content, "/video/", "Tiktok Profile"),
            Self::Instagram => short_form(&mut item, Platform::Instagram, content, "/reel/", "Instagram Profile"),
            Self::Social => {}
        }
        item
    }
}

fn short_form(item: &mut Item, platform: Platform, url: &str, reel_marker: &str, profile_title: &str) {
    if url.contains(reel_marker) {
        item.title = "New Reel".into();
        item.size = REEL_SIZE;
        item.content = ItemContent::ShortFormVideo {
            platform,
            url: url.into(),
        };
    } else {
        item.title = profile_title.into();
        item.content = ItemContent::SocialProfile {
            platform,
            url: url.into(),
            scrape: ScrapeState::Idle,
        };
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ─── Alignment ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

impl Alignment {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "top" => Some(Self::Top),
            "middle" => Some(Self::Middle),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

// ─── Restore slots ───────────────────────────────────────────────────────

/// Recorded state of one item: `None` means "absent".
pub type ItemSlot = (ItemId, Option<Item>);

/// How [`Board::restore`] treats slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreMode {
    /// Absent slots remove the item; present slots replace or reinsert it.
    Upsert,
    /// Present slots replace existing items only. Everything else is a no-op.
    ExistingOnly,
}

// ─── Board ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    items: Vec<Item>,
    max_z: u32,
    placer: GridPlacer,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a board from its parts, restoring z-order sorting.
    pub fn from_parts(mut items: Vec<Item>, max_z: u32, placer: GridPlacer) -> Self {
        items.sort_by_key(|i| i.z_index);
        let max_z = items.iter().map(|i| i.z_index).fold(max_z, u32::max);
        let mut board = Self { items, max_z, placer };
        board.prune_dangling();
        board
    }

    /// Items in paint order (lowest z first).
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.item(id).is_some()
    }

    pub fn max_z(&self) -> u32 {
        self.max_z
    }

    pub fn placer(&self) -> GridPlacer {
        self.placer
    }

    pub fn graph(&self) -> ConnectionGraph<'_> {
        ConnectionGraph::new(&self.items)
    }

    fn index_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    fn next_z(&mut self) -> u32 {
        self.max_z += 1;
        self.max_z
    }

    /// Insert keeping z-order sorted; equal z goes after existing items.
    fn place(&mut self, item: Item) {
        self.max_z = self.max_z.max(item.z_index);
        let at = self.items.partition_point(|i| i.z_index <= item.z_index);
        self.items.insert(at, item);
    }

    // ─── Creation ────────────────────────────────────────────────────────

    /// Create one item per content string (at least one), placed on the
    /// grid around the current view center.
    pub fn add_items(
        &mut self,
        template: ItemTemplate,
        contents: &[&str],
        view: &ViewTransform,
        viewport: Viewport,
        config: &CanvasConfig,
    ) -> Vec<ItemId> {
        let contents: &[&str] = if contents.is_empty() { &[""] } else { contents };
        let mut added = Vec::with_capacity(contents.len());
        for content in contents {
            let position = self.placer.next_position(view, viewport, config);
            let mut item = template.build(ItemId::generate(), content, config);
            item.position = position;
            item.z_index = self.next_z();
            log::debug!("added {} {} at {:?}", item.kind().name(), item.id, position);
            added.push(item.id);
            self.place(item);
        }
        added
    }

    /// Insert copies of `sources` with fresh ids and z-orders and no
    /// connections. The copy of `sources[i]` goes to `position(i, source)`.
    pub fn insert_copies(&mut self, sources: &[Item], position: impl Fn(usize, &Item) -> Point) -> Vec<ItemId> {
        let mut added = Vec::with_capacity(sources.len());
        for (index, source) in sources.iter().enumerate() {
            let item = Item {
                id: ItemId::generate(),
                position: position(index, source),
                z_index: self.next_z(),
                connections: SmallVec::new(),
                ..source.clone()
            };
            added.push(item.id);
            self.place(item);
        }
        added
    }

    /// Copies of `ids` offset by `offset`.
    pub fn duplicate(&mut self, ids: &[ItemId], offset: Vec2) -> Vec<ItemId> {
        let sources: Vec<Item> = self.collect(ids);
        self.insert_copies(&sources, |_, source| source.position + offset)
    }

    /// Paste `clipboard` with the first item's origin at `at`, each next
    /// one cascading by `cascade` on both axes.
    pub fn paste(&mut self, clipboard: &[Item], at: Point, cascade: f64) -> Vec<ItemId> {
        self.insert_copies(clipboard, |index, _| at + Vec2::new(cascade * index as f64, cascade * index as f64))
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Replace the stored item with the same id. Returns the old value, or
    /// `None` (and does nothing) when the id is unknown.
    pub fn replace_item(&mut self, item: Item) -> Option<Item> {
        let old = self.swap_in(item)?;
        self.prune_dangling();
        Some(old)
    }

    fn swap_in(&mut self, item: Item) -> Option<Item> {
        let index = self.index_of(item.id)?;
        if self.items[index].z_index == item.z_index {
            Some(std::mem::replace(&mut self.items[index], item))
        } else {
            let old = self.items.remove(index);
            self.place(item);
            Some(old)
        }
    }

    /// Apply `f` to an item in place. Returns whether the item existed.
    pub fn modify(&mut self, id: ItemId, f: impl FnOnce(&mut Item)) -> bool {
        let Some(index) = self.index_of(id) else {
            log::debug!("modify: unknown item {id}");
            return false;
        };
        let mut item = self.items[index].clone();
        f(&mut item);
        item.id = id;
        self.replace_item(item).is_some()
    }

    /// Remove items and prune every connection pointing at them.
    /// Unknown ids are skipped. Returns the removed items.
    pub fn remove_items(&mut self, ids: &[ItemId]) -> Vec<Item> {
        let doomed: HashSet<ItemId> = ids.iter().copied().collect();
        let mut removed = Vec::new();
        self.items.retain(|item| {
            if doomed.contains(&item.id) {
                removed.push(item.clone());
                false
            } else {
                true
            }
        });
        if !removed.is_empty() {
            self.prune_dangling();
        }
        removed
    }

    /// Drop connections whose target no longer exists.
    fn prune_dangling(&mut self) {
        let live: HashSet<ItemId> = self.items.iter().map(|i| i.id).collect();
        for item in &mut self.items {
            let before = item.connections.len();
            item.connections.retain(|c| live.contains(&c.to));
            if item.connections.len() != before {
                log::debug!("pruned {} dangling connection(s) from {}", before - item.connections.len(), item.id);
            }
        }
    }

    /// Raise an item to the top. No-op when it's already topmost or unknown.
    pub fn focus(&mut self, id: ItemId) -> bool {
        let Some(current) = self.item(id).map(|i| i.z_index) else {
            return false;
        };
        if current >= self.max_z {
            return false;
        }
        let z = self.next_z();
        self.modify(id, |item| item.z_index = z)
    }

    pub fn set_locked(&mut self, ids: &[ItemId], locked: bool) {
        for &id in ids {
            self.modify(id, |item| item.locked = locked);
        }
    }

    /// Align items along one edge or center line. Needs at least two items.
    pub fn align(&mut self, ids: &[ItemId], alignment: Alignment) -> bool {
        let targets = self.collect(ids);
        if targets.len() < 2 {
            return false;
        }
        let min_x = targets.iter().map(|i| i.bounds().x0).fold(f64::INFINITY, f64::min);
        let max_x = targets.iter().map(|i| i.bounds().x1).fold(f64::NEG_INFINITY, f64::max);
        let min_y = targets.iter().map(|i| i.bounds().y0).fold(f64::INFINITY, f64::min);
        let max_y = targets.iter().map(|i| i.bounds().y1).fold(f64::NEG_INFINITY, f64::max);

        for item in targets {
            let Point { x, y } = item.position;
            let Size { width, height } = item.size;
            let position = match alignment {
                Alignment::Left => Point::new(min_x, y),
                Alignment::Center => Point::new((min_x + max_x) / 2.0 - width / 2.0, y),
                Alignment::Right => Point::new(max_x - width, y),
                Alignment::Top => Point::new(x, min_y),
                Alignment::Middle => Point::new(x, (min_y + max_y) / 2.0 - height / 2.0),
                Alignment::Bottom => Point::new(x, max_y - height),
            };
            self.modify(item.id, |item| item.position = position);
        }
        true
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Create a connection `from → to` owned by `from`.
    pub fn connect(
        &mut self,
        from: ItemId,
        to: ItemId,
        kind: ConnectionType,
        clock: &dyn Clock,
    ) -> Result<ConnectionId, ConnectError> {
        self.graph().validate(from, to)?;
        let connection = Connection::new(from, to, kind, clock.now_ms());
        let id = connection.id;
        self.modify(from, |item| item.connections.push(connection));
        log::debug!("connected {from} -> {to} ({})", kind.name());
        Ok(id)
    }

    /// Remove a connection from its owner. Idempotent.
    pub fn disconnect(&mut self, id: ConnectionId) -> Option<Connection> {
        let owner = self.graph().owner_of(id)?;
        let mut removed = None;
        self.modify(owner, |item| {
            if let Some(at) = item.connections.iter().position(|c| c.id == id) {
                removed = Some(item.connections.remove(at));
            }
        });
        removed
    }

    pub fn update_connection(
        &mut self,
        id: ConnectionId,
        patch: ConnectionPatch,
        clock: &dyn Clock,
    ) -> Result<(), ConnectError> {
        let owner = self.graph().owner_of(id).ok_or(ConnectError::UnknownConnection(id))?;
        let now = clock.now_ms();
        self.modify(owner, |item| {
            if let Some(c) = item.connections.iter_mut().find(|c| c.id == id) {
                if let Some(kind) = patch.kind {
                    c.kind = kind;
                }
                if let Some(label) = patch.label {
                    c.label = Some(label).filter(|l| !l.is_empty());
                }
                if let Some(description) = patch.description {
                    c.description = Some(description).filter(|d| !d.is_empty());
                }
                if let Some(style) = patch.style {
                    c.style = style;
                }
                if let Some(bidirectional) = patch.bidirectional {
                    c.bidirectional = bidirectional;
                }
                if let Some(strength) = patch.strength {
                    c.set_strength(strength);
                }
                c.updated = now;
            }
        });
        Ok(())
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Clones of the items with the given ids, in `ids` order.
    pub fn collect(&self, ids: &[ItemId]) -> Vec<Item> {
        ids.iter().filter_map(|&id| self.item(id).cloned()).collect()
    }

    pub fn search(&self, query: &str) -> Vec<&Item> {
        self.items.iter().filter(|i| i.matches_query(query)).collect()
    }

    /// Text extracted from every item connected to `id`, joined by blank
    /// lines. `None` when nothing connected has text.
    pub fn connected_context(&self, id: ItemId) -> Option<String> {
        let texts: Vec<&str> = self
            .graph()
            .neighbors(id)
            .into_iter()
            .filter_map(|n| self.item(n))
            .filter_map(|item| item.content.extracted_text())
            .collect();
        (!texts.is_empty()).then(|| texts.join("\n\n"))
    }

    // ─── Snapshots for undo ──────────────────────────────────────────────

    /// `ids` plus every item holding a connection to one of them.
    pub fn with_referrers(&self, ids: &[ItemId]) -> Vec<ItemId> {
        let mut out: Vec<ItemId> = ids.to_vec();
        for item in &self.items {
            if !out.contains(&item.id) && item.connections.iter().any(|c| ids.contains(&c.to)) {
                out.push(item.id);
            }
        }
        out
    }

    /// Current state of each id, absent ones included.
    pub fn capture(&self, ids: &[ItemId]) -> Vec<ItemSlot> {
        ids.iter().map(|&id| (id, self.item(id).cloned())).collect()
    }

    /// Put items back to recorded states.
    pub fn restore(&mut self, slots: &[ItemSlot], mode: RestoreMode) {
        for (id, state) in slots {
            match (state, mode) {
                (None, RestoreMode::Upsert) => self.items.retain(|i| i.id != *id),
                (None, RestoreMode::ExistingOnly) => {}
                (Some(item), _) if self.contains(*id) => {
                    self.swap_in(item.clone());
                }
                (Some(item), RestoreMode::Upsert) => self.place(item.clone()),
                (Some(_), RestoreMode::ExistingOnly) => {
                    log::debug!("restore: skipping missing item {id}");
                }
            }
        }
        self.prune_dangling();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::ItemKind;
    use pretty_assertions::assert_eq;

    fn board_with(n: usize) -> (Board, Vec<ItemId>) {
        let mut board = Board::new();
        let contents: Vec<&str> = vec!["https://example.com"; n];
        let ids = board.add_items(
            ItemTemplate::WebPage,
            &contents,
            &ViewTransform::default(),
            Viewport::new(1000.0, 800.0),
            &CanvasConfig::default(),
        );
        (board, ids)
    }

    #[test]
    fn template_defaults() {
        let config = CanvasConfig::default();
        let id = ItemId::generate();

        let chat = ItemTemplate::ChatAgent.build(id, "", &config);
        assert_eq!(chat.title, "AI Assistant");
        assert_eq!(chat.size, Size::new(400.0, 550.0));

        let video = ItemTemplate::Video.build(id, "", &config);
        assert_eq!(video.title, "New Video");
        assert_eq!(video.content.source(), Some(DEFAULT_VIDEO_URL));

        let playlist = ItemTemplate::Video.build(id, "https://youtube.com/playlist?list=abc", &config);
        assert_eq!(playlist.title, "New Playlist");
        let channel = ItemTemplate::Video.build(id, "https://youtube.com/c/someone", &config);
        assert_eq!(channel.title, "New Channel");

        let reel = ItemTemplate::TikTok.build(id, "https://tiktok.com/@a/video/1", &config);
        assert_eq!(reel.kind(), ItemKind::ShortFormVideo);
        assert_eq!(reel.size, Size::new(325.0, 580.0));
        let profile = ItemTemplate::Instagram.build(id, "https://instagram.com/someone", &config);
        assert_eq!(profile.kind(), ItemKind::SocialProfile);
        assert_eq!(profile.title, "Instagram Profile");

        let social = ItemTemplate::Social.build(id, "", &config);
        assert_eq!(social.title, "New Social");
        assert_eq!(social.content.source(), Some(SOCIAL_PLACEHOLDER));
    }

    #[test]
    fn template_names_roundtrip() {
        for name in ["youtube", "doc", "image", "url", "ai", "tiktok", "instagram", "social"] {
            assert_eq!(ItemTemplate::from_name(name).map(ItemTemplate::name), Some(name));
        }
    }

    #[test]
    fn creation_assigns_increasing_z() {
        let (board, ids) = board_with(3);
        let z: Vec<u32> = ids.iter().filter_map(|&id| board.item(id)).map(|i| i.z_index).collect();
        assert_eq!(z, vec![1, 2, 3]);
        assert_eq!(board.max_z(), 3);
    }

    #[test]
    fn focus_raises_only_when_not_on_top() {
        let (mut board, ids) = board_with(2);
        assert!(!board.focus(ids[1]));
        assert!(board.focus(ids[0]));
        assert_eq!(board.item(ids[0]).map(|i| i.z_index), Some(3));
        assert_eq!(board.items().last().map(|i| i.id), Some(ids[0]));
    }

    #[test]
    fn delete_prunes_incoming_connections() {
        let (mut board, ids) = board_with(3);
        let clock = ManualClock::default();
        board.connect(ids[0], ids[1], ConnectionType::Flow, &clock).unwrap();
        board.connect(ids[2], ids[1], ConnectionType::Reference, &clock).unwrap();
        board.connect(ids[0], ids[2], ConnectionType::Flow, &clock).unwrap();

        board.remove_items(&[ids[1]]);
        assert!(board.graph().iter().all(|c| c.from != ids[1] && c.to != ids[1]));
        assert_eq!(board.graph().len(), 1);
    }

    #[test]
    fn invalid_connection_leaves_board_unchanged() {
        let (mut board, ids) = board_with(1);
        let before = board.clone();
        let clock = ManualClock::default();
        assert_eq!(
            board.connect(ids[0], ids[0], ConnectionType::Flow, &clock),
            Err(ConnectError::SelfLoop(ids[0]))
        );
        let ghost = ItemId::intern("board_ghost");
        assert_eq!(
            board.connect(ids[0], ghost, ConnectionType::Flow, &clock),
            Err(ConnectError::MissingEndpoint(ghost))
        );
        assert_eq!(board, before);
    }

    #[test]
    fn update_connection_bumps_timestamp_and_clamps() {
        let (mut board, ids) = board_with(2);
        let clock = ManualClock::starting_at(100);
        let id = board.connect(ids[0], ids[1], ConnectionType::Flow, &clock).unwrap();
        let patch = ConnectionPatch {
            label: Some("feeds".into()),
            strength: Some(12),
            ..Default::default()
        };
        board.update_connection(id, patch, &clock).unwrap();
        let c = board.graph().by_id(id).cloned().unwrap();
        assert_eq!(c.label.as_deref(), Some("feeds"));
        assert_eq!(c.strength, 5);
        assert_eq!(c.created, 100);
        assert_eq!(c.updated, 101);

        let missing = ConnectionId::intern("board_missing_conn");
        assert_eq!(
            board.update_connection(missing, ConnectionPatch::default(), &clock),
            Err(ConnectError::UnknownConnection(missing))
        );
    }

    #[test]
    fn disconnect_is_idempotent() {
        let (mut board, ids) = board_with(2);
        let id = board.connect(ids[0], ids[1], ConnectionType::Flow, &ManualClock::default()).unwrap();
        assert!(board.disconnect(id).is_some());
        assert!(board.disconnect(id).is_none());
        assert!(board.graph().is_empty());
    }

    #[test]
    fn align_left_and_bottom() {
        let (mut board, ids) = board_with(2);
        board.modify(ids[1], |i| {
            i.position = Point::new(700.0, 90.0);
            i.size = Size::new(300.0, 200.0);
        });
        assert!(board.align(&ids, Alignment::Left));
        let xs: Vec<f64> = board.collect(&ids).iter().map(|i| i.position.x).collect();
        assert_eq!(xs, vec![0.0, 0.0]);

        assert!(board.align(&ids, Alignment::Bottom));
        let bottoms: Vec<f64> = board.collect(&ids).iter().map(|i| i.bounds().y1).collect();
        assert_eq!(bottoms, vec![360.0, 360.0]);

        assert!(!board.align(&ids[..1], Alignment::Top));
    }

    #[test]
    fn duplicate_and_paste_make_fresh_unconnected_copies() {
        let (mut board, ids) = board_with(2);
        board.connect(ids[0], ids[1], ConnectionType::Flow, &ManualClock::default()).unwrap();

        let copies = board.duplicate(&ids[..1], Vec2::new(20.0, 20.0));
        let copy = board.item(copies[0]).cloned().unwrap();
        assert_ne!(copy.id, ids[0]);
        assert_eq!(copy.position, Point::new(20.0, 20.0));
        assert!(copy.connections.is_empty());
        assert_eq!(copy.z_index, 3);

        let clipboard = board.collect(&ids);
        let pasted = board.paste(&clipboard, Point::new(100.0, 100.0), 20.0);
        let positions: Vec<Point> = board.collect(&pasted).iter().map(|i| i.position).collect();
        assert_eq!(positions, vec![Point::new(100.0, 100.0), Point::new(120.0, 120.0)]);
    }

    #[test]
    fn capture_and_restore_roundtrip() {
        let (mut board, ids) = board_with(2);
        board.connect(ids[0], ids[1], ConnectionType::Flow, &ManualClock::default()).unwrap();
        let before = board.clone();

        let affected = board.with_referrers(&ids[1..]);
        assert_eq!(affected, vec![ids[1], ids[0]]);
        let slots = board.capture(&affected);
        board.remove_items(&ids[1..]);
        assert!(board.graph().is_empty());

        board.restore(&slots, RestoreMode::Upsert);
        assert_eq!(board.items(), before.items());
    }

    #[test]
    fn existing_only_restore_ignores_missing() {
        let (mut board, ids) = board_with(1);
        let slots = board.capture(&ids);
        board.remove_items(&ids);
        board.restore(&slots, RestoreMode::ExistingOnly);
        assert!(board.is_empty());
    }

    #[test]
    fn connected_context_joins_extracted_text() {
        let (mut board, ids) = board_with(3);
        let clock = ManualClock::default();
        for (id, text) in [(ids[1], "alpha"), (ids[2], "beta")] {
            board.modify(id, |item| {
                if let Some(scrape) = item.content.scrape_mut() {
                    *scrape = ScrapeState::Success {
                        data: crate::model::Extraction {
                            title: String::new(),
                            extracted_text: text.into(),
                            thumbnails: vec![],
                        },
                    };
                }
            });
        }
        assert_eq!(board.connected_context(ids[0]), None);
        board.connect(ids[0], ids[1], ConnectionType::Association, &clock).unwrap();
        board.connect(ids[2], ids[0], ConnectionType::Association, &clock).unwrap();
        assert_eq!(board.connected_context(ids[0]).as_deref(), Some("alpha\n\nbeta"));
    }
}
