//! Core board data model.
//!
//! The board is a flat list of window `Item`s placed in world space. Each
//! item owns its outgoing `Connection`s; the connection graph is the
//! flattening of every item's list. Item payloads are a tagged union keyed
//! by kind, so scrape state only exists on kinds that scrape.

use crate::id::{ConnectionId, GroupId, ItemId};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Item kinds ──────────────────────────────────────────────────────────

/// Semantic kind of a placed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    VideoEmbed,
    Document,
    Image,
    WebPage,
    ChatAgent,
    ShortFormVideo,
    SocialProfile,
    Social,
}

impl ItemKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::VideoEmbed => "video-embed",
            Self::Document => "document",
            Self::Image => "image",
            Self::WebPage => "web-page",
            Self::ChatAgent => "chat-agent",
            Self::ShortFormVideo => "short-form-video",
            Self::SocialProfile => "social-profile",
            Self::Social => "social",
        }
    }
}

/// Side of an item's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

// ─── Scraping ────────────────────────────────────────────────────────────

/// Flat status reported to the UI for a scraping item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Normalized result of the content-extraction collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub title: String,
    pub extracted_text: String,
    pub thumbnails: Vec<String>,
}

/// Scrape lifecycle. Data and error text only exist in the matching state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScrapeState {
    #[default]
    Idle,
    Loading,
    Success {
        data: Extraction,
    },
    Error {
        message: String,
    },
}

impl ScrapeState {
    pub fn status(&self) -> ScrapeStatus {
        match self {
            Self::Idle => ScrapeStatus::Idle,
            Self::Loading => ScrapeStatus::Loading,
            Self::Success { .. } => ScrapeStatus::Success,
            Self::Error { .. } => ScrapeStatus::Error,
        }
    }

    pub fn extraction(&self) -> Option<&Extraction> {
        match self {
            Self::Success { data } => Some(data),
            _ => None,
        }
    }
}

// ─── Item content ────────────────────────────────────────────────────────

/// What a video embed URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoEmbed {
    Single,
    Playlist,
    Channel,
}

/// Short-form video / social platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    TikTok,
    Instagram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Kind-specific payload of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ItemContent {
    VideoEmbed {
        url: String,
        embed: VideoEmbed,
        scrape: ScrapeState,
    },
    Document {
        file_name: Option<String>,
        scrape: ScrapeState,
    },
    Image {
        source: Option<String>,
        scrape: ScrapeState,
    },
    WebPage {
        url: String,
        scrape: ScrapeState,
    },
    ChatAgent {
        messages: Vec<ChatMessage>,
        /// Set while an assistant request for this thread is in flight.
        awaiting_reply: bool,
    },
    ShortFormVideo {
        platform: Platform,
        url: String,
    },
    SocialProfile {
        platform: Platform,
        url: String,
        scrape: ScrapeState,
    },
    Social {
        image_url: String,
    },
}

impl ItemContent {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::VideoEmbed { .. } => ItemKind::VideoEmbed,
            Self::Document { .. } => ItemKind::Document,
            Self::Image { .. } => ItemKind::Image,
            Self::WebPage { .. } => ItemKind::WebPage,
            Self::ChatAgent { .. } => ItemKind::ChatAgent,
            Self::ShortFormVideo { .. } => ItemKind::ShortFormVideo,
            Self::SocialProfile { .. } => ItemKind::SocialProfile,
            Self::Social { .. } => ItemKind::Social,
        }
    }

    /// Scrape state, for kinds that run content extraction.
    pub fn scrape(&self) -> Option<&ScrapeState> {
        match self {
            Self::VideoEmbed { scrape, .. }
            | Self::Document { scrape, .. }
            | Self::Image { scrape, .. }
            | Self::WebPage { scrape, .. }
            | Self::SocialProfile { scrape, .. } => Some(scrape),
            _ => None,
        }
    }

    pub fn scrape_mut(&mut self) -> Option<&mut ScrapeState> {
        match self {
            Self::VideoEmbed { scrape, .. }
            | Self::Document { scrape, .. }
            | Self::Image { scrape, .. }
            | Self::WebPage { scrape, .. }
            | Self::SocialProfile { scrape, .. } => Some(scrape),
            _ => None,
        }
    }

    /// The raw source string (URL, file name) the item was created from.
    pub fn source(&self) -> Option<&str> {
        match self {
            Self::VideoEmbed { url, .. }
            | Self::WebPage { url, .. }
            | Self::ShortFormVideo { url, .. }
            | Self::SocialProfile { url, .. } => Some(url),
            Self::Document { file_name, .. } => file_name.as_deref(),
            Self::Image { source, .. } => source.as_deref(),
            Self::Social { image_url } => Some(image_url),
            Self::ChatAgent { .. } => None,
        }
    }

    /// Extracted text usable as assistant context, if any.
    pub fn extracted_text(&self) -> Option<&str> {
        self.scrape()
            .and_then(ScrapeState::extraction)
            .map(|e| e.extracted_text.as_str())
            .filter(|t| !t.trim().is_empty())
    }

    /// Point the item at a new source, resetting any scrape state.
    /// Returns `false` for chat threads, which have no source.
    pub fn set_source(&mut self, source: impl Into<String>) -> bool {
        let source = source.into();
        match self {
            Self::VideoEmbed { url, .. }
            | Self::WebPage { url, .. }
            | Self::ShortFormVideo { url, .. }
            | Self::SocialProfile { url, .. } => *url = source,
            Self::Document { file_name, .. } => *file_name = Some(source),
            Self::Image { source: current, .. } => *current = Some(source),
            Self::Social { image_url } => *image_url = source,
            Self::ChatAgent { .. } => return false,
        }
        if let Some(scrape) = self.scrape_mut() {
            *scrape = ScrapeState::Idle;
        }
        true
    }

    /// Take the collaborator-owned state (chat thread, scrape lifecycle)
    /// from `live`. Scrape state only carries over while both point at the
    /// same source, since it describes that source.
    pub fn adopt_collaborator_state(&mut self, live: &ItemContent) {
        let same_source = self.source() == live.source();
        match (self, live) {
            (
                Self::ChatAgent {
                    messages,
                    awaiting_reply,
                },
                Self::ChatAgent {
                    messages: live_messages,
                    awaiting_reply: live_awaiting,
                },
            ) => {
                messages.clone_from(live_messages);
                *awaiting_reply = *live_awaiting;
            }
            (this, live) => {
                if let (true, Some(scrape), Some(live_scrape)) = (same_source, this.scrape_mut(), live.scrape()) {
                    scrape.clone_from(live_scrape);
                }
            }
        }
    }
}

// ─── Connections ─────────────────────────────────────────────────────────

/// Semantic kind of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Flow,
    Dependency,
    Association,
    Inheritance,
    Composition,
    Aggregation,
    Communication,
    Reference,
}

impl ConnectionType {
    pub const ALL: [ConnectionType; 8] = [
        Self::Flow,
        Self::Dependency,
        Self::Association,
        Self::Inheritance,
        Self::Composition,
        Self::Aggregation,
        Self::Communication,
        Self::Reference,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Dependency => "dependency",
            Self::Association => "association",
            Self::Inheritance => "inheritance",
            Self::Composition => "composition",
            Self::Aggregation => "aggregation",
            Self::Communication => "communication",
            Self::Reference => "reference",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Flow => "Data or process flow between items",
            Self::Dependency => "One item depends on another",
            Self::Association => "General relationship or link",
            Self::Inheritance => "Hierarchical parent-child relationship",
            Self::Composition => "Strong ownership relationship",
            Self::Aggregation => "Weak ownership relationship",
            Self::Communication => "Communication or interaction",
            Self::Reference => "Reference or pointer to another item",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    Solid,
    Dashed,
    Dotted,
}

impl StrokeStyle {
    /// SVG `stroke-dasharray` value.
    pub const fn dash_array(self) -> &'static str {
        match self {
            Self::Solid => "none",
            Self::Dashed => "8 4",
            Self::Dotted => "2 2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowType {
    None,
    Arrow,
    Diamond,
    Circle,
    Square,
}

/// Fully resolved visual style of a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStyle {
    /// CSS color expression.
    pub color: String,
    pub stroke_width: f64,
    pub stroke: StrokeStyle,
    pub arrow: ArrowType,
    pub animated: bool,
}

/// Per-connection overrides; `None` falls back to the type default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleOverride {
    pub color: Option<String>,
    pub stroke_width: Option<f64>,
    pub stroke: Option<StrokeStyle>,
    pub arrow: Option<ArrowType>,
    pub animated: Option<bool>,
}

impl StyleOverride {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub const MIN_STRENGTH: u8 = 1;
pub const MAX_STRENGTH: u8 = 5;

/// A typed, directed (optionally bidirectional) edge between two items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from: ItemId,
    pub to: ItemId,
    #[serde(rename = "type")]
    pub kind: ConnectionType,
    pub label: Option<String>,
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "StyleOverride::is_empty")]
    pub style: StyleOverride,
    pub bidirectional: bool,
    /// Visual weight, 1..=5.
    pub strength: u8,
    /// Milliseconds since the Unix epoch.
    pub created: u64,
    pub updated: u64,
}

impl Connection {
    /// Build a connection with type defaults. Does not validate endpoints.
    pub fn new(from: ItemId, to: ItemId, kind: ConnectionType, now: u64) -> Self {
        Self {
            id: ConnectionId::generate(),
            from,
            to,
            kind,
            label: None,
            description: None,
            style: StyleOverride::default(),
            bidirectional: false,
            strength: MIN_STRENGTH,
            created: now,
            updated: now,
        }
    }

    pub fn touches(&self, id: ItemId) -> bool {
        self.from == id || self.to == id
    }

    /// The endpoint opposite `id`, if `id` is an endpoint.
    pub fn other_end(&self, id: ItemId) -> Option<ItemId> {
        if self.from == id {
            Some(self.to)
        } else if self.to == id {
            Some(self.from)
        } else {
            None
        }
    }

    pub fn set_strength(&mut self, strength: u8) {
        self.strength = strength.clamp(MIN_STRENGTH, MAX_STRENGTH);
    }
}

/// Editable connection fields; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPatch {
    pub kind: Option<ConnectionType>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub style: Option<StyleOverride>,
    pub bidirectional: Option<bool>,
    pub strength: Option<u8>,
}

// ─── Items ───────────────────────────────────────────────────────────────

/// A placed, positioned, resizable window on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub content: ItemContent,
    /// Top-left corner in world coordinates.
    pub position: Point,
    pub size: Size,
    pub locked: bool,
    pub z_index: u32,
    /// Outgoing connections owned by this item.
    pub connections: SmallVec<[Connection; 2]>,
    pub group: Option<GroupId>,
}

impl Item {
    pub fn new(id: ItemId, title: impl Into<String>, content: ItemContent) -> Self {
        Self {
            id,
            title: title.into(),
            content,
            position: Point::ZERO,
            size: Size::new(480.0, 360.0),
            locked: false,
            z_index: 0,
            connections: SmallVec::new(),
            group: None,
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.content.kind()
    }

    /// World-space bounding rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Resize, clamping to the minimum window size.
    pub fn resized(&self, size: Size, min: Size) -> Self {
        Self {
            size: Size::new(size.width.max(min.width), size.height.max(min.height)),
            ..self.clone()
        }
    }

    pub fn moved_to(&self, position: Point) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }

    /// Case-insensitive match on title, content source/text, or kind name.
    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&q)
            || self.kind().name().contains(&q)
            || self
                .content
                .source()
                .is_some_and(|s| s.to_lowercase().contains(&q))
            || self
                .content
                .extracted_text()
                .is_some_and(|s| s.to_lowercase().contains(&q))
    }
}
