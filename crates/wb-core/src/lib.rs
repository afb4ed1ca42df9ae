pub mod board;
pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod id;
pub mod layout;
pub mod model;
pub mod snapshot;
pub mod style;

pub use board::{Alignment, Board, ItemSlot, ItemTemplate, RestoreMode};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CanvasConfig;
pub use error::{ConnectError, SnapshotError};
pub use geometry::{Minimap, ViewTransform, screen_to_world, world_to_screen};
pub use graph::{ConnectionGraph, ConnectionStats};
pub use id::{ConnectionId, GroupId, ItemId};
pub use layout::{GridPlacer, Viewport};
pub use model::*;
pub use snapshot::BoardSnapshot;
pub use style::{default_style, resolve_style};

// Re-export kurbo geometry so downstream crates share one version.
pub use kurbo::{CubicBez, Point, Rect, Size, Vec2};
