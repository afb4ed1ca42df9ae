//! Render scene derivation.
//!
//! Items and connections are emitted in world coordinates and share the
//! single `transform` the host applies to the whole canvas layer, so the
//! two layers can never disagree. Stroke widths are pre-divided by scale
//! so lines keep a constant on-screen thickness. The selection box and
//! minimap are in screen/minimap pixels.

use serde::Serialize;
use std::collections::BTreeSet;
use wb_core::geometry::{connection_path, handle_position, optimal_sides, path_to_svg, spread_offsets};
use wb_core::model::{ArrowType, Connection, ConnectionType, Item, ItemKind, ScrapeStatus};
use wb_core::style::{resolve_style, strength_halo_width};
use wb_core::{Board, CanvasConfig, ConnectionId, ItemId, Minimap, Point, Rect, ViewTransform, Viewport};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub id: ItemId,
    pub kind: ItemKind,
    pub title: String,
    pub world: Rect,
    pub screen: Rect,
    pub z_index: u32,
    pub selected: bool,
    pub locked: bool,
    /// Source of the item currently being linked from.
    pub linking_from: bool,
    pub connected: bool,
    pub scrape: Option<ScrapeStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionView {
    pub id: ConnectionId,
    pub from: ItemId,
    pub to: ItemId,
    pub kind: ConnectionType,
    /// World-space SVG path data.
    pub path: String,
    pub color: String,
    /// Stroke width to draw with under the canvas transform.
    pub stroke_width: f64,
    pub dash_array: &'static str,
    pub arrow: ArrowType,
    pub marker_size: f64,
    pub animated: bool,
    pub bidirectional: bool,
    pub halo_width: Option<f64>,
    pub label: Option<String>,
    pub midpoint: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinimapView {
    pub size: f64,
    pub items: Vec<(ItemId, Rect)>,
    pub viewport: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderScene {
    pub transform: ViewTransform,
    /// Paint order, lowest z first.
    pub items: Vec<ItemView>,
    pub connections: Vec<ConnectionView>,
    /// Screen-space marquee while box-selecting.
    pub selection_box: Option<Rect>,
    pub minimap: MinimapView,
}

/// Everything a scene is derived from.
#[derive(Debug, Clone, Copy)]
pub struct SceneInput<'a> {
    pub board: &'a Board,
    pub view: &'a ViewTransform,
    pub viewport: Viewport,
    pub selected: &'a BTreeSet<ItemId>,
    pub selection_box: Option<Rect>,
    pub linking_from: Option<ItemId>,
    pub config: &'a CanvasConfig,
}

pub fn build_scene(input: SceneInput<'_>) -> RenderScene {
    let board = input.board;
    let graph = board.graph();

    let items: Vec<ItemView> = board
        .items()
        .iter()
        .map(|item| ItemView {
            id: item.id,
            kind: item.kind(),
            title: item.title.clone(),
            world: item.bounds(),
            screen: input.view.rect_to_screen(item.bounds()),
            z_index: item.z_index,
            selected: input.selected.contains(&item.id),
            locked: item.locked,
            linking_from: input.linking_from == Some(item.id),
            connected: graph.count_for_item(item.id) > 0,
            scrape: item.content.scrape().map(|s| s.status()),
        })
        .collect();

    let connections: Vec<ConnectionView> = graph
        .iter()
        .filter_map(|c| {
            let from = board.item(c.from)?;
            let to = board.item(c.to)?;
            Some(connection_view(c, from, to, board.items(), input.view.scale))
        })
        .collect();

    let minimap = Minimap::new(input.config.minimap_size, input.config.minimap_world_extent);
    let minimap = MinimapView {
        size: minimap.size,
        items: board.items().iter().map(|i| (i.id, minimap.item_rect(i.bounds()))).collect(),
        viewport: minimap.viewport_rect(input.view, input.viewport),
    };

    log::trace!(
        "scene: {} item(s), {} connection(s) at scale {:.2}",
        items.len(),
        connections.len(),
        input.view.scale
    );
    RenderScene {
        transform: *input.view,
        items,
        connections,
        selection_box: input.selection_box.map(|r| r.abs()),
        minimap,
    }
}

/// Geometry and resolved style for one connection.
pub fn connection_view(c: &Connection, from: &Item, to: &Item, items: &[Item], scale: f64) -> ConnectionView {
    let style = resolve_style(c);
    let (from_side, to_side) = optimal_sides(from.bounds(), to.bounds());
    let (from_offset, to_offset) = spread_offsets(c.id.as_str());
    let start = handle_position(from.bounds(), from_side, from_offset);
    let end = handle_position(to.bounds(), to_side, to_offset);

    let obstacles: Vec<Rect> = items
        .iter()
        .filter(|i| i.id != from.id && i.id != to.id)
        .map(Item::bounds)
        .collect();
    let curve = connection_path(start, end, &obstacles);

    ConnectionView {
        id: c.id,
        from: c.from,
        to: c.to,
        kind: c.kind,
        path: path_to_svg(&curve),
        color: style.color.clone(),
        stroke_width: style.stroke_width / scale,
        dash_array: style.stroke.dash_array(),
        arrow: style.arrow,
        marker_size: (style.stroke_width * 2.0).max(6.0),
        animated: style.animated,
        bidirectional: c.bidirectional,
        halo_width: strength_halo_width(&style, c.strength).map(|w| w / scale),
        label: c.label.clone(),
        midpoint: start.midpoint(end),
    }
}
