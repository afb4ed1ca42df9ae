//! Hit testing: world point → item and the part of it under the pointer.
//!
//! Items are walked back to front (last painted = topmost). Connection
//! handles straddle the left and right edges, so they are checked before
//! the bounding box.

use wb_core::model::{Item, Side};
use wb_core::{ItemId, Point, Rect, Vec2};

/// Height of the window title bar, the drag handle.
pub const TITLE_BAR_HEIGHT: f64 = 44.0;
/// Side of the square resize grip in the bottom-right corner.
pub const RESIZE_HANDLE_SIZE: f64 = 16.0;
pub const CONNECTION_HANDLE_RADIUS: f64 = 8.0;

/// Region of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemPart {
    TitleBar,
    Body,
    ResizeHandle,
    ConnectionHandle(Side),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: ItemId,
    pub part: ItemPart,
}

/// Center of the connection handle on `side`.
pub fn connection_handle_center(item: &Item, side: Side) -> Point {
    let b = item.bounds();
    match side {
        Side::Left => Point::new(b.x0, b.center().y),
        Side::Right => Point::new(b.x1, b.center().y),
        Side::Top => Point::new(b.center().x, b.y0),
        Side::Bottom => Point::new(b.center().x, b.y1),
    }
}

/// Which part of `item` is under `world`, if any.
pub fn classify(item: &Item, world: Point) -> Option<ItemPart> {
    for side in [Side::Left, Side::Right] {
        if (world - connection_handle_center(item, side)).hypot() <= CONNECTION_HANDLE_RADIUS {
            return Some(ItemPart::ConnectionHandle(side));
        }
    }

    let b = item.bounds();
    if !contains(b, world) {
        return None;
    }
    let grip = Rect::from_points(
        Point::new(b.x1, b.y1) - Vec2::new(RESIZE_HANDLE_SIZE, RESIZE_HANDLE_SIZE),
        Point::new(b.x1, b.y1),
    );
    if contains(grip, world) {
        return Some(ItemPart::ResizeHandle);
    }
    if world.y <= b.y0 + TITLE_BAR_HEIGHT {
        return Some(ItemPart::TitleBar);
    }
    Some(ItemPart::Body)
}

/// Topmost item part at `world`. `items` must be in paint order.
pub fn hit_test(items: &[Item], world: Point) -> Option<Hit> {
    items
        .iter()
        .rev()
        .find_map(|item| classify(item, world).map(|part| Hit { id: item.id, part }))
}

/// Every item whose bounds intersect `rect`; touching edges count.
pub fn hit_test_rect(items: &[Item], rect: Rect) -> Vec<ItemId> {
    let r = rect.abs();
    items
        .iter()
        .filter(|item| {
            let b = item.bounds();
            !(b.x1 < r.x0 || b.x0 > r.x1 || b.y1 < r.y0 || b.y0 > r.y1)
        })
        .map(|item| item.id)
        .collect()
}

fn contains(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}
