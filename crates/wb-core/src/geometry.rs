//! Coordinate spaces and connection geometry.
//!
//! Three spaces are in play:
//!
//! - **World**: the unbounded logical canvas items live in.
//! - **Screen**: viewport pixels, `screen = world * scale + pan`.
//! - **Minimap**: a fixed-size thumbnail of a square world region
//!   centered on the origin.
//!
//! Everything here is pure; callers own the view state.

use crate::layout::Viewport;
use crate::model::Side;
use kurbo::{BezPath, CubicBez, ParamCurve, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

pub fn world_to_screen(point: Point, scale: f64, pan: Vec2) -> Point {
    Point::new(point.x * scale + pan.x, point.y * scale + pan.y)
}

pub fn screen_to_world(point: Point, scale: f64, pan: Vec2) -> Point {
    Point::new((point.x - pan.x) / scale, (point.y - pan.y) / scale)
}

// ─── View transform ──────────────────────────────────────────────────────

/// Scale and pan defining the world → screen affine map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f64,
    /// Pan offset in screen pixels.
    pub pan: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    pub fn new(scale: f64, pan: Vec2) -> Self {
        Self { scale, pan }
    }

    pub fn to_screen(&self, world: Point) -> Point {
        world_to_screen(world, self.scale, self.pan)
    }

    pub fn to_world(&self, screen: Point) -> Point {
        screen_to_world(screen, self.scale, self.pan)
    }

    pub fn rect_to_screen(&self, world: Rect) -> Rect {
        Rect::from_points(self.to_screen(world.origin()), self.to_screen(Point::new(world.x1, world.y1)))
    }

    pub fn rect_to_world(&self, screen: Rect) -> Rect {
        Rect::from_points(self.to_world(Point::new(screen.x0, screen.y0)), self.to_world(Point::new(screen.x1, screen.y1)))
    }

    /// Zoom to `scale` (clamped to `[min, max]`) keeping the world point
    /// under `cursor` fixed on screen. A non-finite `scale` leaves the
    /// view unchanged.
    pub fn zoom_at(&self, cursor: Point, scale: f64, min: f64, max: f64) -> Self {
        if !scale.is_finite() {
            log::debug!("ignoring non-finite zoom scale {scale}");
            return *self;
        }
        let anchor = self.to_world(cursor);
        let scale = scale.clamp(min, max);
        let pan = Vec2::new(cursor.x - anchor.x * scale, cursor.y - anchor.y * scale);
        Self { scale, pan }
    }

    /// World-space rectangle currently visible in the viewport.
    pub fn visible_world(&self, viewport: Viewport) -> Rect {
        self.rect_to_world(Rect::from_origin_size(Point::ZERO, viewport.size()))
    }
}

// ─── Handles & sides ─────────────────────────────────────────────────────

pub const MIN_HANDLE_OFFSET: f64 = 0.1;
pub const MAX_HANDLE_OFFSET: f64 = 0.9;

/// Point on `bounds` at `side`, `offset` of the way along it.
///
/// The offset is clamped to `[0.1, 0.9]` so handles never sit on a corner.
pub fn handle_position(bounds: Rect, side: Side, offset: f64) -> Point {
    let t = if offset.is_nan() {
        0.5
    } else {
        offset.clamp(MIN_HANDLE_OFFSET, MAX_HANDLE_OFFSET)
    };
    match side {
        Side::Left => Point::new(bounds.x0, bounds.y0 + bounds.height() * t),
        Side::Right => Point::new(bounds.x1, bounds.y0 + bounds.height() * t),
        Side::Top => Point::new(bounds.x0 + bounds.width() * t, bounds.y0),
        Side::Bottom => Point::new(bounds.x0 + bounds.width() * t, bounds.y1),
    }
}

/// Facing sides for a connection between two boxes, chosen by the dominant
/// axis of center separation. Ties go vertical.
pub fn optimal_sides(from: Rect, to: Rect) -> (Side, Side) {
    let d = to.center() - from.center();
    if d.x.abs() > d.y.abs() {
        if d.x > 0.0 {
            (Side::Right, Side::Left)
        } else {
            (Side::Left, Side::Right)
        }
    } else if d.y > 0.0 {
        (Side::Bottom, Side::Top)
    } else {
        (Side::Top, Side::Bottom)
    }
}

/// Deterministic handle offsets for a connection id, spreading parallel
/// connections ±10% around the side midpoints.
pub fn spread_offsets(connection_id: &str) -> (f64, f64) {
    let hash = connection_id
        .encode_utf16()
        .fold(0i32, |a, c| a.wrapping_shl(5).wrapping_sub(a).wrapping_add(i32::from(c)));
    let spread = f64::from((hash % 100).abs()) / 100.0;
    const VARIATION: f64 = 0.2;
    (
        0.5 + (spread - 0.5) * VARIATION,
        0.5 + ((1.0 - spread) - 0.5) * VARIATION,
    )
}

// ─── Connection paths ────────────────────────────────────────────────────

/// Floor for control-point offsets so short links still curve.
const MIN_CONTROL_OFFSET: f64 = 80.0;
/// Axis span below which that axis's offset is damped.
const SHORT_SPAN: f64 = 100.0;
const SAMPLES: usize = 24;

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Smooth cubic between two points.
///
/// Control offsets grow with distance and lean along the direction of
/// travel. When the curve runs through an `obstacle`, bent alternatives are
/// tried and the one crossing the fewest obstacles wins; the result may
/// still cross one.
pub fn connection_path(from: Point, to: Point, obstacles: &[Rect]) -> CubicBez {
    let d = to - from;
    let distance = d.hypot();
    let base = (distance * 0.25).max(MIN_CONTROL_OFFSET);
    let horizontal = if d.x.abs() > SHORT_SPAN { base } else { base * 0.7 };
    let vertical = if d.y.abs() > SHORT_SPAN { base } else { base * 0.7 };

    let lead = Vec2::new(sign(d.x) * horizontal * 0.6, sign(d.y) * vertical * 0.3);
    let direct = CubicBez::new(from, from + lead, to - lead, to);

    let blocking: Vec<Rect> = obstacles
        .iter()
        .copied()
        .filter(|r| !contains_inclusive(*r, from) && !contains_inclusive(*r, to))
        .collect();
    if blocking.is_empty() || distance == 0.0 {
        return direct;
    }

    let mut best = direct;
    let mut best_hits = crossings(&direct, &blocking);
    if best_hits == 0 {
        return direct;
    }

    let normal = Vec2::new(-d.y, d.x) / distance;
    for k in [1.0, -1.0, 2.0, -2.0, 3.0, -3.0] {
        let bend = normal * base * k;
        let candidate = CubicBez::new(from, from + lead + bend, to - lead + bend, to);
        let hits = crossings(&candidate, &blocking);
        if hits < best_hits {
            best = candidate;
            best_hits = hits;
            if hits == 0 {
                break;
            }
        }
    }
    log::trace!("routed connection around obstacles, {best_hits} crossing(s) left");
    best
}

fn contains_inclusive(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

/// Number of obstacles any interior sample of `curve` falls inside.
fn crossings(curve: &CubicBez, obstacles: &[Rect]) -> usize {
    obstacles
        .iter()
        .filter(|r| {
            (1..SAMPLES).any(|i| {
                let t = i as f64 / SAMPLES as f64;
                contains_inclusive(**r, curve.eval(t))
            })
        })
        .count()
}

/// SVG path data (`M… C…`) for a connection curve.
pub fn path_to_svg(curve: &CubicBez) -> String {
    let mut path = BezPath::new();
    path.move_to(curve.p0);
    path.curve_to(curve.p1, curve.p2, curve.p3);
    path.to_svg()
}

// ─── Minimap ─────────────────────────────────────────────────────────────

/// Smallest side a minimap item rectangle is drawn with.
const MIN_MINIMAP_ITEM: f64 = 2.0;

/// Mapping between world space and a square minimap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Minimap {
    /// Minimap side in pixels.
    pub size: f64,
    /// Side of the world square shown, centered on the origin.
    pub world_extent: f64,
}

impl Minimap {
    pub fn new(size: f64, world_extent: f64) -> Self {
        Self { size, world_extent }
    }

    pub fn ratio(&self) -> f64 {
        self.size / self.world_extent
    }

    pub fn world_to_minimap(&self, world: Point) -> Point {
        let half = self.world_extent / 2.0;
        Point::new((world.x + half) * self.ratio(), (world.y + half) * self.ratio())
    }

    pub fn minimap_to_world(&self, minimap: Point) -> Point {
        let half = self.world_extent / 2.0;
        Point::new(minimap.x / self.ratio() - half, minimap.y / self.ratio() - half)
    }

    /// Minimap rectangle for an item's world bounds.
    pub fn item_rect(&self, world: Rect) -> Rect {
        let origin = self.world_to_minimap(world.origin());
        let size = Size::new(
            (world.width() * self.ratio()).max(MIN_MINIMAP_ITEM),
            (world.height() * self.ratio()).max(MIN_MINIMAP_ITEM),
        );
        Rect::from_origin_size(origin, size)
    }

    /// Minimap rectangle of the region the viewport currently shows.
    pub fn viewport_rect(&self, view: &ViewTransform, viewport: Viewport) -> Rect {
        let visible = view.visible_world(viewport);
        Rect::from_points(
            self.world_to_minimap(visible.origin()),
            self.world_to_minimap(Point::new(visible.x1, visible.y1)),
        )
    }

    /// Pan offset that centers the viewport on the world point under
    /// `minimap` at the current scale.
    pub fn pan_for(&self, minimap: Point, scale: f64, viewport: Viewport) -> Vec2 {
        let world = self.minimap_to_world(minimap);
        Vec2::new(
            -world.x * scale + viewport.width / 2.0,
            -world.y * scale + viewport.height / 2.0,
        )
    }
}
