//! Integration tests: coordinate transforms across the board.
//!
//! Sweeps scales and pans rather than checking single points, and ties the
//! minimap, zoom and placement math back to the screen transform.

use wb_core::geometry::{connection_path, handle_position, optimal_sides, spread_offsets};
use wb_core::{CanvasConfig, Minimap, Point, Rect, Side, Vec2, ViewTransform, Viewport, screen_to_world, world_to_screen};

const VIEWPORT: Viewport = Viewport {
    width: 1280.0,
    height: 720.0,
};

fn scales() -> impl Iterator<Item = f64> {
    (1..=30).map(|i| f64::from(i) / 10.0)
}

fn pans() -> Vec<Vec2> {
    vec![
        Vec2::ZERO,
        Vec2::new(640.0, 360.0),
        Vec2::new(-10_000.0, 2_500.5),
        Vec2::new(0.125, -0.5),
    ]
}

fn points() -> Vec<Point> {
    vec![
        Point::ZERO,
        Point::new(480.0, 360.0),
        Point::new(-4_999.0, 4_999.0),
        Point::new(123.456, -789.012),
    ]
}

// ─── Round trip ──────────────────────────────────────────────────────────

#[test]
fn screen_world_roundtrip_over_grid() {
    for scale in scales() {
        for pan in pans() {
            for p in points() {
                let back = screen_to_world(world_to_screen(p, scale, pan), scale, pan);
                let tol = 1e-9 * p.x.abs().max(p.y.abs()).max(1.0) * (1.0 + pan.hypot());
                assert!((back - p).hypot() <= tol, "scale {scale} pan {pan:?}: {p:?} -> {back:?}");
            }
        }
    }
}

// ─── Zoom ────────────────────────────────────────────────────────────────

#[test]
fn zoom_to_cursor_fixes_world_point() {
    let config = CanvasConfig::default();
    for start in scales() {
        for pan in pans() {
            let view = ViewTransform::new(start, pan);
            let cursor = Point::new(917.0, 133.0);
            let anchor = view.to_world(cursor);
            for target in [0.01, 0.1, 0.55, 1.0, 2.9, 3.0, 12.0] {
                let zoomed = view.zoom_at(cursor, target, config.min_scale, config.max_scale);
                assert!((config.min_scale..=config.max_scale).contains(&zoomed.scale));
                let moved = zoomed.to_world(cursor);
                assert!((moved - anchor).hypot() < 1e-6, "start {start} target {target}");
            }
        }
    }
}

// ─── Minimap ─────────────────────────────────────────────────────────────

#[test]
fn minimap_click_centers_viewport_on_world_point() {
    let config = CanvasConfig::default();
    let map = Minimap::new(config.minimap_size, config.minimap_world_extent);
    for scale in [0.25, 1.0, 2.5] {
        for click in [Point::new(0.0, 0.0), Point::new(100.0, 100.0), Point::new(37.5, 180.0)] {
            let pan = map.pan_for(click, scale, VIEWPORT);
            let view = ViewTransform::new(scale, pan);
            let centered = view.to_world(VIEWPORT.center());
            let expected = map.minimap_to_world(click);
            assert!((centered - expected).hypot() < 1e-6);
        }
    }
}

#[test]
fn minimap_viewport_indicator_tracks_scale() {
    let map = Minimap::new(200.0, 10_000.0);
    let unit = map.viewport_rect(&ViewTransform::default(), VIEWPORT);
    let zoomed = map.viewport_rect(&ViewTransform::new(2.0, Vec2::ZERO), VIEWPORT);
    assert!((unit.width() - 1280.0 * 0.02).abs() < 1e-9);
    assert!((zoomed.width() - unit.width() / 2.0).abs() < 1e-9);
    assert_eq!(unit.origin(), Point::new(100.0, 100.0));
}

// ─── Handles & routing ───────────────────────────────────────────────────

#[test]
fn optimal_handles_face_each_other() {
    let a = Rect::new(0.0, 0.0, 480.0, 360.0);
    let b = Rect::new(1000.0, 100.0, 1480.0, 460.0);
    let (from_side, to_side) = optimal_sides(a, b);
    assert_eq!((from_side, to_side), (Side::Right, Side::Left));

    let (from_offset, to_offset) = spread_offsets("conn_42");
    let start = handle_position(a, from_side, from_offset);
    let end = handle_position(b, to_side, to_offset);
    assert_eq!(start.x, 480.0);
    assert_eq!(end.x, 1000.0);

    let curve = connection_path(start, end, &[]);
    assert!(curve.p1.x > start.x, "first control point leans toward the target");
    assert!(curve.p2.x < end.x, "second control point leans back from the target");
}
