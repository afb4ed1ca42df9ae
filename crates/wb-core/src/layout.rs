use crate::config::CanvasConfig;
use crate::geometry::ViewTransform;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Screen dimensions of the canvas element, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// World point under the viewport center.
    pub fn world_center(&self, view: &ViewTransform) -> Point {
        view.to_world(self.center())
    }
}

/// Row-major grid placement for new windows.
///
/// The cursor persists across calls so consecutive additions continue the
/// grid. A column index at or past the number of columns that fit the
/// viewport wraps to a new row centered on the current view. Once the view
/// has moved more than a screen away and the cursor is off-screen, the grid
/// restarts around the new view center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GridPlacer {
    /// Where the next window goes, before wrapping.
    pub cursor: Point,
    /// World point at the viewport center when the last window was placed.
    #[serde(default)]
    pub anchor: Option<Point>,
}

impl GridPlacer {
    pub fn next_position(&mut self, view: &ViewTransform, viewport: Viewport, config: &CanvasConfig) -> Point {
        let pitch = config.window_width + config.grid_gutter;
        let center = viewport.world_center(view);
        let columns = (viewport.width / pitch).floor().max(1.0);
        let reach = viewport.width.max(viewport.height) / view.scale;
        let moved_away = self.anchor.is_some_and(|anchor| (anchor - center).hypot() > reach);
        if moved_away && !view.visible_world(viewport).contains(self.cursor) {
            self.cursor = Point::new(center.x - columns * pitch / 2.0, center.y - config.window_height / 2.0);
            log::trace!("grid restarted near the view at {:?}", self.cursor);
        }
        self.anchor = Some(center);

        let column = ((self.cursor.x - center.x + config.window_width / 2.0) / pitch).floor();

        if column >= columns {
            self.cursor.x = center.x - columns * pitch / 2.0;
            self.cursor.y += config.window_height + config.grid_gutter;
            log::trace!("grid wrapped to row at y={}", self.cursor.y);
        }

        let position = self.cursor;
        self.cursor.x += pitch;
        position
    }
}
