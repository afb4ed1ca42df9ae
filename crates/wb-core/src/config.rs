//! Canvas tuning knobs.
//!
//! Every field has a default matching the stock whiteboard, so hosts only
//! need to supply what they change: `{"history_capacity": 100}` is a
//! complete config.

use kurbo::Size;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Additive step used by the zoom in/out buttons and shortcuts.
    pub zoom_step: f64,
    /// Wheel delta (pixels) that scales by a factor of e.
    pub wheel_sensitivity: f64,
    pub history_capacity: usize,
    /// Width of a freshly placed window; also the grid column pitch.
    pub window_width: f64,
    pub window_height: f64,
    pub grid_gutter: f64,
    pub min_item_size: Size,
    /// Offset applied to duplicated and pasted items.
    pub cascade_offset: f64,
    pub minimap_size: f64,
    /// Side of the square world region the minimap shows, centered on the origin.
    pub minimap_world_extent: f64,
    pub stats_top_n: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 3.0,
            zoom_step: 0.1,
            wheel_sensitivity: 500.0,
            history_capacity: 50,
            window_width: 480.0,
            window_height: 360.0,
            grid_gutter: 20.0,
            min_item_size: Size::new(300.0, 200.0),
            cascade_offset: 20.0,
            minimap_size: 200.0,
            minimap_world_extent: 10_000.0,
            stats_top_n: 5,
        }
    }
}

impl CanvasConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        if config.min_scale > config.max_scale {
            log::warn!(
                "min_scale {} exceeds max_scale {}; swapping",
                config.min_scale,
                config.max_scale
            );
            std::mem::swap(&mut config.min_scale, &mut config.max_scale);
        }
        config.history_capacity = config.history_capacity.max(1);
        Ok(config)
    }

    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}
