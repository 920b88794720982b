//! Pan/zoom camera mapping world space onto the view
//!
//! Zoom scales about the view center, so the world point under the center of
//! an unpanned view stays put while zooming:
//!
//! ```text
//! screen = (world - pan) * zoom + center * (1 - zoom)
//! world  = (screen - center * (1 - zoom)) / zoom + pan
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::rect::Rect;

/// Camera configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// View width in pixels
    pub view_width: f32,
    /// View height in pixels
    pub view_height: f32,
    /// Zoom change per zoom_in/zoom_out
    pub zoom_step: f32,
    /// Smallest zoom factor
    pub min_zoom: f32,
    /// Largest zoom factor
    pub max_zoom: f32,
    /// Pan distance per tick while an arrow key is held, in view pixels
    pub pan_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            view_width: 1000.0,
            view_height: 600.0,
            zoom_step: 0.05,
            min_zoom: 0.2,
            max_zoom: 3.0,
            pan_speed: 15.0,
        }
    }
}

impl CameraConfig {
    /// Set view size
    pub fn with_view_size(mut self, width: f32, height: f32) -> Self {
        self.view_width = width;
        self.view_height = height;
        self
    }

    /// Set zoom range
    pub fn with_zoom_range(mut self, min: f32, max: f32) -> Self {
        self.min_zoom = min;
        self.max_zoom = max;
        self
    }

    /// View size as a vector
    pub fn view_size(&self) -> Vec2 {
        Vec2::new(self.view_width, self.view_height)
    }
}

/// Pan/zoom camera
#[derive(Clone, Debug)]
pub struct Camera {
    config: CameraConfig,
    pan: Vec2,
    zoom: f32,
}

impl Camera {
    /// Create a camera at pan (0, 0) and zoom 1, clamped into range
    pub fn new(config: CameraConfig) -> Self {
        let zoom = 1.0f32.clamp(config.min_zoom, config.max_zoom);
        Self {
            config,
            pan: Vec2::ZERO,
            zoom,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Current zoom factor
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Current pan offset in world units
    pub fn pan_offset(&self) -> Vec2 {
        self.pan
    }

    /// Center of the view in screen pixels
    pub fn view_center(&self) -> Vec2 {
        self.config.view_size() * 0.5
    }

    /// Map a world point to the view
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.pan) * self.zoom + self.view_center() * (1.0 - self.zoom)
    }

    /// Map a view point to the world; exact inverse of [`Self::world_to_screen`]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.view_center() * (1.0 - self.zoom)) / self.zoom + self.pan
    }

    /// Transform a world-space rectangle: the center moves, the extents scale
    pub fn apply_to_bounds(&self, bounds: Rect) -> Rect {
        Rect::from_center_size(self.world_to_screen(bounds.center), bounds.size * self.zoom)
    }

    /// World-space rectangle currently visible in the view
    pub fn visible_world_rect(&self) -> Rect {
        Rect::from_min_max(
            self.screen_to_world(Vec2::ZERO),
            self.screen_to_world(self.config.view_size()),
        )
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.config.zoom_step);
    }

    /// Set zoom, clamped to the configured range
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
    }

    /// Move by a view-space delta. Zoomed-out views pan further per pixel.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pan += Vec2::new(dx, dy) / self.zoom;
    }

    /// Back to pan (0, 0) and zoom 1
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.set_zoom(1.0);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
