//! Coordinate mapping between canvas space and screen space.
//!
//! Zoom scales about the centre of the visible viewport: a canvas point at the
//! viewport centre stays put, everything else moves away from (or towards) it
//! by the zoom factor. Object `x`/`y` are centre coordinates, so an object's
//! on-screen box is derived from its centre and scaled dimensions.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_ZOOM_PERCENT;

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned screen-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Zoom state plus the viewport it is applied to.
///
/// `zoom` is a scale factor (1.0 = no zoom), i.e. the zoom percentage / 100.
/// `width` / `height` are the viewport size in CSS pixels.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { zoom: 1.0, width: 0.0, height: 0.0 }
    }
}

impl Camera {
    /// Build a camera from a zoom percentage (`100` = 1:1) and viewport size.
    #[must_use]
    pub fn from_percent(zoom_percent: f64, width: f64, height: f64) -> Self {
        Self { zoom: zoom_factor(zoom_percent), width, height }
    }

    fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Convert a screen-space point (CSS pixels) to canvas coordinates.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        let c = self.center();
        Point {
            x: c.x + (screen.x - c.x) / self.zoom,
            y: c.y + (screen.y - c.y) / self.zoom,
        }
    }

    /// Convert a canvas-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        let c = self.center();
        Point {
            x: c.x + (canvas.x - c.x) * self.zoom,
            y: c.y + (canvas.y - c.y) * self.zoom,
        }
    }

    /// Convert a screen-space distance (pixels) to a canvas-space distance.
    #[must_use]
    pub fn screen_dist_to_canvas(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Convert a canvas-space distance to a screen-space distance (pixels).
    #[must_use]
    pub fn canvas_dist_to_screen(&self, canvas_dist: f64) -> f64 {
        canvas_dist * self.zoom
    }

    /// On-screen box of an object centred at `(x, y)` with the given canvas size.
    #[must_use]
    pub fn object_screen_rect(&self, x: f64, y: f64, width: f64, height: f64) -> Rect {
        let center = self.canvas_to_screen(Point::new(x, y));
        let w = self.canvas_dist_to_screen(width);
        let h = self.canvas_dist_to_screen(height);
        Rect { left: center.x - w / 2.0, top: center.y - h / 2.0, width: w, height: h }
    }
}

/// Convert a zoom percentage into a scale factor.
#[must_use]
pub fn zoom_factor(zoom_percent: f64) -> f64 {
    zoom_percent / DEFAULT_ZOOM_PERCENT
}

/// Angle in degrees of the ray from `center` to `p`, measured from +x towards +y.
#[must_use]
pub fn angle_deg(center: Point, p: Point) -> f64 {
    (p.y - center.y).atan2(p.x - center.x).to_degrees()
}
