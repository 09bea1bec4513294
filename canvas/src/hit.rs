//! Edge hit-testing for shape resize.
//!
//! A shape resize grabs whichever side(s) of the on-screen bounding box the
//! pointer is closest to. A side counts when the pointer is within the
//! threshold of it; two sides make a corner. When no side is within the
//! threshold the single nearest side is used.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Point, Rect};

/// Horizontal side of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HSide {
    Left,
    Right,
}

/// Vertical side of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VSide {
    Top,
    Bottom,
}

/// The edge, or corner when both are set, being dragged. At least one side is always set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeHandle {
    pub horizontal: Option<HSide>,
    pub vertical: Option<VSide>,
}

impl ResizeHandle {
    /// Pick the handle for a pointer at `p` over `rect`, all in screen pixels.
    #[must_use]
    pub fn nearest(rect: &Rect, p: Point, threshold: f64) -> Self {
        let d_left = (p.x - rect.left).abs();
        let d_right = (p.x - rect.right()).abs();
        let d_top = (p.y - rect.top).abs();
        let d_bottom = (p.y - rect.bottom()).abs();

        let (h_side, h_dist) = if d_left <= d_right { (HSide::Left, d_left) } else { (HSide::Right, d_right) };
        let (v_side, v_dist) = if d_top <= d_bottom { (VSide::Top, d_top) } else { (VSide::Bottom, d_bottom) };

        let horizontal = (h_dist <= threshold).then_some(h_side);
        let vertical = (v_dist <= threshold).then_some(v_side);

        if horizontal.is_none() && vertical.is_none() {
            if h_dist <= v_dist {
                return Self { horizontal: Some(h_side), vertical: None };
            }
            return Self { horizontal: None, vertical: Some(v_side) };
        }
        Self { horizontal, vertical }
    }
}

impl HSide {
    /// +1 when dragging right grows the box, -1 when it shrinks it.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

impl VSide {
    /// +1 when dragging down grows the box, -1 when it shrinks it.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::Top => -1.0,
            Self::Bottom => 1.0,
        }
    }
}
