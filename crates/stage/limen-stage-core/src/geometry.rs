//! Layout geometry in document space.
//!
//! Rects are measured from the top-left of the document, not the viewport.
//! Viewport-relative positions are derived by subtracting the current scroll
//! offset, which keeps stored layout stable while the page scrolls.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in document coordinates (y grows downward).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width * 0.5
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.y + self.height * 0.5
    }

    /// Total edge length, used to size stroke-dash reveals.
    #[inline]
    pub fn perimeter(&self) -> f32 {
        2.0 * (self.width + self.height)
    }

    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Current window metrics plus vertical scroll offset.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scroll_y: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll_y: 0.0,
        }
    }

    /// Top edge of `rect` relative to the viewport's top edge.
    #[inline]
    pub fn top_of(&self, rect: Rect) -> f32 {
        rect.y - self.scroll_y
    }

    /// Bottom edge of `rect` relative to the viewport's top edge.
    #[inline]
    pub fn bottom_of(&self, rect: Rect) -> f32 {
        rect.bottom() - self.scroll_y
    }

    /// Document-space y of the viewport's vertical midpoint.
    #[inline]
    pub fn center_line(&self) -> f32 {
        self.scroll_y + self.height * 0.5
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_relative_edges_track_scroll() {
        let rect = Rect::new(0.0, 1000.0, 200.0, 100.0);
        let mut vp = Viewport::new(1280.0, 800.0);
        assert_eq!(vp.top_of(rect), 1000.0);
        vp.scroll_y = 600.0;
        assert_eq!(vp.top_of(rect), 400.0);
        assert_eq!(vp.bottom_of(rect), 500.0);
    }

    #[test]
    fn perimeter_matches_rect_edges() {
        let rect = Rect::new(0.0, 0.0, 300.0, 200.0);
        assert_eq!(rect.perimeter(), 1000.0);
    }
}
