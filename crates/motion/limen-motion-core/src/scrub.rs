//! Scroll-linked progress.
//!
//! A scrub binding maps the scroll offset to a timeline progress; a toggle
//! binding plays forward past a threshold and reverses back below it. The
//! caller owns the loop that feeds these, so the math here stays pure.

use limen_stage_core::{Rect, Viewport};
use serde::{Deserialize, Serialize};

use crate::ids::TimelineId;

/// How scroll position maps onto 0..1 progress.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScrubRange {
    /// Progress is `scroll_y / distance`. Used for effects anchored to the
    /// top of the page, like the navbar backdrop.
    FromTop { distance: f32 },
    /// Progress runs while the trigger travels through the viewport: 0 when
    /// its top touches the bottom edge, 1 when its bottom leaves the top.
    ThroughViewport,
}

impl ScrubRange {
    pub fn progress(&self, trigger: Rect, vp: Viewport) -> f32 {
        match self {
            ScrubRange::FromTop { distance } => {
                if *distance <= 0.0 {
                    1.0
                } else {
                    (vp.scroll_y / distance).clamp(0.0, 1.0)
                }
            }
            ScrubRange::ThroughViewport => {
                let span = vp.height + trigger.height;
                if span <= 0.0 {
                    return 0.0;
                }
                ((vp.scroll_y + vp.height - trigger.y) / span).clamp(0.0, 1.0)
            }
        }
    }
}

/// Timeline progress follows scroll position directly.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct ScrubBinding {
    pub timeline: TimelineId,
    pub trigger: limen_stage_core::NodeId,
    pub range: ScrubRange,
}

/// Play past a scroll threshold, reverse when scrolling back above it.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct ToggleBinding {
    pub timeline: TimelineId,
    pub threshold: f32,
    engaged: bool,
}

impl ToggleBinding {
    pub fn new(timeline: TimelineId, threshold: f32) -> Self {
        Self {
            timeline,
            threshold,
            engaged: false,
        }
    }

    /// Returns `Some(true)` to play, `Some(false)` to reverse, `None` when
    /// the threshold was not crossed.
    pub fn update(&mut self, scroll_y: f32) -> Option<bool> {
        let below = scroll_y >= self.threshold;
        if below == self.engaged {
            return None;
        }
        self.engaged = below;
        Some(below)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn from_top_tracks_scroll_linearly() {
        let range = ScrubRange::FromTop { distance: 400.0 };
        let mut vp = Viewport::new(1280.0, 800.0);
        assert_eq!(range.progress(Rect::ZERO, vp), 0.0);
        vp.scroll_y = 200.0;
        assert_abs_diff_eq!(range.progress(Rect::ZERO, vp), 0.5);
        vp.scroll_y = 1000.0;
        assert_eq!(range.progress(Rect::ZERO, vp), 1.0);
    }

    #[test]
    fn through_viewport_spans_entry_to_exit() {
        let range = ScrubRange::ThroughViewport;
        let trigger = Rect::new(0.0, 2000.0, 600.0, 200.0);
        let mut vp = Viewport::new(1280.0, 800.0);

        // Trigger top exactly at the viewport bottom.
        vp.scroll_y = 1200.0;
        assert_abs_diff_eq!(range.progress(trigger, vp), 0.0);
        // Trigger bottom exactly at the viewport top.
        vp.scroll_y = 2200.0;
        assert_abs_diff_eq!(range.progress(trigger, vp), 1.0);
        // Halfway through the travel.
        vp.scroll_y = 1700.0;
        assert_abs_diff_eq!(range.progress(trigger, vp), 0.5);
    }

    #[test]
    fn toggle_fires_only_on_crossings() {
        let mut toggle = ToggleBinding::new(TimelineId(0), 400.0);
        assert_eq!(toggle.update(0.0), None);
        assert_eq!(toggle.update(399.9), None);
        assert_eq!(toggle.update(400.0), Some(true));
        assert_eq!(toggle.update(700.0), None);
        assert_eq!(toggle.update(100.0), Some(false));
        assert_eq!(toggle.update(50.0), None);
    }
}
