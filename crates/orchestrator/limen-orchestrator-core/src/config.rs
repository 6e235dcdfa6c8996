//! Engine tuning knobs.

use serde::{Deserialize, Serialize};

use crate::error::LimenError;

/// Numeric configuration for the orchestrator. Defaults reproduce the
/// shipped site behavior; hosts override individual fields via JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fraction of the viewport height an element's top edge must reach
    /// before its reveal plays (boundary inclusive).
    pub reveal_fraction: f32,
    /// Scroll offset in px past which the navbar collapses the logo and the
    /// backdrop blur finishes.
    pub navbar_scroll_range: f32,
    /// Arrow-key scroll step in px.
    pub keyboard_scroll_px: f32,
    /// Arrow-key scroll duration in seconds.
    pub keyboard_scroll_duration: f32,
    /// Exponent of the `1 - (1 - t)^k` ease used for keyboard scrolling.
    pub keyboard_scroll_power: f32,
    /// Seek step for video arrow keys, seconds.
    pub video_seek_step: f32,
    /// Debounce applied to resize input before layout-dependent state is
    /// refreshed, seconds.
    pub resize_debounce: f32,
    /// Debounce applied to CMS filter re-renders before layout refresh,
    /// seconds.
    pub filter_refresh_delay: f32,
    /// Widget init retry attempts before giving up.
    pub widget_retry_attempts: u32,
    /// Delay between widget init retries, seconds.
    pub widget_retry_delay: f32,
    /// Minimum viewport width for hover choreography.
    pub hover_min_width: f32,
    /// View-root fade duration for page transitions, seconds.
    pub fade_duration: f32,
    /// Estimated glyph advance the default line splitter divides widths by.
    pub split_char_px: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reveal_fraction: 0.9,
            navbar_scroll_range: 400.0,
            keyboard_scroll_px: 300.0,
            keyboard_scroll_duration: 1.0,
            keyboard_scroll_power: 2.5,
            video_seek_step: 5.0,
            resize_debounce: 0.2,
            filter_refresh_delay: 0.5,
            widget_retry_attempts: 10,
            widget_retry_delay: 0.5,
            hover_min_width: 1281.0,
            fade_duration: 0.5,
            split_char_px: 9.6,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, LimenError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json_fills_missing_fields_with_defaults() {
        let cfg = EngineConfig::from_json(r#"{ "reveal_fraction": 0.8 }"#).unwrap();
        assert_eq!(cfg.reveal_fraction, 0.8);
        assert_eq!(cfg.widget_retry_attempts, 10);
        assert_eq!(cfg.navbar_scroll_range, 400.0);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = EngineConfig::from_json("{ nope").unwrap_err();
        assert_eq!(err.category(), "config");
    }
}
