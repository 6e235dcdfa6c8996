//! Page-transition coordination types.
//!
//! The coordinator itself runs inside the engine; this module carries the
//! phase machine's vocabulary and the path normalization every navigation
//! request goes through first.

use serde::{Deserialize, Serialize};

use limen_motion_core::TimelineId;

/// Where the coordinator stands. One transition runs at a time; a navigate
/// arriving in any non-idle phase is ignored.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum TransitionPhase {
    #[default]
    Idle,
    /// Outgoing view fading to transparent, scrolling already stopped.
    FadingOut,
    /// Fetched document spliced in, page identity applied, scroll at top.
    ContentSwapped,
    /// Host runtime rebinding, reveals rebuilding, route widgets loading.
    Reinitializing,
    /// Incoming view fading back to opaque.
    FadingIn,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::Idle => "idle",
            TransitionPhase::FadingOut => "fading-out",
            TransitionPhase::ContentSwapped => "content-swapped",
            TransitionPhase::Reinitializing => "reinitializing",
            TransitionPhase::FadingIn => "fading-in",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, TransitionPhase::Idle)
    }
}

impl std::fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookkeeping for the navigation currently in flight.
#[derive(Clone, Debug)]
pub struct TransitionSession {
    pub to: String,
    /// The container fade running for the current phase, when one is.
    pub fade: Option<TimelineId>,
}

impl TransitionSession {
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            fade: None,
        }
    }
}

/// Same-site path normalization. Queries and fragments are dropped, link
/// hrefs may carry an origin, trailing slashes collapse, and the result
/// always starts with `/`.
pub fn normalize_path(raw: &str) -> String {
    let mut path = raw
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or("")
        .trim();
    for scheme in ["http://", "https://"] {
        if let Some(rest) = path.strip_prefix(scheme) {
            path = match rest.find('/') {
                Some(i) => &rest[i..],
                None => "/",
            };
        }
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_normalize_to_rooted_slashless_form() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/about/"), "/about");
        assert_eq!(normalize_path("about"), "/about");
        assert_eq!(normalize_path("/portfolio?filter=web#top"), "/portfolio");
        assert_eq!(normalize_path("https://studio.example/work/"), "/work");
        assert_eq!(normalize_path("https://studio.example"), "/");
        assert_eq!(normalize_path("/blog//"), "/blog");
    }

    #[test]
    fn phase_names_are_stable() {
        assert_eq!(TransitionPhase::Idle.as_str(), "idle");
        assert_eq!(TransitionPhase::FadingOut.as_str(), "fading-out");
        assert_eq!(TransitionPhase::ContentSwapped.to_string(), "content-swapped");
        assert!(TransitionPhase::default().is_idle());
        assert!(!TransitionPhase::FadingIn.is_idle());
    }
}
