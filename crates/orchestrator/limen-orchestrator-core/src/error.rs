//! Error types for the orchestrator.
//!
//! Most runtime misses (an element a page simply does not have) are silent
//! no-ops by policy and never surface here. `LimenError` covers the failures
//! worth reporting: bad selector catalogs, malformed documents, fetch
//! failures, widget trouble.

use serde::{Deserialize, Serialize};

use limen_stage_core::StageError;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LimenError {
    /// A selector string failed to parse.
    #[error("selector `{input}` is invalid: {reason}")]
    Selector { input: String, reason: String },

    /// A stage mutation was rejected.
    #[error("stage error: {reason}")]
    Stage { reason: String },

    /// The stage has no view root to run against.
    #[error("no view root matching `{selector}`")]
    MissingViewRoot { selector: String },

    /// Fetching a document for a transition failed.
    #[error("fetching `{url}` failed: {reason}")]
    Fetch { url: String, reason: String },

    /// The fetched payload was not a page document.
    #[error("`{url}` did not return a document")]
    NotADocument { url: String },

    /// Engine configuration could not be parsed.
    #[error("config error: {reason}")]
    Config { reason: String },

    /// A host widget failed outside the retry path.
    #[error("widget {widget} failed: {reason}")]
    Widget { widget: String, reason: String },
}

impl LimenError {
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_view_root(selector: impl Into<String>) -> Self {
        Self::MissingViewRoot {
            selector: selector.into(),
        }
    }

    /// Coarse grouping for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Selector { .. } | Self::Stage { .. } => "stage",
            Self::MissingViewRoot { .. } | Self::Fetch { .. } | Self::NotADocument { .. } => {
                "transition"
            }
            Self::Config { .. } => "config",
            Self::Widget { .. } => "widget",
        }
    }
}

impl From<StageError> for LimenError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::Selector { input, reason } => Self::Selector { input, reason },
            other => Self::Stage {
                reason: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for LimenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_errors_convert_by_shape() {
        let err: LimenError = StageError::selector(".x[", "unclosed attribute test").into();
        assert!(matches!(err, LimenError::Selector { .. }));
        assert_eq!(err.category(), "stage");

        let err: LimenError = StageError::RootImmutable.into();
        assert!(matches!(err, LimenError::Stage { .. }));
    }

    #[test]
    fn fetch_errors_are_transition_category() {
        let err = LimenError::fetch("/contact", "timeout");
        assert_eq!(err.category(), "transition");
        assert_eq!(err.to_string(), "fetching `/contact` failed: timeout");
    }
}
