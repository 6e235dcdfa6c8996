//! Host capability seam.
//!
//! Everything the engine cannot do by itself (fetching documents, injecting
//! and initializing third-party widgets, driving an embedded video player)
//! is reached through these traits. Hosts implement them against the real
//! platform; tests implement them with scripted doubles. The engine never
//! assumes success: a host that lacks a capability returns `None`/`Err` and
//! the engine degrades to a no-op.

use serde::{Deserialize, Serialize};

use limen_stage_core::Stage;

use crate::split::LineSplitter;

/// A page document produced by a fetch, already mirrored into a stage by the
/// host. The root node's rect height is the full page height.
#[derive(Clone, Debug)]
pub struct FetchedDocument {
    /// Page identity attribute value (applied to the stage root on swap).
    pub page_id: String,
    pub stage: Stage,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("payload is not a document")]
    NotADocument,
}

/// Fetches the document behind a same-site path.
pub trait DocumentFetcher {
    fn fetch(&mut self, path: &str) -> Result<FetchedDocument, FetchError>;
}

/// Externally loaded widgets the engine knows how to schedule.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Widget {
    /// CMS list filtering. Self-initializing once injected.
    CmsFilter,
    /// Inline scheduling embed. Needs an init call once its script is ready.
    Scheduler,
}

impl Widget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Widget::CmsFilter => "cms-filter",
            Widget::Scheduler => "scheduler",
        }
    }

    /// Id the load registry tracks injections under.
    pub fn script_id(&self) -> &'static str {
        match self {
            Widget::CmsFilter => "fs-cmsfilter",
            Widget::Scheduler => "scheduler-widget",
        }
    }

    /// Whether the widget needs an explicit init call after injection.
    pub fn needs_init(&self) -> bool {
        matches!(self, Widget::Scheduler)
    }
}

impl std::fmt::Display for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which embedded player backs a video overlay. Carried as an explicit tag
/// on the click block so the engine never sniffs capabilities.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PlayerKind {
    YouTube,
    Vimeo,
}

impl PlayerKind {
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "youtube" => Some(PlayerKind::YouTube),
            "vimeo" => Some(PlayerKind::Vimeo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerKind::YouTube => "youtube",
            PlayerKind::Vimeo => "vimeo",
        }
    }
}

/// An embedded player instance. Controls are only forwarded once
/// [`is_ready`](VideoPlayer::is_ready) reports true; before that the engine
/// leaves the player alone.
pub trait VideoPlayer {
    fn kind(&self) -> PlayerKind;
    fn is_ready(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
    fn current_time(&self) -> Option<f32>;
    fn duration(&self) -> Option<f32>;
    fn seek_to(&mut self, seconds: f32);
    fn destroy(&mut self);
}

/// Host-side widget and player services.
pub trait WidgetHost {
    /// Inject a widget's script tag. Called at most once per process per
    /// widget; the engine's load registry enforces that.
    fn inject_script(&mut self, widget: Widget);

    /// Whether the widget's runtime is ready to initialize.
    fn widget_ready(&self, widget: Widget) -> bool;

    /// Initialize the widget on the current page. Only called when
    /// [`widget_ready`](Self::widget_ready) reported true.
    fn init_widget(&mut self, widget: Widget);

    /// Tear down and rebuild the host's interactive runtime bindings for a
    /// freshly swapped page. Returning is the ready signal.
    fn rebind(&mut self, page_id: &str);

    /// Create a player inside the overlay container. `None` when the host
    /// has no player capability for `kind`.
    fn create_player(&mut self, kind: PlayerKind, url: &str) -> Option<Box<dyn VideoPlayer>>;
}

/// Capabilities handed to the engine at construction.
pub struct HostBundle {
    pub fetcher: Box<dyn DocumentFetcher>,
    pub widgets: Box<dyn WidgetHost>,
    pub splitter: Box<dyn LineSplitter>,
}

impl HostBundle {
    pub fn new(fetcher: Box<dyn DocumentFetcher>, widgets: Box<dyn WidgetHost>) -> Self {
        Self {
            fetcher,
            widgets,
            splitter: Box::new(crate::split::GreedySplitter::default()),
        }
    }

    pub fn with_splitter(mut self, splitter: Box<dyn LineSplitter>) -> Self {
        self.splitter = splitter;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_kind_parses_known_tags_only() {
        assert_eq!(PlayerKind::from_attr("youtube"), Some(PlayerKind::YouTube));
        assert_eq!(PlayerKind::from_attr("vimeo"), Some(PlayerKind::Vimeo));
        assert_eq!(PlayerKind::from_attr("dailymotion"), None);
        assert_eq!(PlayerKind::from_attr(""), None);
    }

    #[test]
    fn only_the_scheduler_needs_init() {
        assert!(Widget::Scheduler.needs_init());
        assert!(!Widget::CmsFilter.needs_init());
    }
}
