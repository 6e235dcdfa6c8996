//! Limen orchestrator (host-agnostic)
//!
//! The behavior layer of a Limen page: element discovery, reveal
//! preparation and scheduling, menu and video overlays, scroll-coupled
//! interactions, route scripts, and the page-transition machine, all driven
//! from a single per-frame [`Orchestrator::update`] call. Hosts mirror their
//! DOM into a [`limen_stage_core::Stage`], hand the engine input batches,
//! and replay the resulting stage writes and [`EngineEvent`]s.

pub mod category;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod events;
pub mod host;
pub mod hover;
pub mod inputs;
pub mod interactions;
pub mod overlay;
pub mod playback;
pub mod prepare;
pub mod registrar;
pub mod scripts;
pub mod split;
pub mod transition;
pub mod visibility;

// Re-exports for hosts and tests
pub use category::{catalog, compile_catalog, Category, CategoryRule};
pub use config::EngineConfig;
pub use diagnostics::{Diagnostics, DiagnosticsCfg, TickStats};
pub use engine::Orchestrator;
pub use error::LimenError;
pub use events::{EngineEvent, Outputs};
pub use host::{
    DocumentFetcher, FetchError, FetchedDocument, HostBundle, PlayerKind, VideoPlayer, Widget,
    WidgetHost,
};
pub use inputs::{Command, HostEvent, Inputs, Key};
pub use playback::{PlaybackRegistry, RevealEntry, RevealPhase};
pub use prepare::{PreparedElement, PreparedSet};
pub use scripts::{widgets_for_route, ScriptEngine};
pub use split::{GreedySplitter, LineSplitter, Segment};
pub use transition::{normalize_path, TransitionPhase, TransitionSession};
pub use visibility::{WatchId, WatchSet};
