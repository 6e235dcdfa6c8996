//! Semantic events the engine reports back to its host.

use serde::{Deserialize, Serialize};

use limen_stage_core::NodeId;

use crate::category::Category;
use crate::host::{PlayerKind, Widget};
use crate::transition::TransitionPhase;

/// What one tick produced. Replaced wholesale on every
/// [`update`](crate::Orchestrator::update).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    pub events: Vec<EngineEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum EngineEvent {
    /// A reveal crossed its visibility line and started playing.
    RevealStarted { category: Category, element: NodeId },
    /// A reveal finished and its synthesized markup was cleaned up.
    RevealCompleted { category: Category, element: NodeId },
    MenuOpened,
    MenuClosed,
    VideoOpened { kind: PlayerKind },
    VideoClosed,
    /// The body theme switched.
    ThemeChanged { theme: String },
    /// The transition coordinator changed phase.
    PhaseChanged { phase: TransitionPhase },
    /// A navigation arrived while another was in flight.
    NavigationIgnored { to: String },
    /// A transition aborted; the previous view was restored. Hosts should
    /// fall back to a full navigation.
    TransitionFailed { to: String, reason: String },
    /// A view finished activating and its start pass ran.
    PageReady { path: String },
    WidgetInjected { widget: Widget },
    WidgetInitialized { widget: Widget },
    /// Widget init retries were exhausted.
    WidgetInitFailed { widget: Widget },
    /// A dropdown finished toggling.
    DropdownToggled { block: NodeId, open: bool },
    /// Layout-dependent state changed; the host should re-measure and send
    /// [`Relayout`](crate::inputs::HostEvent::Relayout).
    RelayoutRequested,
}
