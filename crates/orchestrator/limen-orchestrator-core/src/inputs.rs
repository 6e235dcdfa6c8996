//! Per-tick input batch.
//!
//! Hosts collect whatever happened since the previous tick and hand it to
//! [`update`](crate::Orchestrator::update) in one batch. Commands are
//! host-initiated requests; events mirror raw platform input. Order within
//! each vector is preserved.

use serde::{Deserialize, Serialize};

use limen_stage_core::{NodeId, Rect};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Inputs {
    pub commands: Vec<Command>,
    pub events: Vec<HostEvent>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn event(mut self, event: HostEvent) -> Self {
        self.events.push(event);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Command {
    /// Start a page transition to a same-site path.
    Navigate { to: String },
}

/// Raw input mirrored from the platform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum HostEvent {
    /// Wheel delta in px (positive scrolls down).
    Wheel { delta_y: f32 },
    /// Pointer position in viewport coordinates.
    PointerMove { x: f32, y: f32 },
    /// A pointer activation landed on `node`.
    Click { node: NodeId },
    /// Key press, with the focused node when the host tracks one.
    KeyDown { key: Key, focused: Option<NodeId> },
    /// Window dimensions changed. `page_height` is the host's fresh
    /// measurement of the full document.
    Resize {
        width: f32,
        height: f32,
        page_height: f32,
    },
    /// Fresh geometry after a host-side re-measure.
    Relayout {
        rects: Vec<(NodeId, Rect)>,
        page_height: f32,
    },
    /// The CMS filter re-rendered its list.
    FilterRendered,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Key {
    Enter,
    Space,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}
