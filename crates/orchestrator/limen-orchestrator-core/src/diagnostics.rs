//! Tick-level diagnostics.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::transition::TransitionPhase;

/// Diagnostics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsCfg {
    pub enabled: bool,
}

impl Default for DiagnosticsCfg {
    fn default() -> Self {
        DiagnosticsCfg { enabled: true }
    }
}

/// Snapshot of one tick, kept for host debug overlays.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickStats {
    pub tick: u64,
    pub dt: f32,
    pub scroll_y: f32,
    pub active_timelines: usize,
    pub pending_watches: usize,
    pub phase: TransitionPhase,
    pub events: usize,
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    pub cfg: DiagnosticsCfg,
    last: TickStats,
}

impl Diagnostics {
    pub fn record(&mut self, stats: TickStats) {
        if !self.cfg.enabled {
            return;
        }
        trace!(
            tick = stats.tick,
            active = stats.active_timelines,
            pending = stats.pending_watches,
            phase = %stats.phase,
            "tick"
        );
        self.last = stats;
    }

    pub fn last(&self) -> &TickStats {
        &self.last
    }
}
