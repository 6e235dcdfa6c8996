//! One-shot visibility watching.
//!
//! A watch fires the first time its target's top edge sits at or above the
//! reveal line (a fraction of the viewport height, 0.9 by default). Bounds
//! are read fresh on every sweep, so layout shifts between sweeps cannot
//! leave a watch keyed to stale geometry. Watches are an arena per view;
//! navigation clears the lot.

use serde::{Deserialize, Serialize};

use limen_stage_core::{NodeId, Stage, Viewport};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WatchId(pub u32);

#[derive(Clone, Copy, Debug)]
struct Watch {
    target: NodeId,
    fired: bool,
}

/// Per-view arena of pending one-shot watches.
#[derive(Debug)]
pub struct WatchSet {
    watches: Vec<Watch>,
    fraction: f32,
}

impl WatchSet {
    pub fn new(fraction: f32) -> Self {
        Self {
            watches: Vec::new(),
            fraction,
        }
    }

    pub fn add(&mut self, target: NodeId) -> WatchId {
        let id = WatchId(self.watches.len() as u32);
        self.watches.push(Watch {
            target,
            fired: false,
        });
        id
    }

    pub fn is_fired(&self, id: WatchId) -> bool {
        self.watches
            .get(id.0 as usize)
            .map(|w| w.fired)
            .unwrap_or(false)
    }

    pub fn pending(&self) -> usize {
        self.watches.iter().filter(|w| !w.fired).count()
    }

    /// Fire every unfired watch whose target's top edge has crossed the
    /// reveal line. Boundary contact counts. Targets that left the stage
    /// stay silent.
    pub fn sweep(&mut self, stage: &Stage, viewport: &Viewport) -> Vec<WatchId> {
        let line = viewport.height * self.fraction;
        let mut fired = Vec::new();
        for (i, watch) in self.watches.iter_mut().enumerate() {
            if watch.fired {
                continue;
            }
            let Some(rect) = stage.rect(watch.target) else {
                continue;
            };
            if viewport.top_of(rect) <= line {
                watch.fired = true;
                fired.push(WatchId(i as u32));
            }
        }
        fired
    }

    pub fn clear(&mut self) {
        self.watches.clear();
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limen_stage_core::Rect;

    fn stage_with_box(y: f32) -> (Stage, NodeId) {
        let mut stage = Stage::new();
        let root = stage.root();
        let node = stage.create_with(root, "div", &["text-block"]).unwrap();
        stage.set_rect(node, Rect::new(0.0, y, 400.0, 100.0)).unwrap();
        (stage, node)
    }

    #[test]
    fn above_fold_fires_on_first_sweep() {
        let (stage, node) = stage_with_box(100.0);
        let mut watches = WatchSet::new(0.9);
        let id = watches.add(node);
        let vp = Viewport::new(1280.0, 800.0);
        assert_eq!(watches.sweep(&stage, &vp), vec![id]);
        assert!(watches.is_fired(id));
    }

    #[test]
    fn fires_once_at_the_boundary() {
        // Reveal line at 720; top edge lands exactly there.
        let (stage, node) = stage_with_box(1000.0);
        let mut watches = WatchSet::new(0.9);
        let id = watches.add(node);
        let mut vp = Viewport::new(1280.0, 800.0);

        vp.scroll_y = 279.0;
        assert!(watches.sweep(&stage, &vp).is_empty());

        vp.scroll_y = 280.0;
        assert_eq!(watches.sweep(&stage, &vp), vec![id]);

        vp.scroll_y = 500.0;
        assert!(watches.sweep(&stage, &vp).is_empty());
    }

    #[test]
    fn sweeps_read_fresh_bounds() {
        let (mut stage, node) = stage_with_box(5000.0);
        let mut watches = WatchSet::new(0.9);
        let id = watches.add(node);
        let vp = Viewport::new(1280.0, 800.0);
        assert!(watches.sweep(&stage, &vp).is_empty());

        // Layout pulled the box up without any scrolling.
        stage
            .set_rect(node, Rect::new(0.0, 300.0, 400.0, 100.0))
            .unwrap();
        assert_eq!(watches.sweep(&stage, &vp), vec![id]);
    }

    #[test]
    fn departed_targets_stay_silent() {
        let (mut stage, node) = stage_with_box(100.0);
        let mut watches = WatchSet::new(0.9);
        watches.add(node);
        stage.remove_subtree(node).unwrap();
        let vp = Viewport::new(1280.0, 800.0);
        assert!(watches.sweep(&stage, &vp).is_empty());
        assert_eq!(watches.pending(), 1);
    }
}
