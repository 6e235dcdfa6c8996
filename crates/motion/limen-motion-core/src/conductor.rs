//! Owner of every live timeline.
//!
//! The conductor is stepped once per engine tick. It hands out ids, advances
//! whatever is playing, and surfaces completion events for the layer above to
//! dispatch. Killing a timeline removes it outright; a killed timeline never
//! fires completion.

use indexmap::IndexMap;
use limen_stage_core::Stage;

use crate::ids::{IdAllocator, TimelineId};
use crate::timeline::{MotionEvent, Timeline, TimelineBuilder};

#[derive(Debug, Default)]
pub struct Conductor {
    timelines: IndexMap<TimelineId, Timeline>,
    ids: IdAllocator,
}

impl Conductor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a timeline. It starts paused; play it explicitly.
    pub fn add(&mut self, builder: TimelineBuilder) -> TimelineId {
        let id = self.ids.alloc_timeline();
        self.timelines.insert(id, builder.build(id));
        id
    }

    pub fn timeline(&self, id: TimelineId) -> Option<&Timeline> {
        self.timelines.get(&id)
    }

    pub fn timeline_mut(&mut self, id: TimelineId) -> Option<&mut Timeline> {
        self.timelines.get_mut(&id)
    }

    pub fn play(&mut self, id: TimelineId) -> bool {
        match self.timelines.get_mut(&id) {
            Some(tl) => {
                tl.play();
                true
            }
            None => false,
        }
    }

    pub fn reverse(&mut self, id: TimelineId) -> bool {
        match self.timelines.get_mut(&id) {
            Some(tl) => {
                tl.reverse();
                true
            }
            None => false,
        }
    }

    pub fn pause(&mut self, id: TimelineId) -> bool {
        match self.timelines.get_mut(&id) {
            Some(tl) => {
                tl.pause();
                true
            }
            None => false,
        }
    }

    pub fn scrub_to(&mut self, id: TimelineId, progress: f32, stage: &mut Stage) -> bool {
        match self.timelines.get_mut(&id) {
            Some(tl) => {
                tl.scrub_to(progress, stage);
                true
            }
            None => false,
        }
    }

    /// Remove a timeline without firing completion.
    pub fn kill(&mut self, id: TimelineId) -> bool {
        self.timelines.shift_remove(&id).is_some()
    }

    /// Advance every active timeline by `dt` seconds.
    pub fn step(&mut self, dt: f32, stage: &mut Stage) -> Vec<MotionEvent> {
        let mut events = Vec::new();
        for timeline in self.timelines.values_mut() {
            if let Some(event) = timeline.advance(dt, stage) {
                events.push(event);
            }
        }
        events
    }

    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.timelines.values().filter(|t| t.is_active()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ease::Ease;
    use limen_stage_core::{Prop, PropValue};

    #[test]
    fn killed_timelines_never_complete() {
        let mut stage = Stage::new();
        let root = stage.root();
        let node = stage.create_in(root, "div").unwrap();
        stage.set_prop(node, Prop::Opacity, PropValue::Number(0.0)).unwrap();

        let mut conductor = Conductor::new();
        let id = conductor.add(TimelineBuilder::new("fade").to(
            node,
            Prop::Opacity,
            1.0,
            0.5,
            Ease::Linear,
            0.0,
        ));
        conductor.play(id);
        conductor.step(0.25, &mut stage);
        assert!(conductor.kill(id));
        let events = conductor.step(1.0, &mut stage);
        assert!(events.is_empty());
        assert!(conductor.timeline(id).is_none());
    }

    #[test]
    fn ids_are_not_reused_after_kill() {
        let mut conductor = Conductor::new();
        let a = conductor.add(TimelineBuilder::new("a"));
        conductor.kill(a);
        let b = conductor.add(TimelineBuilder::new("b"));
        assert_ne!(a, b);
    }

    #[test]
    fn step_reports_completions_in_registration_order() {
        let mut stage = Stage::new();
        let root = stage.root();
        let node = stage.create_in(root, "div").unwrap();

        let mut conductor = Conductor::new();
        let first = conductor.add(TimelineBuilder::new("one").set(node, Prop::Opacity, 0.0, 0.0));
        let second = conductor.add(TimelineBuilder::new("two").set(node, Prop::Scale, 0.5, 0.0));
        conductor.play(first);
        conductor.play(second);
        let events = conductor.step(0.0, &mut stage);
        assert_eq!(
            events,
            vec![
                MotionEvent::Completed { id: first },
                MotionEvent::Completed { id: second }
            ]
        );
    }
}
