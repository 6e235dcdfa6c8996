//! Timelines: ordered tween collections with a single playhead.
//!
//! Timelines are registered paused and only move when told to. Zero-duration
//! timelines complete on the first step after `play`, which gives "apply these
//! values now" the same completion contract as a real animation.

use std::fmt;

use limen_stage_core::{NodeId, Prop, PropValue, Stage};
use serde::{Deserialize, Serialize};

use crate::ease::Ease;
use crate::ids::TimelineId;
use crate::tween::Tween;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TimelineState {
    Paused,
    Playing,
    Reversing,
    Completed,
}

impl TimelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineState::Paused => "paused",
            TimelineState::Playing => "playing",
            TimelineState::Reversing => "reversing",
            TimelineState::Completed => "completed",
        }
    }
}

impl fmt::Display for TimelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle notifications produced by [`Timeline::advance`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MotionEvent {
    /// Forward playback reached the end.
    Completed { id: TimelineId },
    /// Reverse playback returned to zero.
    Reversed { id: TimelineId },
}

/// Fluent constructor mirroring how choreography is written: each call places
/// one tween at an absolute offset from timeline start.
#[derive(Clone, Debug, Default)]
pub struct TimelineBuilder {
    label: String,
    tweens: Vec<Tween>,
}

impl TimelineBuilder {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tweens: Vec::new(),
        }
    }

    /// Animate `prop` to `to`, capturing `from` from the stage at first play.
    pub fn to(
        mut self,
        target: NodeId,
        prop: Prop,
        to: impl Into<PropValue>,
        duration: f32,
        ease: Ease,
        at: f32,
    ) -> Self {
        self.tweens.push(Tween {
            target,
            prop,
            from: None,
            to: to.into(),
            start: at,
            duration,
            ease,
            started: false,
        });
        self
    }

    /// Animate with an explicit starting value.
    #[allow(clippy::too_many_arguments)]
    pub fn from_to(
        mut self,
        target: NodeId,
        prop: Prop,
        from: impl Into<PropValue>,
        to: impl Into<PropValue>,
        duration: f32,
        ease: Ease,
        at: f32,
    ) -> Self {
        self.tweens.push(Tween {
            target,
            prop,
            from: Some(from.into()),
            to: to.into(),
            start: at,
            duration,
            ease,
            started: false,
        });
        self
    }

    /// Step `prop` to `value` when the playhead passes `at`.
    pub fn set(
        self,
        target: NodeId,
        prop: Prop,
        value: impl Into<PropValue>,
        at: f32,
    ) -> Self {
        self.to(target, prop, value, 0.0, Ease::Linear, at)
    }

    /// One tween per target, offset by `each` seconds from `at`.
    #[allow(clippy::too_many_arguments)]
    pub fn stagger(
        mut self,
        targets: &[NodeId],
        prop: Prop,
        to: impl Into<PropValue> + Copy,
        duration: f32,
        ease: Ease,
        at: f32,
        each: f32,
    ) -> Self {
        for (i, target) in targets.iter().enumerate() {
            self = self.to(*target, prop, to, duration, ease, at + each * i as f32);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub(crate) fn build(self, id: TimelineId) -> Timeline {
        let duration = self
            .tweens
            .iter()
            .map(Tween::end)
            .fold(0.0_f32, f32::max);
        Timeline {
            id,
            label: self.label,
            tweens: self.tweens,
            duration,
            time: 0.0,
            state: TimelineState::Paused,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Timeline {
    pub id: TimelineId,
    pub label: String,
    tweens: Vec<Tween>,
    duration: f32,
    time: f32,
    state: TimelineState,
}

impl Timeline {
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            (self.time / self.duration).clamp(0.0, 1.0)
        } else if self.state == TimelineState::Completed {
            1.0
        } else {
            0.0
        }
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            TimelineState::Playing | TimelineState::Reversing
        )
    }

    pub fn play(&mut self) {
        if self.state == TimelineState::Completed && self.time >= self.duration {
            return;
        }
        self.state = TimelineState::Playing;
    }

    pub fn pause(&mut self) {
        if self.is_active() {
            self.state = TimelineState::Paused;
        }
    }

    pub fn reverse(&mut self) {
        self.state = TimelineState::Reversing;
    }

    /// Jump the playhead to `progress` of the duration and apply values.
    /// Leaves play state untouched; scrubbed timelines never complete.
    pub fn scrub_to(&mut self, progress: f32, stage: &mut Stage) {
        self.time = progress.clamp(0.0, 1.0) * self.duration;
        self.apply(stage);
    }

    /// Move the playhead by `dt` and write values to the stage.
    pub fn advance(&mut self, dt: f32, stage: &mut Stage) -> Option<MotionEvent> {
        match self.state {
            TimelineState::Playing => {
                self.time = (self.time + dt).min(self.duration);
                self.apply(stage);
                if self.time >= self.duration {
                    self.state = TimelineState::Completed;
                    return Some(MotionEvent::Completed { id: self.id });
                }
            }
            TimelineState::Reversing => {
                self.time = (self.time - dt).max(0.0);
                self.apply(stage);
                if self.time <= 0.0 {
                    self.state = TimelineState::Paused;
                    return Some(MotionEvent::Reversed { id: self.id });
                }
            }
            TimelineState::Paused | TimelineState::Completed => {}
        }
        None
    }

    fn apply(&mut self, stage: &mut Stage) {
        let time = self.time;
        for tween in &mut self.tweens {
            if !tween.started {
                if time < tween.start {
                    continue;
                }
                if tween.from.is_none() {
                    let current = stage
                        .prop(tween.target, tween.prop)
                        .unwrap_or_else(|| tween.prop.default_value());
                    tween.from = Some(current);
                }
                tween.started = true;
            }
            let from = tween.from.unwrap_or_else(|| tween.prop.default_value());
            let value = tween.value_at(time, from);
            // Targets can disappear mid-flight (subtree swapped out); their
            // tweens just stop landing.
            let _ = stage.set_prop(tween.target, tween.prop, value);
        }
    }
}
