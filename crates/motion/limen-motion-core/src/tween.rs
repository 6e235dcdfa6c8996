//! One property track inside a timeline.

use limen_stage_core::{NodeId, Prop, PropValue};
use serde::{Deserialize, Serialize};

use crate::ease::Ease;

/// A single `from -> to` segment on one node property.
///
/// `from` may be left open; it is captured from the stage the first time the
/// playhead reaches `start`, which is what lets reversal restore whatever the
/// node looked like before the timeline ever touched it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tween {
    pub target: NodeId,
    pub prop: Prop,
    pub from: Option<PropValue>,
    pub to: PropValue,
    /// Seconds from timeline start.
    pub start: f32,
    /// Zero means step semantics: the value switches at `start`.
    pub duration: f32,
    pub ease: Ease,
    pub(crate) started: bool,
}

impl Tween {
    #[inline]
    pub fn end(&self) -> f32 {
        self.start + self.duration
    }

    /// Value at playhead `time`, given the resolved `from`.
    ///
    /// Numeric pairs interpolate; anything else (and zero-duration tweens)
    /// steps at `start`, so reversing past `start` restores `from`.
    pub(crate) fn value_at(&self, time: f32, from: PropValue) -> PropValue {
        match (from, self.to) {
            (PropValue::Number(a), PropValue::Number(b)) if self.duration > 0.0 => {
                let p = ((time - self.start) / self.duration).clamp(0.0, 1.0);
                PropValue::Number(a + (b - a) * self.ease.apply(p))
            }
            (from, to) => {
                if time >= self.start {
                    to
                } else {
                    from
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn tween(from: f32, to: f32, start: f32, duration: f32) -> Tween {
        Tween {
            target: NodeId(0),
            prop: Prop::Opacity,
            from: Some(PropValue::Number(from)),
            to: PropValue::Number(to),
            start,
            duration,
            ease: Ease::Linear,
            started: true,
        }
    }

    #[test]
    fn interpolates_between_endpoints() {
        let tw = tween(0.0, 10.0, 1.0, 2.0);
        let at = |t: f32| tw.value_at(t, tw.from.unwrap()).as_number().unwrap();
        assert_abs_diff_eq!(at(1.0), 0.0);
        assert_abs_diff_eq!(at(2.0), 5.0);
        assert_abs_diff_eq!(at(3.0), 10.0);
        // Clamped outside the segment.
        assert_abs_diff_eq!(at(0.0), 0.0);
        assert_abs_diff_eq!(at(9.0), 10.0);
    }

    #[test]
    fn zero_duration_steps_at_start() {
        let tw = tween(0.0, 1.0, 0.5, 0.0);
        let at = |t: f32| tw.value_at(t, tw.from.unwrap()).as_number().unwrap();
        assert_eq!(at(0.4), 0.0);
        assert_eq!(at(0.5), 1.0);
        assert_eq!(at(0.6), 1.0);
    }

    #[test]
    fn discrete_values_step_regardless_of_duration() {
        use limen_stage_core::Display;
        let tw = Tween {
            target: NodeId(0),
            prop: Prop::Display,
            from: Some(PropValue::Display(Display::None)),
            to: PropValue::Display(Display::Flex),
            start: 0.2,
            duration: 1.0,
            ease: Ease::Linear,
            started: true,
        };
        let from = tw.from.unwrap();
        assert_eq!(tw.value_at(0.0, from), PropValue::Display(Display::None));
        assert_eq!(tw.value_at(0.2, from), PropValue::Display(Display::Flex));
        assert_eq!(tw.value_at(0.7, from), PropValue::Display(Display::Flex));
    }
}
