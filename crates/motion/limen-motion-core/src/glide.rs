//! Inertial scroll position.
//!
//! Wheel input moves a target offset; the published position settles toward it
//! exponentially, which is what gives scrolling its glide. Programmatic moves
//! (keyboard paging, scroll-to-top on navigation) run as eased tweens that win
//! over the settle loop until they finish or a wheel event cancels them.

use serde::{Deserialize, Serialize};

use crate::ease::Ease;

/// Settle rate in 1/s. Larger catches up faster.
const SETTLE_RATE: f32 = 8.0;
/// Distance under which the position snaps to target.
const SNAP_EPSILON: f32 = 0.05;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct GlideTween {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
    ease: Ease,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GlideScroll {
    current: f32,
    target: f32,
    max_scroll: f32,
    running: bool,
    tween: Option<GlideTween>,
}

impl GlideScroll {
    pub fn new(max_scroll: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            max_scroll: max_scroll.max(0.0),
            running: true,
            tween: None,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn max_scroll(&self) -> f32 {
        self.max_scroll
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Freeze in place. Wheel input is ignored until [`start`](Self::start).
    pub fn stop(&mut self) {
        self.running = false;
        self.tween = None;
        self.target = self.current;
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Re-clamp after layout changes.
    pub fn set_max_scroll(&mut self, max_scroll: f32) {
        self.max_scroll = max_scroll.max(0.0);
        self.target = self.target.clamp(0.0, self.max_scroll);
        self.current = self.current.clamp(0.0, self.max_scroll);
    }

    /// Accumulate wheel delta. Cancels any programmatic glide.
    pub fn wheel(&mut self, delta: f32) {
        if !self.running {
            return;
        }
        self.tween = None;
        self.target = (self.target + delta).clamp(0.0, self.max_scroll);
    }

    /// Eased move to an absolute offset.
    pub fn glide_to(&mut self, to: f32, duration: f32, ease: Ease) {
        if !self.running {
            return;
        }
        let to = to.clamp(0.0, self.max_scroll);
        if duration <= 0.0 {
            self.jump_to(to);
            return;
        }
        self.target = to;
        self.tween = Some(GlideTween {
            from: self.current,
            to,
            elapsed: 0.0,
            duration,
            ease,
        });
    }

    /// Instant reposition, bypassing inertia.
    pub fn jump_to(&mut self, to: f32) {
        let to = to.clamp(0.0, self.max_scroll);
        self.current = to;
        self.target = to;
        self.tween = None;
    }

    /// Advance by `dt` seconds; returns the published position.
    pub fn update(&mut self, dt: f32) -> f32 {
        if let Some(tween) = &mut self.tween {
            tween.elapsed += dt;
            let p = if tween.duration > 0.0 {
                (tween.elapsed / tween.duration).min(1.0)
            } else {
                1.0
            };
            self.current = tween.from + (tween.to - tween.from) * tween.ease.apply(p);
            if p >= 1.0 {
                self.current = tween.to;
                self.tween = None;
            }
            return self.current;
        }
        if !self.running {
            return self.current;
        }
        let gap = self.target - self.current;
        if gap.abs() <= SNAP_EPSILON {
            self.current = self.target;
        } else {
            self.current = self.target - gap * (-SETTLE_RATE * dt).exp();
        }
        self.current
    }

    pub fn is_settled(&self) -> bool {
        self.tween.is_none() && (self.target - self.current).abs() <= SNAP_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn wheel_glides_toward_target() {
        let mut glide = GlideScroll::new(5000.0);
        glide.wheel(300.0);
        let after_one = glide.update(1.0 / 60.0);
        assert!(after_one > 0.0 && after_one < 300.0);
        for _ in 0..600 {
            glide.update(1.0 / 60.0);
        }
        assert_abs_diff_eq!(glide.current(), 300.0, epsilon = 0.1);
        assert!(glide.is_settled());
    }

    #[test]
    fn target_clamps_to_bounds() {
        let mut glide = GlideScroll::new(1000.0);
        glide.wheel(-500.0);
        assert_eq!(glide.target(), 0.0);
        glide.wheel(99999.0);
        assert_eq!(glide.target(), 1000.0);
    }

    #[test]
    fn stopped_scroller_ignores_wheel() {
        let mut glide = GlideScroll::new(1000.0);
        glide.wheel(200.0);
        for _ in 0..600 {
            glide.update(1.0 / 60.0);
        }
        glide.stop();
        glide.wheel(300.0);
        assert_eq!(glide.target(), glide.current());
        let before = glide.current();
        glide.update(0.5);
        assert_eq!(glide.current(), before);
        glide.start();
        glide.wheel(100.0);
        assert!(glide.target() > before);
    }

    #[test]
    fn glide_to_runs_the_full_ease() {
        let mut glide = GlideScroll::new(2000.0);
        glide.glide_to(600.0, 1.0, Ease::OutPow(2.5));
        glide.update(0.5);
        let halfway = glide.current();
        assert_abs_diff_eq!(halfway, 600.0 * Ease::OutPow(2.5).apply(0.5), epsilon = 0.01);
        glide.update(0.6);
        assert_abs_diff_eq!(glide.current(), 600.0, epsilon = 0.001);
        assert!(glide.is_settled());
    }

    #[test]
    fn wheel_cancels_programmatic_glide() {
        let mut glide = GlideScroll::new(2000.0);
        glide.glide_to(600.0, 1.0, Ease::OutQuad);
        glide.update(0.2);
        glide.wheel(50.0);
        let target = glide.target();
        for _ in 0..600 {
            glide.update(1.0 / 60.0);
        }
        assert_abs_diff_eq!(glide.current(), target, epsilon = 0.1);
    }

    #[test]
    fn resize_reclamps_position() {
        let mut glide = GlideScroll::new(3000.0);
        glide.jump_to(2500.0);
        glide.set_max_scroll(1000.0);
        assert_eq!(glide.current(), 1000.0);
        assert_eq!(glide.target(), 1000.0);
    }
}
