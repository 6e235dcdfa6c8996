//! Easing curves.
//!
//! The fixed set covers the power family the choreography actually uses; the
//! keyboard scroller needs a fractional exponent, hence [`Ease::OutPow`].

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Ease {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    /// `1 - (1 - t)^k` for arbitrary `k > 0`.
    OutPow(f32),
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => pow_in(t, 2),
            Self::OutQuad => pow_out(t, 2),
            Self::InOutQuad => pow_in_out(t, 2),
            Self::InCubic => pow_in(t, 3),
            Self::OutCubic => pow_out(t, 3),
            Self::InOutCubic => pow_in_out(t, 3),
            Self::InQuart => pow_in(t, 4),
            Self::OutQuart => pow_out(t, 4),
            Self::InOutQuart => pow_in_out(t, 4),
            Self::InQuint => pow_in(t, 5),
            Self::OutQuint => pow_out(t, 5),
            Self::InOutQuint => pow_in_out(t, 5),
            Self::OutPow(k) => 1.0 - (1.0 - t).powf(k.max(f32::EPSILON)),
        }
    }
}

#[inline]
fn pow_in(t: f32, k: i32) -> f32 {
    t.powi(k)
}

#[inline]
fn pow_out(t: f32, k: i32) -> f32 {
    1.0 - (1.0 - t).powi(k)
}

#[inline]
fn pow_in_out(t: f32, k: i32) -> f32 {
    if t < 0.5 {
        0.5 * (2.0 * t).powi(k)
    } else {
        1.0 - 0.5 * (2.0 - 2.0 * t).powi(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn endpoints_are_exact() {
        let all = [
            Ease::Linear,
            Ease::InQuad,
            Ease::OutQuad,
            Ease::InOutQuad,
            Ease::InCubic,
            Ease::OutCubic,
            Ease::InOutCubic,
            Ease::InQuart,
            Ease::OutQuart,
            Ease::InOutQuart,
            Ease::InQuint,
            Ease::OutQuint,
            Ease::InOutQuint,
            Ease::OutPow(2.5),
        ];
        for ease in all {
            assert_abs_diff_eq!(ease.apply(0.0), 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(ease.apply(1.0), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Ease::OutQuart.apply(-1.0), 0.0);
        assert_eq!(Ease::OutQuart.apply(2.0), 1.0);
    }

    #[test]
    fn in_out_is_symmetric_at_midpoint() {
        assert_abs_diff_eq!(Ease::InOutCubic.apply(0.5), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(Ease::InOutQuint.apply(0.5), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn out_pow_matches_closed_form() {
        let k = 2.5;
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert_abs_diff_eq!(
                Ease::OutPow(k).apply(t),
                1.0 - (1.0 - t).powf(k),
                epsilon = 1e-6
            );
        }
    }
}
