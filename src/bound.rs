//! Anytime lower confidence bound on an estimator's true mean.
//!
//! Empirical-Bernstein shape with an iterated-logarithm correction:
//!
//! ```text
//!   n      = effective_count
//!   L(n)   = ln(1 / (1 - tau)) + ln(1 + ln(1 + n))
//!   margin = sqrt(2 * V * L / n) + 3 * range * L / n
//!   lb     = mean - margin
//! ```
//!
//! `V` is the estimator's variance proxy and `range` the reward scale. The
//! `ln ln` term pays for checking the bound every round instead of at a fixed
//! horizon. For a fixed sample, `L` grows with `tau`, so a smaller `tau` gives a
//! larger (tighter) bound and the baseline wins sooner.
//!
//! Properties relied on by the controller:
//! - `lb < mean` for any finite `n > 0` (the margin is strictly positive);
//! - `lb -> mean` as `n -> inf` (`L` grows like `ln ln n`);
//! - with consistent evidence (fixed mean and variance) `lb` never decreases as
//!   `n` grows;
//! - `n == 0` yields `-inf`, so an unobserved baseline can never win.

use crate::ValueEstimator;

/// Lower confidence bound for `estimator` at confidence parameter `tau`.
///
/// `tau` outside `(0, 1)` is clamped to the nearest representable interior
/// value; a non-positive `reward_range` falls back to `1.0`.
pub fn lower_bound(estimator: &ValueEstimator, tau: f64, reward_range: f64) -> f64 {
    let n = estimator.effective_count();
    if !(n.is_finite() && n > 0.0) {
        return f64::NEG_INFINITY;
    }
    let range = if reward_range.is_finite() && reward_range > 0.0 {
        reward_range
    } else {
        1.0
    };
    estimator.mean() - margin(n, estimator.variance_proxy(), tau, range)
}

/// [`lower_bound`] with a unit reward range.
pub fn lower_bound_default_range(estimator: &ValueEstimator, tau: f64) -> f64 {
    lower_bound(estimator, tau, 1.0)
}

/// Half-width subtracted from the mean.
fn margin(n: f64, variance: f64, tau: f64, range: f64) -> f64 {
    let l = log_term(n, tau);
    (2.0 * variance * l / n).sqrt() + 3.0 * range * l / n
}

fn log_term(n: f64, tau: f64) -> f64 {
    let tau = if tau.is_nan() {
        crate::DEFAULT_TAU
    } else {
        tau.clamp(f64::EPSILON, 1.0 - f64::EPSILON)
    };
    (1.0 / (1.0 - tau)).ln() + (1.0 + (1.0 + n).ln()).ln()
}
