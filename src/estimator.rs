//! Running importance-weighted value estimate for one action (or one policy).
//!
//! The variance proxy accumulates `w * r^2` rather than `(w * r)^2`: for the
//! baseline (weights are 0 or 1) both agree, and the first keeps the policy's
//! variance on the reward scale instead of the squared-propensity scale.

/// Weighted sums for a single value estimate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueEstimator {
    weighted_sum: f64,
    weighted_sq_sum: f64,
    sum_weights: f64,
}

impl ValueEstimator {
    /// A fresh estimator with all sums at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from raw sums (used by the codec).
    pub(crate) fn from_parts(weighted_sum: f64, weighted_sq_sum: f64, sum_weights: f64) -> Self {
        Self {
            weighted_sum,
            weighted_sq_sum,
            sum_weights,
        }
    }

    /// Add one importance-weighted observation.
    ///
    /// A zero weight contributes nothing. Negative or non-finite weights are
    /// ignored, as is a non-finite reward or an observation that would push
    /// any sum past `f64::MAX`.
    pub fn update(&mut self, importance_weight: f64, reward: f64) {
        if let Some(next) = self.checked_update(importance_weight, reward) {
            *self = next;
        }
    }

    /// The estimator after one more observation, or `None` if the observation
    /// is invalid or would leave a sum non-finite.
    pub fn checked_update(&self, importance_weight: f64, reward: f64) -> Option<Self> {
        if !(importance_weight.is_finite() && importance_weight >= 0.0 && reward.is_finite()) {
            return None;
        }
        if importance_weight == 0.0 {
            return Some(*self);
        }
        let wr = importance_weight * reward;
        let next = Self {
            weighted_sum: self.weighted_sum + wr,
            weighted_sq_sum: self.weighted_sq_sum + wr * reward,
            sum_weights: self.sum_weights + importance_weight,
        };
        (next.weighted_sum.is_finite()
            && next.weighted_sq_sum.is_finite()
            && next.sum_weights.is_finite())
        .then_some(next)
    }

    /// Scale every sum by `factor` (exponential forgetting).
    ///
    /// Factors outside `(0, 1)` are a no-op.
    pub fn decay(&mut self, factor: f64) {
        if !(factor.is_finite() && factor > 0.0 && factor < 1.0) {
            return;
        }
        self.weighted_sum *= factor;
        self.weighted_sq_sum *= factor;
        self.sum_weights *= factor;
    }

    /// `weighted_sum / sum_weights`, or `0` before any weight has arrived.
    pub fn mean(&self) -> f64 {
        if self.sum_weights > 0.0 {
            self.weighted_sum / self.sum_weights
        } else {
            0.0
        }
    }

    /// Weighted second moment minus squared mean, clamped at zero.
    pub fn variance_proxy(&self) -> f64 {
        if self.sum_weights <= 0.0 {
            return 0.0;
        }
        let m = self.mean();
        (self.weighted_sq_sum / self.sum_weights - m * m).max(0.0)
    }

    /// Accumulated importance weight.
    pub fn effective_count(&self) -> f64 {
        self.sum_weights
    }

    /// Raw `sum(w * r)`.
    pub fn weighted_sum(&self) -> f64 {
        self.weighted_sum
    }

    /// Raw `sum(w * r^2)`.
    pub fn weighted_sq_sum(&self) -> f64 {
        self.weighted_sq_sum
    }

    /// Raw `sum(w)`; same as [`Self::effective_count`].
    pub fn sum_weights(&self) -> f64 {
        self.sum_weights
    }
}
