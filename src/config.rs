//! Guard configuration.
//!
//! Start with [`GuardConfig::default()`] and adjust via the builder methods or
//! by setting fields directly; [`SwitchController::new`](crate::SwitchController::new)
//! validates before constructing.

use crate::{GuardError, Result};

/// Default confidence parameter: conservative, slow to adopt the baseline.
pub const DEFAULT_TAU: f64 = 0.999;

/// How the switch state may move once the baseline has been adopted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwitchPolicy {
    /// Once the baseline is adopted it stays adopted until an explicit reset.
    #[default]
    Monotonic,
    /// Re-evaluate every round: the baseline is released as soon as its lower
    /// bound drops back to or below the policy expectation.
    TwoSided,
}

impl SwitchPolicy {
    pub(crate) fn to_byte(self) -> u8 {
        match self {
            Self::Monotonic => 0,
            Self::TwoSided => 1,
        }
    }

    pub(crate) fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Monotonic),
            1 => Some(Self::TwoSided),
            _ => None,
        }
    }
}

/// Full configuration for a [`SwitchController`](crate::SwitchController).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GuardConfig {
    /// Index of the trusted default arm.
    pub baseline_action: usize,
    /// Confidence parameter in `(0, 1)`.
    ///
    /// Smaller values give a tighter (larger) lower bound, so the baseline wins
    /// sooner. `0.999` is the conservative default; `0.995` switches noticeably
    /// faster.
    pub tau: f64,
    /// Exponential forgetting factor in `(0, 1]` applied to both estimators at
    /// the start of every observed round.
    ///
    /// - `1.0` means no decay (estimator sums only grow).
    /// - Smaller values forget older rounds faster.
    pub decay: f64,
    /// Scale of the reward range used in the second-order bound term (must be
    /// finite and > 0). Rewards in `[0, 1]` want `1.0`.
    pub reward_range: f64,
    /// Residual exploration mass spread uniformly over all candidates when the
    /// baseline overrides a prediction, in `[0, 1)`.
    ///
    /// `0.0` is a pure spike on the baseline action.
    pub override_epsilon: f64,
    /// Whether baseline adoption is sticky.
    pub switch_policy: SwitchPolicy,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            baseline_action: 0,
            tau: DEFAULT_TAU,
            decay: 1.0,
            reward_range: 1.0,
            override_epsilon: 0.0,
            switch_policy: SwitchPolicy::Monotonic,
        }
    }
}

impl GuardConfig {
    /// Set the baseline arm.
    pub fn with_baseline_action(mut self, action: usize) -> Self {
        self.baseline_action = action;
        self
    }

    /// Set the confidence parameter.
    pub fn with_tau(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    /// Enable exponential forgetting.
    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    /// Set the reward-range scale used by the bound.
    pub fn with_reward_range(mut self, range: f64) -> Self {
        self.reward_range = range;
        self
    }

    /// Leave `epsilon` exploration mass when overriding predictions.
    pub fn with_override_epsilon(mut self, epsilon: f64) -> Self {
        self.override_epsilon = epsilon;
        self
    }

    /// Choose between sticky and re-evaluated switching.
    pub fn with_switch_policy(mut self, policy: SwitchPolicy) -> Self {
        self.switch_policy = policy;
        self
    }

    /// Check every field is in range.
    pub fn validate(&self) -> Result<()> {
        if !(self.tau.is_finite() && self.tau > 0.0 && self.tau < 1.0) {
            return Err(GuardError::invalid_config(format!(
                "tau must be in (0, 1), got {}",
                self.tau
            )));
        }
        if !(self.decay.is_finite() && self.decay > 0.0 && self.decay <= 1.0) {
            return Err(GuardError::invalid_config(format!(
                "decay must be in (0, 1], got {}",
                self.decay
            )));
        }
        if !(self.reward_range.is_finite() && self.reward_range > 0.0) {
            return Err(GuardError::invalid_config(format!(
                "reward_range must be finite and > 0, got {}",
                self.reward_range
            )));
        }
        if !(self.override_epsilon.is_finite()
            && self.override_epsilon >= 0.0
            && self.override_epsilon < 1.0)
        {
            return Err(GuardError::invalid_config(format!(
                "override_epsilon must be in [0, 1), got {}",
                self.override_epsilon
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_and_conservative() {
        let cfg = GuardConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.baseline_action, 0);
        assert_eq!(cfg.tau, DEFAULT_TAU);
        assert_eq!(cfg.decay, 1.0);
        assert_eq!(cfg.switch_policy, SwitchPolicy::Monotonic);
    }

    #[test]
    fn builder_sets_fields() {
        let cfg = GuardConfig::default()
            .with_baseline_action(2)
            .with_tau(0.995)
            .with_decay(0.99)
            .with_reward_range(2.0)
            .with_override_epsilon(0.05)
            .with_switch_policy(SwitchPolicy::TwoSided);
        assert_eq!(cfg.baseline_action, 2);
        assert_eq!(cfg.tau, 0.995);
        assert_eq!(cfg.decay, 0.99);
        assert_eq!(cfg.reward_range, 2.0);
        assert_eq!(cfg.override_epsilon, 0.05);
        assert_eq!(cfg.switch_policy, SwitchPolicy::TwoSided);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let bad = [
            GuardConfig::default().with_tau(0.0),
            GuardConfig::default().with_tau(1.0),
            GuardConfig::default().with_tau(f64::NAN),
            GuardConfig::default().with_decay(0.0),
            GuardConfig::default().with_decay(1.5),
            GuardConfig::default().with_reward_range(0.0),
            GuardConfig::default().with_reward_range(f64::INFINITY),
            GuardConfig::default().with_override_epsilon(1.0),
            GuardConfig::default().with_override_epsilon(-0.1),
        ];
        for cfg in bad {
            assert!(
                matches!(cfg.validate(), Err(GuardError::InvalidConfig { .. })),
                "{cfg:?}"
            );
        }
    }

    #[test]
    fn switch_policy_byte_tags() {
        for p in [SwitchPolicy::Monotonic, SwitchPolicy::TwoSided] {
            assert_eq!(SwitchPolicy::from_byte(p.to_byte()), Some(p));
        }
        assert_eq!(SwitchPolicy::from_byte(7), None);
    }
}
