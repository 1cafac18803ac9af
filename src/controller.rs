//! The switch controller: the stateful "front door" of the guard.
//!
//! [`SwitchController`] owns both estimators and the switch state and exposes
//! a small interface to the host learning loop:
//!
//! ```text
//! let d = guard.observe_and_decide(action, prob, reward)?;  // after each labelled round
//! let out = guard.predict(&policy_scores)?;                 // before acting
//! let m = guard.metrics();                                  // for monitoring
//! ```
//!
//! Lifecycle:
//!
//! 1. **Policy active**: predictions pass through untouched while both value
//!    estimates accumulate.
//! 2. **Baseline active**: once the baseline's lower confidence bound beats the
//!    policy expectation, predictions collapse onto the baseline action. Under
//!    [`SwitchPolicy::Monotonic`] this is terminal until [`SwitchController::reset`].
//!
//! All mutation goes through `&mut self`; hosts that process examples in
//! parallel must serialize access to a controller themselves.

use crate::bound::lower_bound;
use crate::{
    ActionScore, Decision, GuardConfig, GuardError, Metrics, Result, SwitchPolicy,
    ValueEstimator,
};

/// Which distribution the host should act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GuardMode {
    /// Defer to the exploration policy.
    #[default]
    PolicyActive,
    /// Override with the baseline action.
    BaselineActive,
}

/// Switch state plus a diagnostic round counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchState {
    /// Current side of the switch.
    pub mode: GuardMode,
    /// Observed rounds (diagnostics only).
    pub round_index: u64,
}

impl SwitchState {
    /// True in [`GuardMode::BaselineActive`].
    pub fn baseline_in_use(&self) -> bool {
        self.mode == GuardMode::BaselineActive
    }
}

/// Baseline-vs-policy safety switch.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchController {
    cfg: GuardConfig,
    baseline: ValueEstimator,
    policy: ValueEstimator,
    state: SwitchState,
}

impl SwitchController {
    /// Create a controller in the policy-active state.
    pub fn new(cfg: GuardConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self::from_parts(
            cfg,
            ValueEstimator::new(),
            ValueEstimator::new(),
            SwitchState::default(),
        ))
    }

    pub(crate) fn from_parts(
        cfg: GuardConfig,
        baseline: ValueEstimator,
        policy: ValueEstimator,
        state: SwitchState,
    ) -> Self {
        Self {
            cfg,
            baseline,
            policy,
            state,
        }
    }

    /// Feed one labelled round and decide whether the baseline takes over.
    ///
    /// `chosen_action` is the action the exploration policy selected,
    /// `action_probability` the probability it assigned to that action, and
    /// `reward` the observed reward (negated cost). Invalid rounds are rejected
    /// before any state changes.
    pub fn observe_and_decide(
        &mut self,
        chosen_action: usize,
        action_probability: f64,
        reward: f64,
    ) -> Result<Decision> {
        if !(action_probability.is_finite() && action_probability > 0.0 && action_probability <= 1.0)
        {
            tracing::warn!(
                chosen_action,
                action_probability,
                "rejected round: probability outside (0, 1]"
            );
            return Err(GuardError::invalid_input(format!(
                "action_probability must be in (0, 1], got {action_probability}"
            )));
        }
        let policy_weight = 1.0 / action_probability;
        if !policy_weight.is_finite() {
            tracing::warn!(
                chosen_action,
                action_probability,
                "rejected round: importance weight overflows"
            );
            return Err(GuardError::invalid_input(format!(
                "action_probability {action_probability} is too small to invert"
            )));
        }
        if !reward.is_finite() {
            tracing::warn!(chosen_action, reward, "rejected round: non-finite reward");
            return Err(GuardError::invalid_input(format!(
                "reward must be finite, got {reward}"
            )));
        }

        let (mut policy, mut baseline) = (self.policy, self.baseline);
        if self.cfg.decay < 1.0 {
            policy.decay(self.cfg.decay);
            baseline.decay(self.cfg.decay);
        }
        let baseline_weight = if chosen_action == self.cfg.baseline_action {
            1.0
        } else {
            0.0
        };
        let (Some(policy), Some(baseline)) = (
            policy.checked_update(policy_weight, reward),
            baseline.checked_update(baseline_weight, reward),
        ) else {
            tracing::warn!(
                chosen_action,
                action_probability,
                reward,
                "rejected round: estimator sums would overflow"
            );
            return Err(GuardError::invalid_input(format!(
                "round (p={action_probability}, reward={reward}) would overflow the value estimates"
            )));
        };
        self.policy = policy;
        self.baseline = baseline;

        let lb = self.baseline_lowerbound();
        let pe = self.policy.mean();
        let before = self.state.mode;
        let baseline_wins = lb > pe;
        self.state.mode = match (before, self.cfg.switch_policy) {
            (GuardMode::PolicyActive, _) if baseline_wins => GuardMode::BaselineActive,
            (GuardMode::BaselineActive, SwitchPolicy::TwoSided) if !baseline_wins => {
                GuardMode::PolicyActive
            }
            (mode, _) => mode,
        };
        self.state.round_index = self.state.round_index.saturating_add(1);

        let switched = before != self.state.mode;
        if switched {
            tracing::info!(
                round = self.state.round_index,
                baseline_action = self.cfg.baseline_action,
                baseline_lowerbound = lb,
                policy_expectation = pe,
                mode = ?self.state.mode,
                "guard switched"
            );
        } else {
            tracing::trace!(
                round = self.state.round_index,
                chosen_action,
                baseline_lowerbound = lb,
                policy_expectation = pe,
                "round observed"
            );
        }

        Ok(Decision {
            baseline_in_use: self.state.baseline_in_use(),
            baseline_lowerbound: lb,
            policy_expectation: pe,
            round_index: self.state.round_index,
            switched,
        })
    }

    /// Shape the host's action distribution.
    ///
    /// While the policy is active, `candidates` are returned unchanged. Once the
    /// baseline is active, the baseline action comes first with score
    /// `1 - eps + eps / K` and every other candidate keeps its position with
    /// `eps / K`, where `eps` is [`GuardConfig::override_epsilon`].
    ///
    /// Fails with [`GuardError::InvalidInput`] when `candidates` is empty,
    /// lists an action more than once, or does not contain the baseline action.
    pub fn predict(&self, candidates: &[ActionScore]) -> Result<Vec<ActionScore>> {
        if candidates.is_empty() {
            return Err(GuardError::invalid_input("candidate action set is empty"));
        }
        let mut actions: Vec<usize> = candidates.iter().map(|c| c.action).collect();
        actions.sort_unstable();
        if let Some(dup) = actions.windows(2).find(|w| w[0] == w[1]) {
            return Err(GuardError::invalid_input(format!(
                "action {} appears more than once among the candidates",
                dup[0]
            )));
        }
        let baseline = self.cfg.baseline_action;
        if actions.binary_search(&baseline).is_err() {
            return Err(GuardError::invalid_input(format!(
                "baseline action {baseline} is not among the {} candidates",
                candidates.len()
            )));
        }
        if !self.state.baseline_in_use() {
            return Ok(candidates.to_vec());
        }

        let eps = self.cfg.override_epsilon;
        let floor = eps / candidates.len() as f64;
        let mut out = Vec::with_capacity(candidates.len());
        out.push(ActionScore::new(baseline, 1.0 - eps + floor));
        out.extend(
            candidates
                .iter()
                .filter(|c| c.action != baseline)
                .map(|c| ActionScore::new(c.action, floor)),
        );
        Ok(out)
    }

    /// Current derived state. Pure read.
    pub fn metrics(&self) -> Metrics {
        Metrics {
            baseline_in_use: self.state.baseline_in_use(),
            baseline_lowerbound: self.baseline_lowerbound(),
            policy_expectation: self.policy.mean(),
            round_index: self.state.round_index,
            baseline_effective_count: self.baseline.effective_count(),
        }
    }

    /// Forget everything and return to the policy-active state.
    ///
    /// The only way out of [`GuardMode::BaselineActive`] under
    /// [`SwitchPolicy::Monotonic`].
    pub fn reset(&mut self) {
        tracing::info!(
            round = self.state.round_index,
            was_baseline_in_use = self.state.baseline_in_use(),
            "guard reset"
        );
        self.baseline = ValueEstimator::new();
        self.policy = ValueEstimator::new();
        self.state = SwitchState::default();
    }

    /// True once the baseline has taken over.
    pub fn baseline_in_use(&self) -> bool {
        self.state.baseline_in_use()
    }

    /// Rounds observed since construction or the last reset.
    pub fn round_index(&self) -> u64 {
        self.state.round_index
    }

    /// The configuration this controller was built with.
    pub fn config(&self) -> &GuardConfig {
        &self.cfg
    }

    /// Current switch state.
    pub fn state(&self) -> SwitchState {
        self.state
    }

    /// Value estimate of the baseline action.
    pub fn baseline_estimator(&self) -> &ValueEstimator {
        &self.baseline
    }

    /// Importance-weighted value estimate of the exploration policy.
    pub fn policy_estimator(&self) -> &ValueEstimator {
        &self.policy
    }

    fn baseline_lowerbound(&self) -> f64 {
        lower_bound(&self.baseline, self.cfg.tau, self.cfg.reward_range)
    }
}

impl Default for SwitchController {
    fn default() -> Self {
        Self::from_parts(
            GuardConfig::default(),
            ValueEstimator::new(),
            ValueEstimator::new(),
            SwitchState::default(),
        )
    }
}
