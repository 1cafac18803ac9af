//! Decision and reporting types.
//!
//! A [`Decision`] is the audit-friendly record of a single observed round;
//! [`Metrics`] is the same information as a pure read, flattened into the
//! named key/value form monitoring consumers expect.

use std::collections::BTreeMap;

/// Metric key: `1` while predictions are overridden by the baseline, else `0`.
pub const METRIC_BASELINE_IN_USE: &str = "baseline_in_use";
/// Metric key: current lower confidence bound on the baseline's value.
pub const METRIC_BASELINE_LOWERBOUND: &str = "baseline_lowerbound";
/// Metric key: current estimate of the exploration policy's value.
pub const METRIC_POLICY_EXPECTATION: &str = "policy_expectation";
/// Metric key: number of rounds observed.
pub const METRIC_ROUND_INDEX: &str = "round_index";
/// Metric key: accumulated importance weight behind the baseline estimate.
pub const METRIC_BASELINE_EFFECTIVE_COUNT: &str = "baseline_effective_count";

/// Outcome of [`SwitchController::observe_and_decide`](crate::SwitchController::observe_and_decide).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    /// Whether predictions are now overridden by the baseline action.
    pub baseline_in_use: bool,
    /// Lower confidence bound on the baseline's value after this round.
    pub baseline_lowerbound: f64,
    /// Policy value estimate after this round.
    pub policy_expectation: f64,
    /// Rounds observed so far, this one included.
    pub round_index: u64,
    /// True only on the round the switch state changed.
    pub switched: bool,
}

/// One entry of an action-score distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionScore {
    /// Action index.
    pub action: usize,
    /// Probability (or score) the host assigns to `action`.
    pub score: f64,
}

impl ActionScore {
    /// Pair an action with its score.
    pub fn new(action: usize, score: f64) -> Self {
        Self { action, score }
    }
}

/// A single metric value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

impl MetricValue {
    /// Integer payload, if this is an integer metric.
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            Self::Float(_) => None,
        }
    }

    /// Float payload, if this is a float metric.
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            Self::Int(_) => None,
        }
    }
}

/// Point-in-time view of the guard's derived state.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metrics {
    pub baseline_in_use: bool,
    pub baseline_lowerbound: f64,
    pub policy_expectation: f64,
    pub round_index: u64,
    pub baseline_effective_count: f64,
}

impl Metrics {
    /// Flatten into named metrics.
    ///
    /// `baseline_in_use`, `baseline_lowerbound` and `policy_expectation` are
    /// always present under exactly those names.
    pub fn to_map(&self) -> BTreeMap<&'static str, MetricValue> {
        BTreeMap::from([
            (
                METRIC_BASELINE_IN_USE,
                MetricValue::Int(i64::from(self.baseline_in_use)),
            ),
            (
                METRIC_BASELINE_LOWERBOUND,
                MetricValue::Float(self.baseline_lowerbound),
            ),
            (
                METRIC_POLICY_EXPECTATION,
                MetricValue::Float(self.policy_expectation),
            ),
            (
                METRIC_ROUND_INDEX,
                MetricValue::Int(i64::try_from(self.round_index).unwrap_or(i64::MAX)),
            ),
            (
                METRIC_BASELINE_EFFECTIVE_COUNT,
                MetricValue::Float(self.baseline_effective_count),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_map_uses_stable_names() {
        let m = Metrics {
            baseline_in_use: true,
            baseline_lowerbound: 0.5,
            policy_expectation: 0.25,
            round_index: 9,
            baseline_effective_count: 3.0,
        };
        let map = m.to_map();
        assert_eq!(map["baseline_in_use"].as_int(), Some(1));
        assert_eq!(map["baseline_lowerbound"].as_float(), Some(0.5));
        assert_eq!(map["policy_expectation"].as_float(), Some(0.25));
        assert_eq!(map["round_index"].as_int(), Some(9));
        assert_eq!(map["baseline_effective_count"].as_float(), Some(3.0));
        assert_eq!(map["baseline_in_use"].as_float(), None);
    }

    #[test]
    fn baseline_not_in_use_reports_zero() {
        let m = Metrics {
            baseline_in_use: false,
            baseline_lowerbound: f64::NEG_INFINITY,
            policy_expectation: 0.0,
            round_index: 0,
            baseline_effective_count: 0.0,
        };
        assert_eq!(m.to_map()[METRIC_BASELINE_IN_USE], MetricValue::Int(0));
    }
}
