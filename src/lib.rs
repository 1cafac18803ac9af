//! `baseline_guard`: a statistical safety switch for contextual-bandit exploration.
//!
//! A freshly started (or badly tuned) exploration policy can do worse than a
//! known-safe default arm. This crate keeps two running value estimates, one
//! for a fixed **baseline** action and one for the **exploration policy**, and
//! overrides the policy with the baseline as soon as a lower confidence bound
//! on the baseline's value exceeds the policy's estimated value.
//!
//! **Per round** (labelled examples only):
//! - the policy estimate takes the observed reward with inverse-propensity
//!   weight `1 / p(chosen_action)`;
//! - the baseline estimate takes the reward with weight `1` when the chosen
//!   action *is* the baseline, `0` otherwise;
//! - the baseline's lower bound ([`lower_bound`]) is compared to the policy
//!   mean, and the switch flips when the bound is strictly larger.
//!
//! **Goals:**
//! - **Deterministic**: same config + same rounds → same decisions, including
//!   across a save/resume boundary ([`serialize`] / [`deserialize`]).
//! - **Conservative by default**: `tau = 0.999`, monotonic switching.
//! - **Small surface**: the host owns the exploration policy, features and
//!   learning; the guard only sees `(action, probability, reward)` and shapes
//!   the final action-score list in [`SwitchController::predict`].
//!
//! **Non-goals:**
//! - Computing the policy's action distribution or features.
//! - Choosing among several baselines or adapting which arm is the baseline.
//!
//! # Example
//!
//! ```rust
//! use baseline_guard::{ActionScore, GuardConfig, SwitchController};
//!
//! let mut guard = SwitchController::new(GuardConfig::default().with_tau(0.9)).unwrap();
//!
//! // Baseline (arm 0) keeps paying 1.0; the policy's other pick pays nothing.
//! for i in 0..200 {
//!     let (arm, reward) = if i % 2 == 0 { (0, 1.0) } else { (1, 0.0) };
//!     guard.observe_and_decide(arm, 0.5, reward).unwrap();
//! }
//! assert!(guard.baseline_in_use());
//!
//! let policy_scores = vec![ActionScore::new(1, 0.9), ActionScore::new(0, 0.1)];
//! let out = guard.predict(&policy_scores).unwrap();
//! assert_eq!(out[0].action, 0);
//! ```
//!
//! # Choosing `tau`
//!
//! The bound margin scales with `ln(1 / (1 - tau))`. The default `0.999`
//! waits for more evidence; `0.995` adopts a clearly better baseline sooner.
//! Enable [`GuardConfig::decay`] when the environment drifts and old rounds
//! should stop counting.

#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod config;
pub use config::*;

mod estimator;
pub use estimator::*;

pub mod bound;
pub use bound::{lower_bound, lower_bound_default_range};

mod decision;
pub use decision::*;

mod controller;
pub use controller::*;

pub mod codec;
pub use codec::{deserialize, serialize, ControllerSnapshot, ENCODED_LEN};

#[cfg(feature = "stochastic")]
mod simulate;
#[cfg(feature = "stochastic")]
pub use simulate::*;

pub const BASELINE_GUARD_VERSION: &str = env!("CARGO_PKG_VERSION");
