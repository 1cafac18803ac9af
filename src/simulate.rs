//! Seedable logged-bandit simulation for exercising a guard end to end.
//!
//! The simulator plays the role of the host pipeline: a fixed logging
//! distribution picks an action each round, the reward table (plus optional
//! Gaussian noise) scores it, and the result is handed to a
//! [`SwitchController`]. Swapping the reward table mid-run models a regime
//! change while the (frozen) logging policy keeps its old preferences.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::{Decision, GuardError, Result, SwitchController};

/// One round as the host pipeline would report it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoggedRound {
    pub action: usize,
    pub probability: f64,
    pub reward: f64,
}

/// Fixed-distribution logging policy with a swappable reward table.
#[derive(Debug, Clone)]
pub struct LoggedBanditSim {
    probs: Vec<f64>,
    rewards: Vec<f64>,
    noise: Option<Normal<f64>>,
    rng: StdRng,
}

impl LoggedBanditSim {
    /// `probs` must be a distribution (non-negative, summing to 1 within 1e-9)
    /// with one entry per element of `mean_rewards`. `noise_sd` must be finite
    /// and non-negative; `0` gives noiseless rewards.
    pub fn new(probs: Vec<f64>, mean_rewards: Vec<f64>, noise_sd: f64, seed: u64) -> Result<Self> {
        if probs.is_empty() || probs.len() != mean_rewards.len() {
            return Err(GuardError::invalid_input(format!(
                "need one probability per reward, got {} and {}",
                probs.len(),
                mean_rewards.len()
            )));
        }
        if probs.iter().any(|p| !(p.is_finite() && *p >= 0.0)) {
            return Err(GuardError::invalid_input(
                "logging probabilities must be finite and non-negative",
            ));
        }
        let total: f64 = probs.iter().sum();
        if (total - 1.0).abs() > 1e-9 {
            return Err(GuardError::invalid_input(format!(
                "logging probabilities sum to {total}, not 1"
            )));
        }
        if mean_rewards.iter().any(|r| !r.is_finite()) {
            return Err(GuardError::invalid_input("rewards must be finite"));
        }
        if !(noise_sd.is_finite() && noise_sd >= 0.0) {
            return Err(GuardError::invalid_input(format!(
                "noise_sd must be finite and non-negative, got {noise_sd}"
            )));
        }
        let noise = if noise_sd > 0.0 {
            Some(Normal::new(0.0, noise_sd).map_err(|e| {
                GuardError::invalid_input(format!("noise_sd {noise_sd}: {e}"))
            })?)
        } else {
            None
        };
        Ok(Self {
            probs,
            rewards: mean_rewards,
            noise,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Replace the reward table (regime change). Length must stay the same.
    pub fn set_rewards(&mut self, mean_rewards: Vec<f64>) -> Result<()> {
        if mean_rewards.len() != self.probs.len() || mean_rewards.iter().any(|r| !r.is_finite()) {
            return Err(GuardError::invalid_input(
                "reward table must keep its length and be finite",
            ));
        }
        self.rewards = mean_rewards;
        Ok(())
    }

    /// Draw the next logged round.
    pub fn next_round(&mut self) -> LoggedRound {
        let u: f64 = self.rng.random();
        let mut cdf = 0.0;
        // Numerical fallback: last arm with positive mass.
        let mut action = self
            .probs
            .iter()
            .rposition(|p| *p > 0.0)
            .unwrap_or(self.probs.len() - 1);
        for (i, p) in self.probs.iter().enumerate() {
            cdf += *p;
            if *p > 0.0 && u < cdf {
                action = i;
                break;
            }
        }
        let noise = self
            .noise
            .map(|n| n.sample(&mut self.rng))
            .unwrap_or(0.0);
        LoggedRound {
            action,
            probability: self.probs[action],
            reward: self.rewards[action] + noise,
        }
    }

    /// Drive `guard` for `rounds` rounds, returning the last decision.
    pub fn feed(&mut self, guard: &mut SwitchController, rounds: usize) -> Result<Option<Decision>> {
        let mut last = None;
        for _ in 0..rounds {
            let r = self.next_round();
            last = Some(guard.observe_and_decide(r.action, r.probability, r.reward)?);
        }
        Ok(last)
    }
}
