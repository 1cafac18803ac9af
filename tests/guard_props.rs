//! Property tests over simulated logged traffic.

#![cfg(feature = "stochastic")]

use baseline_guard::{
    deserialize, lower_bound, serialize, GuardConfig, LoggedBanditSim, SwitchController,
    SwitchPolicy,
};
use proptest::prelude::*;

fn sim(seed: u64, probs: [f64; 4], rewards: [f64; 4], noise: f64) -> LoggedBanditSim {
    LoggedBanditSim::new(probs.to_vec(), rewards.to_vec(), noise, seed).unwrap()
}

fn probs_strategy() -> impl Strategy<Value = [f64; 4]> {
    proptest::array::uniform4(0.05f64..1.0).prop_map(|w| {
        let s: f64 = w.iter().sum();
        [w[0] / s, w[1] / s, w[2] / s, 1.0 - (w[0] + w[1] + w[2]) / s]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn effective_counts_never_decrease(
        seed in any::<u64>(),
        probs in probs_strategy(),
        rewards in proptest::array::uniform4(-1.0f64..1.0),
        rounds in 1usize..300,
    ) {
        let mut s = sim(seed, probs, rewards, 0.1);
        let mut g = SwitchController::new(GuardConfig::default()).unwrap();
        let (mut last_b, mut last_p) = (0.0, 0.0);
        for _ in 0..rounds {
            let r = s.next_round();
            g.observe_and_decide(r.action, r.probability, r.reward).unwrap();
            let b = g.baseline_estimator().effective_count();
            let p = g.policy_estimator().effective_count();
            prop_assert!(b >= last_b);
            prop_assert!(p >= last_p);
            last_b = b;
            last_p = p;
        }
    }

    #[test]
    fn baseline_adoption_never_reverses(
        seed in any::<u64>(),
        tau in 0.5f64..0.999,
        first in proptest::array::uniform4(0.0f64..1.0),
        second in proptest::array::uniform4(0.0f64..1.0),
        rounds in 1usize..400,
    ) {
        let mut s = sim(seed, [0.4, 0.2, 0.2, 0.2], first, 0.05);
        let mut g = SwitchController::new(GuardConfig::default().with_tau(tau)).unwrap();
        let mut adopted = false;
        for i in 0..rounds {
            if i == rounds / 2 {
                s.set_rewards(second.to_vec()).unwrap();
            }
            let r = s.next_round();
            let d = g.observe_and_decide(r.action, r.probability, r.reward).unwrap();
            if adopted {
                prop_assert!(d.baseline_in_use, "released at round {}", i);
            }
            adopted |= d.baseline_in_use;
            prop_assert_eq!(d.baseline_in_use, g.metrics().baseline_in_use);
        }
    }

    #[test]
    fn bound_stays_below_baseline_mean(
        seed in any::<u64>(),
        probs in probs_strategy(),
        rewards in proptest::array::uniform4(-2.0f64..2.0),
        rounds in 1usize..300,
    ) {
        let mut s = sim(seed, probs, rewards, 0.2);
        let mut g = SwitchController::new(GuardConfig::default()).unwrap();
        s.feed(&mut g, rounds).unwrap();
        let e = g.baseline_estimator();
        let m = g.metrics();
        prop_assert!(m.baseline_lowerbound <= e.mean());
        prop_assert!(lower_bound(e, 0.9, 1.0) >= lower_bound(e, 0.999, 1.0));
    }

    #[test]
    fn resume_at_any_round_is_invisible(
        seed in any::<u64>(),
        probs in probs_strategy(),
        rewards in proptest::array::uniform4(0.0f64..1.0),
        rounds in 2usize..200,
        split_frac in 0.0f64..1.0,
        two_sided in any::<bool>(),
    ) {
        let split = ((rounds as f64) * split_frac) as usize;
        let policy = if two_sided { SwitchPolicy::TwoSided } else { SwitchPolicy::Monotonic };
        let cfg = GuardConfig::default()
            .with_tau(0.9)
            .with_decay(0.999)
            .with_switch_policy(policy);

        let mut straight = SwitchController::new(cfg).unwrap();
        let mut resumed = SwitchController::new(cfg).unwrap();
        let mut s = sim(seed, probs, rewards, 0.1);
        for i in 0..rounds {
            let r = s.next_round();
            let d1 = straight.observe_and_decide(r.action, r.probability, r.reward).unwrap();
            let d2 = resumed.observe_and_decide(r.action, r.probability, r.reward).unwrap();
            prop_assert_eq!(d1, d2);
            if i == split {
                resumed = deserialize(&serialize(&resumed)).unwrap();
            }
        }
        prop_assert_eq!(straight.metrics(), resumed.metrics());
    }
}
