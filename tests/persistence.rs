//! Save/resume must not change the decision sequence.

use baseline_guard::{deserialize, serialize, GuardConfig, Metrics, SwitchController};

const PROBS: [f64; 4] = [0.05, 0.05, 0.05, 0.85];
const REWARDS: [f64; 4] = [0.1, 0.3, 0.3, 1.0];

fn action_at(i: usize) -> usize {
    // A less regular schedule than a plain cycle, still deterministic.
    match (i * 7 + i / 3) % 20 {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 3,
    }
}

/// Run `steps` rounds, saving and reloading the guard after round `switch_step`.
fn run_simulation(cfg: GuardConfig, steps: usize, switch_step: Option<usize>) -> Metrics {
    let mut g = SwitchController::new(cfg).unwrap();
    for i in 0..steps {
        let a = action_at(i);
        g.observe_and_decide(a, PROBS[a], REWARDS[a]).unwrap();
        if Some(i) == switch_step {
            let blob = serialize(&g);
            drop(g);
            g = deserialize(&blob).unwrap();
        }
    }
    g.metrics()
}

#[test]
fn save_load_matches_uninterrupted_run() {
    let m1 = run_simulation(GuardConfig::default(), 50, None);
    let m2 = run_simulation(GuardConfig::default(), 50, Some(20));
    assert_eq!(m1.baseline_in_use, m2.baseline_in_use);
    assert_eq!(
        m1.baseline_lowerbound.to_bits(),
        m2.baseline_lowerbound.to_bits()
    );
    assert_eq!(
        m1.policy_expectation.to_bits(),
        m2.policy_expectation.to_bits()
    );
    assert_eq!(m1, m2);
}

#[test]
fn save_load_at_every_split_point() {
    let cfg = GuardConfig::default().with_tau(0.95).with_decay(0.995);
    let reference = run_simulation(cfg, 60, None);
    for split in 0..60 {
        assert_eq!(run_simulation(cfg, 60, Some(split)), reference, "split={split}");
    }
}

#[test]
fn resumed_guard_keeps_its_config() {
    let cfg = GuardConfig::default()
        .with_baseline_action(2)
        .with_tau(0.97)
        .with_override_epsilon(0.1);
    let mut g = SwitchController::new(cfg).unwrap();
    g.observe_and_decide(2, 0.5, 0.4).unwrap();
    let back = deserialize(&serialize(&g)).unwrap();
    assert_eq!(back.config(), &cfg);
    assert_eq!(back.round_index(), 1);
}

#[test]
fn truncated_blob_is_a_load_error() {
    let blob = serialize(&SwitchController::default());
    let err = deserialize(&blob[..blob.len() / 2]).unwrap_err();
    assert!(err.to_string().contains("corrupt"), "{err}");
}

#[cfg(feature = "serde")]
#[test]
fn snapshot_survives_json() {
    let mut g = SwitchController::new(GuardConfig::default().with_tau(0.9)).unwrap();
    for i in 0..30 {
        let a = action_at(i);
        g.observe_and_decide(a, PROBS[a], REWARDS[a]).unwrap();
    }
    let json = serde_json::to_string(&g.snapshot()).unwrap();
    let snap: baseline_guard::ControllerSnapshot = serde_json::from_str(&json).unwrap();
    let back = SwitchController::from_snapshot(snap).unwrap();
    assert_eq!(back.metrics(), g.metrics());
}
