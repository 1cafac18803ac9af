//! Save/resume walkthrough: run a guard, persist it mid-stream, keep going.
//!
//! The logging policy keeps 85% of its traffic on arm 3 while arm 0 (the
//! baseline) is actually the better choice. Halfway through, the guard is
//! written to bytes and restored, exactly as a host would embed it in its own
//! model file.
//!
//! Run with:
//!   cargo run --example save_resume

use baseline_guard::{
    deserialize, serialize, ActionScore, GuardConfig, LoggedBanditSim, SwitchController,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = GuardConfig::default()
        .with_tau(0.995)
        .with_override_epsilon(0.05);
    let mut guard = SwitchController::new(cfg)?;
    let mut sim = LoggedBanditSim::new(
        vec![0.05, 0.05, 0.05, 0.85],
        vec![1.0, 0.3, 0.3, 0.1],
        0.05,
        37,
    )?;

    for block in 0..6 {
        if block == 3 {
            let blob = serialize(&guard);
            println!("-- saved {} bytes, reloading --", blob.len());
            guard = deserialize(&blob)?;
        }
        sim.feed(&mut guard, 250)?;
        let m = guard.metrics();
        println!(
            "round {:>5}  baseline_in_use={}  lb={:>8.4}  policy={:.4}",
            m.round_index,
            u8::from(m.baseline_in_use),
            m.baseline_lowerbound,
            m.policy_expectation
        );
    }

    let policy_scores = vec![
        ActionScore::new(3, 0.9625),
        ActionScore::new(0, 0.0125),
        ActionScore::new(1, 0.0125),
        ActionScore::new(2, 0.0125),
    ];
    for a in guard.predict(&policy_scores)? {
        println!("action {}  score {:.4}", a.action, a.score);
    }
    Ok(())
}
