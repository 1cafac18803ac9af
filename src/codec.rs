//! Save/resume for a [`SwitchController`].
//!
//! Two forms are provided:
//!
//! - [`serialize`] / [`deserialize`]: a fixed-length little-endian blob meant to
//!   be embedded in a host model's own save file. The round trip is bit-exact,
//!   so a resumed controller makes the same decisions as one that never stopped.
//! - [`ControllerSnapshot`]: a plain struct (serde-able behind the `serde`
//!   feature) for hosts that persist state as JSON or similar.
//!
//! Blob layout:
//!
//! ```text
//!   magic            4   b"BLG1"
//!   version          4   u32 = 1
//!   baseline_action  8   u64
//!   tau              8   f64
//!   decay            8   f64
//!   reward_range     8   f64
//!   override_eps     8   f64
//!   switch_policy    1   u8 (0 monotonic, 1 two-sided)
//!   baseline sums   24   3 x f64 (weighted_sum, weighted_sq_sum, sum_weights)
//!   policy sums     24   3 x f64
//!   baseline_in_use  1   u8 (0/1)
//!   round_index      8   u64
//! ```

use crate::{
    GuardConfig, GuardError, GuardMode, Result, SwitchController, SwitchPolicy, SwitchState,
    ValueEstimator,
};

const MAGIC: [u8; 4] = *b"BLG1";
const FORMAT_VERSION: u32 = 1;

/// Exact byte length produced by [`serialize`].
pub const ENCODED_LEN: usize = 4 + 4 + 8 + 4 * 8 + 1 + 3 * 8 + 3 * 8 + 1 + 8;

/// Encode `controller` as a fixed-length blob.
pub fn serialize(controller: &SwitchController) -> Vec<u8> {
    let mut out = Vec::with_capacity(ENCODED_LEN);
    encode_into(controller, &mut out);
    out
}

/// Append the encoding of `controller` to `out`.
pub fn encode_into(controller: &SwitchController, out: &mut Vec<u8>) {
    let cfg = controller.config();
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&(cfg.baseline_action as u64).to_le_bytes());
    for x in [cfg.tau, cfg.decay, cfg.reward_range, cfg.override_epsilon] {
        out.extend_from_slice(&x.to_le_bytes());
    }
    out.push(cfg.switch_policy.to_byte());
    for e in [controller.baseline_estimator(), controller.policy_estimator()] {
        for x in [e.weighted_sum(), e.weighted_sq_sum(), e.sum_weights()] {
            out.extend_from_slice(&x.to_le_bytes());
        }
    }
    out.push(u8::from(controller.baseline_in_use()));
    out.extend_from_slice(&controller.round_index().to_le_bytes());
}

/// Decode a blob produced by [`serialize`].
///
/// Fails with [`GuardError::CorruptState`] on any shape mismatch.
pub fn deserialize(bytes: &[u8]) -> Result<SwitchController> {
    if bytes.len() != ENCODED_LEN {
        return Err(GuardError::corrupt(format!(
            "expected {ENCODED_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    let mut r = Reader { buf: bytes, pos: 0 };

    if r.take::<4>()? != MAGIC {
        return Err(GuardError::corrupt("bad magic"));
    }
    let version = u32::from_le_bytes(r.take()?);
    if version != FORMAT_VERSION {
        return Err(GuardError::corrupt(format!(
            "unsupported format version {version}"
        )));
    }

    let baseline_action = usize::try_from(r.u64()?)
        .map_err(|_| GuardError::corrupt("baseline_action does not fit in usize"))?;
    let tau = r.f64()?;
    let decay = r.f64()?;
    let reward_range = r.f64()?;
    let override_epsilon = r.f64()?;
    let policy_byte = r.u8()?;
    let switch_policy = SwitchPolicy::from_byte(policy_byte)
        .ok_or_else(|| GuardError::corrupt(format!("unknown switch policy tag {policy_byte}")))?;
    let cfg = GuardConfig {
        baseline_action,
        tau,
        decay,
        reward_range,
        override_epsilon,
        switch_policy,
    };
    cfg.validate()
        .map_err(|e| GuardError::corrupt(format!("stored config rejected: {e}")))?;

    let baseline = r.estimator("baseline")?;
    let policy = r.estimator("policy")?;

    let mode = match r.u8()? {
        0 => GuardMode::PolicyActive,
        1 => GuardMode::BaselineActive,
        b => return Err(GuardError::corrupt(format!("baseline_in_use byte {b}"))),
    };
    let round_index = r.u64()?;
    debug_assert_eq!(r.pos, ENCODED_LEN);

    tracing::debug!(
        round_index,
        baseline_in_use = mode == GuardMode::BaselineActive,
        "guard state restored"
    );
    Ok(SwitchController::from_parts(
        cfg,
        baseline,
        policy,
        SwitchState { mode, round_index },
    ))
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.pos + N;
        let chunk: [u8; N] = self
            .buf
            .get(self.pos..end)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| GuardError::corrupt(format!("truncated at byte {}", self.pos)))?;
        self.pos = end;
        Ok(chunk)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take()?))
    }

    fn f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take()?))
    }

    fn estimator(&mut self, which: &str) -> Result<ValueEstimator> {
        let weighted_sum = self.f64()?;
        let weighted_sq_sum = self.f64()?;
        let sum_weights = self.f64()?;
        check_estimator(which, weighted_sum, weighted_sq_sum, sum_weights)?;
        Ok(ValueEstimator::from_parts(
            weighted_sum,
            weighted_sq_sum,
            sum_weights,
        ))
    }
}

fn check_estimator(which: &str, sum: f64, sq_sum: f64, weights: f64) -> Result<()> {
    if !(sum.is_finite() && sq_sum.is_finite() && weights.is_finite()) {
        return Err(GuardError::corrupt(format!(
            "{which} estimator has non-finite sums"
        )));
    }
    if weights < 0.0 || sq_sum < 0.0 {
        return Err(GuardError::corrupt(format!(
            "{which} estimator has negative weight or second moment"
        )));
    }
    Ok(())
}

/// Structured copy of everything a controller needs to resume.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerSnapshot {
    pub cfg: GuardConfig,
    pub baseline: ValueEstimator,
    pub policy: ValueEstimator,
    pub state: SwitchState,
}

impl SwitchController {
    /// Capture a snapshot of the current state.
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            cfg: *self.config(),
            baseline: *self.baseline_estimator(),
            policy: *self.policy_estimator(),
            state: self.state(),
        }
    }

    /// Restore a controller from a snapshot.
    ///
    /// The snapshot goes through the same checks as [`deserialize`].
    pub fn from_snapshot(snap: ControllerSnapshot) -> Result<Self> {
        snap.cfg
            .validate()
            .map_err(|e| GuardError::corrupt(format!("stored config rejected: {e}")))?;
        for (which, e) in [("baseline", &snap.baseline), ("policy", &snap.policy)] {
            check_estimator(which, e.weighted_sum(), e.weighted_sq_sum(), e.sum_weights())?;
        }
        tracing::debug!(
            round_index = snap.state.round_index,
            baseline_in_use = snap.state.baseline_in_use(),
            "guard state restored from snapshot"
        );
        Ok(Self::from_parts(
            snap.cfg,
            snap.baseline,
            snap.policy,
            snap.state,
        ))
    }
}
