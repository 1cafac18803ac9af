//! Error type for the guard.
//!
//! Only three things can go wrong: a caller hands in a degenerate round or
//! candidate set, a persisted blob does not match the expected layout, or a
//! configuration is out of range. Numeric edge cases (zero weights, zero
//! variance) are defined behavior and never surface here.

/// Errors surfaced by [`SwitchController`](crate::SwitchController) and the codec.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GuardError {
    /// A round or prediction request was rejected before touching any state.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the input.
        reason: String,
    },

    /// A persisted blob has the wrong shape; no partial recovery is attempted.
    #[error("corrupt guard state: {reason}")]
    CorruptState {
        /// Which check failed while decoding.
        reason: String,
    },

    /// A [`GuardConfig`](crate::GuardConfig) field is out of range.
    #[error("invalid guard config: {reason}")]
    InvalidConfig {
        /// Which field failed validation.
        reason: String,
    },
}

impl GuardError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptState {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_reason() {
        let e = GuardError::invalid_input("action_probability must be in (0, 1], got 0");
        assert_eq!(
            e.to_string(),
            "invalid input: action_probability must be in (0, 1], got 0"
        );
        let e = GuardError::corrupt("expected 106 bytes, got 3");
        assert!(e.to_string().starts_with("corrupt guard state:"));
    }
}
