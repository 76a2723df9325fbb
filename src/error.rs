//! Error types for the threshold engine.
//!
//! Every failure is terminal for the call that raised it. Messages carry the
//! violated constraint (counts, indices, lengths) but never share values, key
//! bytes or plaintext.

use thiserror::Error;

/// The Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, TssError>;

#[derive(Debug, Error)]
pub enum TssError {
    #[error("invalid threshold: {threshold} of {total} (need 2 <= threshold <= total <= 255)")]
    InvalidThreshold { threshold: usize, total: usize },

    #[error("secret length mismatch: expected {expected} bytes, got {actual}")]
    SecretLengthMismatch { expected: usize, actual: usize },

    #[error("insufficient shares: required {required}, provided {provided}")]
    InsufficientShares { required: usize, provided: usize },

    #[error("duplicate share index {index}")]
    DuplicateShare { index: u32 },

    #[error("share index {index} is outside the field (must be in 1..=255)")]
    FieldViolation { index: u32 },

    #[error("authentication failed: wrong or insufficient shares, or tampered ciphertext")]
    AuthenticationFailure,

    #[error("{capability} is unavailable: {remediation}")]
    CapabilityUnavailable {
        capability: &'static str,
        remediation: &'static str,
    },

    #[error("invalid field operation: {0}")]
    InvalidOperation(&'static str),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl TssError {
    /// Raised when the crate was built without the `sss` feature.
    pub fn sharing_unavailable() -> Self {
        Self::CapabilityUnavailable {
            capability: "threshold secret sharing",
            remediation: "rebuild shard-tss with the `sss` feature enabled \
                          (cargo build --features sss)",
        }
    }

    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Only these two conditions are meant to reach an end user; everything
    /// else points at an integration fault in the calling layer.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailure | Self::CapabilityUnavailable { .. }
        )
    }
}
