//! Error types for the BB84 key distribution engine

use std::time::Duration;
use thiserror::Error;

/// Errors that end a protocol run
///
/// Every variant is a hard failure: no key material leaves a run that
/// produced one of these.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Invalid run parameters, detected before any channel use.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The quantum channel could not supply the requested transmissions.
    #[error("Channel exhausted at batch {batch}: {source}")]
    ChannelExhausted {
        /// 1-based batch number whose adapter call failed
        batch: usize,
        /// Adapter-side failure
        #[source]
        source: ChannelError,
    },

    /// Sampled QBER exceeded the configured threshold.
    #[error("Security violation: sampled QBER {qber:.4} exceeds threshold {threshold:.4}")]
    SecurityViolation {
        /// Measured QBER on the sample
        qber: f64,
        /// Configured threshold
        threshold: f64,
    },

    /// Sifting yield fell short of what the run needs.
    #[error("Insufficient key material: have {have}, need {need}")]
    InsufficientKeyMaterial {
        /// Bits available
        have: usize,
        /// Bits required
        need: usize,
    },
}

impl ProtocolError {
    /// True for a QBER-triggered abort.
    pub fn is_security_violation(&self) -> bool {
        matches!(self, Self::SecurityViolation { .. })
    }
}

/// Errors reported by a quantum channel adapter
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChannelError {
    /// Backend connection dropped mid-session.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Session transmission allowance spent.
    #[error("Session queue limit reached: {used}/{limit} transmissions")]
    QueueLimit {
        /// Transmissions already accepted
        used: u64,
        /// Session allowance
        limit: u64,
    },

    /// No reply within the per-batch deadline.
    #[error("Measurement timed out after {0:?}")]
    Timeout(Duration),

    /// Reply or request lengths disagree.
    #[error("Malformed measurement: expected {expected} bits, got {got}")]
    LengthMismatch {
        /// Length sent
        expected: usize,
        /// Length received
        got: usize,
    },

    /// Probability parameter outside `[0, 1]`.
    #[error("Invalid probability: {0} (must be between 0.0 and 1.0)")]
    InvalidProbability(f64),

    /// Any other backend-side failure.
    #[error("Backend error: {0}")]
    Backend(String),
}
