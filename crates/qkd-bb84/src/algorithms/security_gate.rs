//! # Security Gate
//!
//! One-shot QBER decision: `Checking -> KeyAccepted | Aborted`.

use crate::domain::{GateState, IntegrityReport};
use crate::error::ProtocolError;

/// QBER threshold check for a single run.
#[derive(Clone, Debug)]
pub struct SecurityGate {
    threshold: f64,
    state: GateState,
    aborted_at: Option<f64>,
}

impl SecurityGate {
    /// Create a gate in the `Checking` state.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            state: GateState::Checking,
            aborted_at: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Configured threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Decide on an integrity report.
    ///
    /// An empty sample means no check was requested and the gate accepts.
    /// A QBER strictly above the threshold aborts. The decision is final:
    /// later calls ignore their report and repeat the first outcome.
    pub fn evaluate(&mut self, report: &IntegrityReport) -> Result<(), ProtocolError> {
        if self.state.is_terminal() {
            return self.decision();
        }

        if report.sample_size() > 0 && report.qber > self.threshold {
            self.state = GateState::Aborted;
            self.aborted_at = Some(report.qber);
        } else {
            self.state = GateState::KeyAccepted;
        }
        self.decision()
    }

    fn decision(&self) -> Result<(), ProtocolError> {
        match self.aborted_at {
            Some(qber) => Err(ProtocolError::SecurityViolation {
                qber,
                threshold: self.threshold,
            }),
            None => Ok(()),
        }
    }
}
