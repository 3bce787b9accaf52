//! Metrics hooks for protocol runs
//!
//! Counters for run outcomes, channel usage and sifting yield.
//!
//! ## Usage
//!
//! ```ignore
//! use qkd_bb84::metrics::Metrics;
//! use qkd_bb84::Bb84Service;
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(Metrics::new());
//! let service = Bb84Service::with_metrics(metrics.clone());
//! // ... run sessions ...
//! println!("sift yield: {:.3}", metrics.sift_yield());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ProtocolError;

/// Metrics collector for protocol runs
///
/// Thread-safe; concurrent runs may share one collector.
#[derive(Default)]
pub struct Metrics {
    /// Runs started
    pub runs_started: AtomicU64,
    /// Runs that produced a key
    pub keys_accepted: AtomicU64,
    /// Runs aborted by the security gate
    pub security_aborts: AtomicU64,
    /// Runs ended by an adapter failure
    pub channel_failures: AtomicU64,
    /// Runs that fell short of key material
    pub insufficient_material: AtomicU64,
    /// Runs rejected by configuration checks
    pub config_rejections: AtomicU64,
    /// Batches sent over the channel
    pub batches: AtomicU64,
    /// Raw transmissions sent
    pub raw_transmissions: AtomicU64,
    /// Positions that survived sifting
    pub sifted_bits: AtomicU64,
    /// Positions sacrificed to integrity sampling
    pub sampled_bits: AtomicU64,
    /// Mismatches found in samples
    pub sampled_errors: AtomicU64,
    /// Key bits delivered
    pub key_bits: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a run start
    pub fn record_run_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one measured and sifted batch
    pub fn record_batch(&self, transmissions: usize, sifted: usize) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.raw_transmissions
            .fetch_add(transmissions as u64, Ordering::Relaxed);
        self.sifted_bits.fetch_add(sifted as u64, Ordering::Relaxed);
    }

    /// Record an integrity sample
    pub fn record_sample(&self, sample_size: usize, errors: usize) {
        self.sampled_bits
            .fetch_add(sample_size as u64, Ordering::Relaxed);
        self.sampled_errors.fetch_add(errors as u64, Ordering::Relaxed);
    }

    /// Record a delivered key
    pub fn record_key_accepted(&self, key_bits: usize) {
        self.keys_accepted.fetch_add(1, Ordering::Relaxed);
        self.key_bits.fetch_add(key_bits as u64, Ordering::Relaxed);
    }

    /// Record a failed run by error kind
    pub fn record_failure(&self, error: &ProtocolError) {
        let counter = match error {
            ProtocolError::Configuration(_) => &self.config_rejections,
            ProtocolError::ChannelExhausted { .. } => &self.channel_failures,
            ProtocolError::SecurityViolation { .. } => &self.security_aborts,
            ProtocolError::InsufficientKeyMaterial { .. } => &self.insufficient_material,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::Relaxed),
            keys_accepted: self.keys_accepted.load(Ordering::Relaxed),
            security_aborts: self.security_aborts.load(Ordering::Relaxed),
            channel_failures: self.channel_failures.load(Ordering::Relaxed),
            insufficient_material: self.insufficient_material.load(Ordering::Relaxed),
            config_rejections: self.config_rejections.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            raw_transmissions: self.raw_transmissions.load(Ordering::Relaxed),
            sifted_bits: self.sifted_bits.load(Ordering::Relaxed),
            sampled_bits: self.sampled_bits.load(Ordering::Relaxed),
            sampled_errors: self.sampled_errors.load(Ordering::Relaxed),
            key_bits: self.key_bits.load(Ordering::Relaxed),
        }
    }

    /// Fraction of raw transmissions that survived sifting (≈ 0.5 for BB84)
    pub fn sift_yield(&self) -> f64 {
        let raw = self.raw_transmissions.load(Ordering::Relaxed);
        let sifted = self.sifted_bits.load(Ordering::Relaxed);
        if raw > 0 {
            sifted as f64 / raw as f64
        } else {
            0.0
        }
    }

    /// Mismatch ratio over every sample recorded so far
    pub fn aggregate_qber(&self) -> f64 {
        let sampled = self.sampled_bits.load(Ordering::Relaxed);
        let errors = self.sampled_errors.load(Ordering::Relaxed);
        if sampled > 0 {
            errors as f64 / sampled as f64
        } else {
            0.0
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        for counter in [
            &self.runs_started,
            &self.keys_accepted,
            &self.security_aborts,
            &self.channel_failures,
            &self.insufficient_material,
            &self.config_rejections,
            &self.batches,
            &self.raw_transmissions,
            &self.sifted_bits,
            &self.sampled_bits,
            &self.sampled_errors,
            &self.key_bits,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Runs started
    pub runs_started: u64,
    /// Runs that produced a key
    pub keys_accepted: u64,
    /// Gate aborts
    pub security_aborts: u64,
    /// Adapter failures
    pub channel_failures: u64,
    /// Short-material failures
    pub insufficient_material: u64,
    /// Rejected configurations
    pub config_rejections: u64,
    /// Batches sent
    pub batches: u64,
    /// Raw transmissions sent
    pub raw_transmissions: u64,
    /// Sifted positions
    pub sifted_bits: u64,
    /// Sampled positions
    pub sampled_bits: u64,
    /// Sampled mismatches
    pub sampled_errors: u64,
    /// Key bits delivered
    pub key_bits: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this trait to forward run statistics to an external system.
pub trait MetricsRecorder: Send + Sync {
    /// Record a run start
    fn record_run_started(&self);

    /// Record one measured and sifted batch
    fn record_batch(&self, transmissions: usize, sifted: usize);

    /// Record an integrity sample
    fn record_sample(&self, sample_size: usize, errors: usize);

    /// Record a delivered key
    fn record_key_accepted(&self, key_bits: usize);

    /// Record a failed run
    fn record_failure(&self, error: &ProtocolError);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_run_started(&self) {}
    fn record_batch(&self, _: usize, _: usize) {}
    fn record_sample(&self, _: usize, _: usize) {}
    fn record_key_accepted(&self, _: usize) {}
    fn record_failure(&self, _: &ProtocolError) {}
}

impl MetricsRecorder for Metrics {
    fn record_run_started(&self) {
        Metrics::record_run_started(self);
    }

    fn record_batch(&self, transmissions: usize, sifted: usize) {
        Metrics::record_batch(self, transmissions, sifted);
    }

    fn record_sample(&self, sample_size: usize, errors: usize) {
        Metrics::record_sample(self, sample_size, errors);
    }

    fn record_key_accepted(&self, key_bits: usize) {
        Metrics::record_key_accepted(self, key_bits);
    }

    fn record_failure(&self, error: &ProtocolError) {
        Metrics::record_failure(self, error);
    }
}
