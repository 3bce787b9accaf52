//! Key Distribution Service
//!
//! Orchestrates one BB84 run: accumulate, sample, gate, assemble.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

use super::accumulator::BatchAccumulator;
use crate::adapters::build_channel;
use crate::algorithms::{assemble_key, estimate_qber, protocol_rng, SecurityGate};
use crate::domain::{
    invariant_key_length, invariant_sufficient_sifted, BB84Result, ProtocolConfig,
};
use crate::error::ProtocolError;
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{KeyDistributionApi, QuantumChannelAdapter};

/// BB84 service implementation
///
/// Stateless between runs apart from the metrics sink; concurrent runs each
/// get their own RNG and channel session.
pub struct Bb84Service {
    metrics: Arc<dyn MetricsRecorder>,
}

impl Default for Bb84Service {
    fn default() -> Self {
        Self::new()
    }
}

impl Bb84Service {
    /// Create a service without metrics
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Create a service reporting to `metrics`
    pub fn with_metrics(metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self { metrics }
    }

    /// Run one session over a caller-supplied channel.
    ///
    /// `config.channel` is ignored; everything else applies.
    pub async fn run_with_channel<C: QuantumChannelAdapter + ?Sized>(
        &self,
        config: &ProtocolConfig,
        channel: &C,
    ) -> Result<BB84Result, ProtocolError> {
        self.metrics.record_run_started();

        let span = info_span!(
            "bb84_run",
            key_length = config.key_length,
            sample_size = config.sample_size,
            channel = channel.name()
        );
        let outcome = self.execute(config, channel).instrument(span).await;

        match &outcome {
            Ok(result) => self.metrics.record_key_accepted(result.key_bits.len()),
            Err(e) => self.metrics.record_failure(e),
        }
        outcome
    }

    async fn execute<C: QuantumChannelAdapter + ?Sized>(
        &self,
        config: &ProtocolConfig,
        channel: &C,
    ) -> Result<BB84Result, ProtocolError> {
        config.validate()?;

        info!(
            batch_size = config.batch_size,
            qber_threshold = config.qber_threshold,
            seeded = config.seed.is_some(),
            "Starting BB84 run"
        );

        let mut rng = protocol_rng(config.seed);

        let accumulation = BatchAccumulator::new(channel, config)
            .run(&mut rng, self.metrics.as_ref())
            .await?;

        invariant_sufficient_sifted(
            accumulation.sifted.len(),
            config.key_length,
            config.sample_size,
        )?;

        let report = estimate_qber(&accumulation.sifted, config.sample_size, &mut rng)?;
        self.metrics.record_sample(report.sample_size(), report.errors);

        let mut gate = SecurityGate::new(config.qber_threshold);
        if let Err(e) = gate.evaluate(&report) {
            // accumulation and report drop here; no key material escapes
            warn!(
                qber = report.qber,
                threshold = gate.threshold(),
                sifted = accumulation.sifted.len(),
                "QBER above threshold, aborting run"
            );
            return Err(e);
        }

        let result = assemble_key(
            accumulation.sifted,
            report,
            config.key_length,
            accumulation.raw_transmissions,
        )?;
        debug_assert!(invariant_key_length(&result, config.key_length));

        info!(
            state = ?gate.state(),
            qber = result.qber_sample,
            raw_transmissions = result.raw_transmissions,
            batches = accumulation.batches,
            sifted = result.sifted_size_before_sample,
            "Key accepted"
        );

        Ok(result)
    }
}

#[async_trait]
impl KeyDistributionApi for Bb84Service {
    async fn generate_key(&self, config: &ProtocolConfig) -> Result<BB84Result, ProtocolError> {
        let channel = match config
            .validate()
            .and_then(|()| build_channel(&config.channel, config.seed))
        {
            Ok(channel) => channel,
            Err(e) => {
                self.metrics.record_failure(&e);
                return Err(e);
            }
        };

        self.run_with_channel(config, &channel).await
    }
}
