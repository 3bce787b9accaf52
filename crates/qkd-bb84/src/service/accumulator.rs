//! Batch Accumulator
//!
//! Pulls fixed-size batches through the channel until enough sifted bits
//! exist. Each batch is generated, measured and sifted before the next one is
//! requested, because the stopping condition depends on the running count.

use rand::Rng;
use std::time::Duration;
use tracing::{debug, error};

use crate::algorithms::{generate_batch, sift};
use crate::domain::{Bit, PreparedBatch, ProtocolConfig, SiftedSequence};
use crate::error::{ChannelError, ProtocolError};
use crate::metrics::MetricsRecorder;
use crate::ports::QuantumChannelAdapter;

/// Sifted material and channel usage of one accumulation.
#[derive(Debug)]
pub struct Accumulation {
    /// Sifted pairs across all batches, in transmission order
    pub sifted: SiftedSequence,
    /// Sum of all batch sizes sent
    pub raw_transmissions: u64,
    /// Batches sent
    pub batches: usize,
}

/// Drives generator and channel batch by batch.
pub struct BatchAccumulator<'a, C: QuantumChannelAdapter + ?Sized> {
    channel: &'a C,
    batch_size: usize,
    required: usize,
    max_batches: Option<usize>,
    batch_timeout: Option<Duration>,
}

impl<'a, C: QuantumChannelAdapter + ?Sized> BatchAccumulator<'a, C> {
    /// Accumulator for `config.required_sifted()` bits over `channel`.
    pub fn new(channel: &'a C, config: &ProtocolConfig) -> Self {
        Self {
            channel,
            batch_size: config.batch_size,
            required: config.required_sifted(),
            max_batches: config.max_batches,
            batch_timeout: config.batch_timeout,
        }
    }

    /// Sifted bits this accumulator stops at.
    pub fn required(&self) -> usize {
        self.required
    }

    /// Run until `required` sifted bits exist.
    ///
    /// Whole batches only: the last batch is sifted and counted in full even
    /// when it overshoots.
    pub async fn run<R: Rng + Send>(
        &self,
        rng: &mut R,
        metrics: &dyn MetricsRecorder,
    ) -> Result<Accumulation, ProtocolError> {
        let mut sifted = SiftedSequence::new();
        let mut raw_transmissions = 0u64;
        let mut batches = 0usize;

        while sifted.len() < self.required {
            if self.max_batches.is_some_and(|max| batches >= max) {
                return Err(ProtocolError::InsufficientKeyMaterial {
                    have: sifted.len(),
                    need: self.required,
                });
            }
            batches += 1;

            let batch = generate_batch(rng, self.batch_size)?;
            let bob_bits = self.measure_batch(batches, &batch).await?;

            let transmissions = batch.into_transmissions(bob_bits).ok_or_else(|| {
                // measure_batch has already checked the length
                ProtocolError::ChannelExhausted {
                    batch: batches,
                    source: ChannelError::Backend("unpaired measurement outcomes".to_string()),
                }
            })?;
            raw_transmissions += transmissions.len() as u64;

            let pairs = sift(&transmissions);
            metrics.record_batch(transmissions.len(), pairs.len());
            sifted.extend(pairs);

            debug!(
                batch = batches,
                sifted = sifted.len(),
                required = self.required,
                raw_transmissions,
                "Batch sifted"
            );
        }

        Ok(Accumulation {
            sifted,
            raw_transmissions,
            batches,
        })
    }

    async fn measure_batch(
        &self,
        batch_no: usize,
        batch: &PreparedBatch,
    ) -> Result<Vec<Bit>, ProtocolError> {
        let call = self
            .channel
            .measure(&batch.alice_bits, &batch.alice_bases, &batch.bob_bases);

        let outcome = match self.batch_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ChannelError::Timeout(limit)),
            },
            None => call.await,
        };

        let bits = outcome
            .and_then(|bits| {
                if bits.len() == batch.len() {
                    Ok(bits)
                } else {
                    Err(ChannelError::LengthMismatch {
                        expected: batch.len(),
                        got: bits.len(),
                    })
                }
            })
            .map_err(|source| {
                error!(
                    batch = batch_no,
                    channel = self.channel.name(),
                    error = %source,
                    "Channel failed to measure batch"
                );
                ProtocolError::ChannelExhausted {
                    batch: batch_no,
                    source,
                }
            })?;

        Ok(bits)
    }
}
