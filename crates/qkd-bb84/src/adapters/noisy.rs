//! Bit-flip noise on top of another channel.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::Rng;

use super::{session_rng, validate_probability};
use crate::domain::{Basis, Bit};
use crate::error::ChannelError;
use crate::ports::QuantumChannelAdapter;

/// Flips each outcome of `inner` independently with probability `p`.
///
/// Models detector noise and decoherence; on sifted positions the expected
/// QBER equals `p`.
pub struct NoisyChannel<C> {
    inner: C,
    flip_probability: f64,
    rng: Mutex<StdRng>,
}

impl<C: QuantumChannelAdapter> NoisyChannel<C> {
    /// Wrap `inner` with bit-flip noise.
    pub fn new(inner: C, flip_probability: f64, seed: Option<u64>) -> Result<Self, ChannelError> {
        validate_probability(flip_probability)?;
        Ok(Self {
            inner,
            flip_probability,
            rng: Mutex::new(session_rng(seed, 1)),
        })
    }

    /// Configured flip probability.
    pub fn flip_probability(&self) -> f64 {
        self.flip_probability
    }
}

#[async_trait]
impl<C: QuantumChannelAdapter> QuantumChannelAdapter for NoisyChannel<C> {
    async fn measure(
        &self,
        alice_bits: &[Bit],
        alice_bases: &[Basis],
        bob_bases: &[Basis],
    ) -> Result<Vec<Bit>, ChannelError> {
        let mut bits = self.inner.measure(alice_bits, alice_bases, bob_bases).await?;

        let mut rng = self.rng.lock();
        for bit in bits.iter_mut() {
            if rng.gen_bool(self.flip_probability) {
                *bit = bit.flip();
            }
        }

        Ok(bits)
    }

    fn name(&self) -> &str {
        "noisy"
    }
}
