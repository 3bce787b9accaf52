//! Noiseless channel simulator.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::Rng;

use super::{check_lengths, session_rng};
use crate::domain::{Basis, Bit};
use crate::error::ChannelError;
use crate::ports::QuantumChannelAdapter;

/// Measure a prepared state `(bit, prepared)` in basis `measured`.
///
/// Same basis reproduces the bit; a different basis gives a uniform outcome.
pub(crate) fn measure_state<R: Rng + ?Sized>(
    rng: &mut R,
    bit: Bit,
    prepared: Basis,
    measured: Basis,
) -> Bit {
    if prepared == measured {
        bit
    } else {
        rng.gen()
    }
}

/// Ideal quantum channel: no noise, no eavesdropper.
pub struct IdealChannel {
    rng: Mutex<StdRng>,
}

impl IdealChannel {
    /// Create a channel; `seed` fixes the outcomes of mismatched-basis measurements.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: Mutex::new(session_rng(seed, 0)),
        }
    }
}

#[async_trait]
impl QuantumChannelAdapter for IdealChannel {
    async fn measure(
        &self,
        alice_bits: &[Bit],
        alice_bases: &[Basis],
        bob_bases: &[Basis],
    ) -> Result<Vec<Bit>, ChannelError> {
        check_lengths(alice_bits, alice_bases, bob_bases)?;

        let mut rng = self.rng.lock();
        let bits = alice_bits
            .iter()
            .zip(alice_bases)
            .zip(bob_bases)
            .map(|((&bit, &prepared), &measured)| measure_state(&mut *rng, bit, prepared, measured))
            .collect();

        Ok(bits)
    }

    fn name(&self) -> &str {
        "ideal"
    }
}
