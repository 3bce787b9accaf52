//! Intercept-resend eavesdropper.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::Rng;

use super::ideal::measure_state;
use super::{check_lengths, session_rng, validate_probability};
use crate::domain::{Basis, Bit};
use crate::error::ChannelError;
use crate::ports::QuantumChannelAdapter;

/// Eve measures a fraction of transmissions in a random basis and resends
/// what she saw.
///
/// With every transmission intercepted, half of Eve's bases are wrong and
/// half of those disturb Bob's sifted outcome, so the QBER tends to 0.25.
pub struct InterceptResendChannel {
    intercept_ratio: f64,
    rng: Mutex<StdRng>,
}

impl InterceptResendChannel {
    /// Create an eavesdropped channel.
    pub fn new(intercept_ratio: f64, seed: Option<u64>) -> Result<Self, ChannelError> {
        validate_probability(intercept_ratio)?;
        Ok(Self {
            intercept_ratio,
            rng: Mutex::new(session_rng(seed, 2)),
        })
    }

    /// Fraction of transmissions intercepted.
    pub fn intercept_ratio(&self) -> f64 {
        self.intercept_ratio
    }
}

#[async_trait]
impl QuantumChannelAdapter for InterceptResendChannel {
    async fn measure(
        &self,
        alice_bits: &[Bit],
        alice_bases: &[Basis],
        bob_bases: &[Basis],
    ) -> Result<Vec<Bit>, ChannelError> {
        check_lengths(alice_bits, alice_bases, bob_bases)?;

        let mut rng = self.rng.lock();
        let mut out = Vec::with_capacity(alice_bits.len());

        for ((&bit, &alice_basis), &bob_basis) in alice_bits.iter().zip(alice_bases).zip(bob_bases) {
            let (bit, basis) = if rng.gen_bool(self.intercept_ratio) {
                let eve_basis: Basis = rng.gen();
                let eve_bit = measure_state(&mut *rng, bit, alice_basis, eve_basis);
                (eve_bit, eve_basis)
            } else {
                (bit, alice_basis)
            };
            out.push(measure_state(&mut *rng, bit, basis, bob_basis));
        }

        Ok(out)
    }

    fn name(&self) -> &str {
        "intercept-resend"
    }
}
