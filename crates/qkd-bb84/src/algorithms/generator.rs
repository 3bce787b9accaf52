//! # Bit/Basis Generator
//!
//! Draws Alice's bits and bases and Bob's bases from the run RNG.
//!
//! Draw order per batch is fixed: all Alice bits, then all Alice bases, then
//! all Bob bases. A fixed seed therefore reproduces every batch exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{Basis, Bit, PreparedBatch};
use crate::error::ProtocolError;

/// Create the RNG that drives one protocol run.
///
/// `None` seeds from OS entropy and makes the run non-reproducible.
pub fn protocol_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// `k` uniform bits.
pub fn random_bits<R: Rng + ?Sized>(rng: &mut R, k: usize) -> Vec<Bit> {
    (0..k).map(|_| rng.gen()).collect()
}

/// `k` uniform bases.
pub fn random_bases<R: Rng + ?Sized>(rng: &mut R, k: usize) -> Vec<Basis> {
    (0..k).map(|_| rng.gen()).collect()
}

/// Prepare one batch of `batch_size` transmissions.
pub fn generate_batch<R: Rng + ?Sized>(
    rng: &mut R,
    batch_size: usize,
) -> Result<PreparedBatch, ProtocolError> {
    if batch_size == 0 {
        return Err(ProtocolError::Configuration(
            "batch_size must be > 0".to_string(),
        ));
    }

    let alice_bits = random_bits(rng, batch_size);
    let alice_bases = random_bases(rng, batch_size);
    let bob_bases = random_bases(rng, batch_size);

    Ok(PreparedBatch {
        alice_bits,
        alice_bases,
        bob_bases,
    })
}
