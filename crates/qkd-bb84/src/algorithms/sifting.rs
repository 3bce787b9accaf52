//! # Sifting
//!
//! Keeps the positions where Alice's and Bob's bases agree.

use crate::domain::{SiftedPair, Transmission};

/// Sift one batch of measured transmissions.
///
/// Pure and order-preserving, so sifting batch by batch and concatenating
/// gives the same sequence as sifting the concatenated input.
pub fn sift(transmissions: &[Transmission]) -> Vec<SiftedPair> {
    transmissions
        .iter()
        .filter(|t| t.bases_match())
        .map(|t| SiftedPair {
            alice: t.alice_bit,
            bob: t.bob_bit,
        })
        .collect()
}
