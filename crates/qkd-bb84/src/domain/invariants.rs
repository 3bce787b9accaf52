//! # Domain Invariants
//!
//! Rules every successful run must satisfy.

use super::entities::{BB84Result, IntegrityReport};
use crate::error::ProtocolError;

/// Invariant: at least `n + s` sifted bits exist before sampling.
pub fn invariant_sufficient_sifted(
    sifted_len: usize,
    key_length: usize,
    sample_size: usize,
) -> Result<(), ProtocolError> {
    let need = key_length.saturating_add(sample_size);
    if sifted_len < need {
        return Err(ProtocolError::InsufficientKeyMaterial {
            have: sifted_len,
            need,
        });
    }
    Ok(())
}

/// Invariant: sample and kept positions are disjoint and cover `[0, sifted_len)`.
pub fn invariant_partition(report: &IntegrityReport, sifted_len: usize) -> bool {
    if report.sample_indices.len() + report.kept_indices.len() != sifted_len {
        return false;
    }

    let mut seen = vec![false; sifted_len];
    for &idx in report.sample_indices.iter().chain(&report.kept_indices) {
        match seen.get_mut(idx) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

/// Invariant: a result carries exactly `n` key bits drawn from `n` kept positions.
pub fn invariant_key_length(result: &BB84Result, key_length: usize) -> bool {
    result.key_bits.len() == key_length && result.kept_indices.len() == key_length
}
