//! # Integrity Estimation
//!
//! Sacrifices a uniform random sample of sifted positions to estimate the
//! quantum bit error rate. Sampled positions never reach the key.

use rand::seq::index;
use rand::Rng;

use crate::domain::{IntegrityReport, SiftedSequence};
use crate::error::ProtocolError;

/// Draw `sample_size` distinct positions and measure the mismatch ratio on them.
///
/// Sample indices are recorded in draw order; kept indices are the ascending
/// complement. An empty sample yields `qber = NaN`.
pub fn estimate_qber<R: Rng + ?Sized>(
    sifted: &SiftedSequence,
    sample_size: usize,
    rng: &mut R,
) -> Result<IntegrityReport, ProtocolError> {
    let len = sifted.len();
    if len < sample_size {
        return Err(ProtocolError::InsufficientKeyMaterial {
            have: len,
            need: sample_size,
        });
    }

    let sample_indices = index::sample(rng, len, sample_size).into_vec();

    let mut sampled = vec![false; len];
    let mut errors = 0usize;
    for &idx in &sample_indices {
        sampled[idx] = true;
        if sifted.pairs()[idx].is_error() {
            errors += 1;
        }
    }

    let kept_indices = (0..len).filter(|&idx| !sampled[idx]).collect();

    let qber = if sample_size == 0 {
        f64::NAN
    } else {
        errors as f64 / sample_size as f64
    };

    Ok(IntegrityReport {
        qber,
        errors,
        sample_indices,
        kept_indices,
    })
}
