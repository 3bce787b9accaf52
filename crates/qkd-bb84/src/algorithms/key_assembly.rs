//! # Key Assembly
//!
//! Turns accepted key material into the final [`BB84Result`].

use crate::domain::{BB84Result, IntegrityReport, SiftedSequence};
use crate::error::ProtocolError;

/// Take the first `key_length` kept positions as the key.
///
/// Consumes the sifted material; the key bits are Alice's bits at the kept
/// positions, earliest transmission first.
pub fn assemble_key(
    sifted: SiftedSequence,
    report: IntegrityReport,
    key_length: usize,
    raw_transmissions: u64,
) -> Result<BB84Result, ProtocolError> {
    let IntegrityReport {
        qber,
        sample_indices,
        mut kept_indices,
        ..
    } = report;

    if kept_indices.len() < key_length {
        return Err(ProtocolError::InsufficientKeyMaterial {
            have: kept_indices.len(),
            need: key_length,
        });
    }

    kept_indices.truncate(key_length);

    let mut key_bits = Vec::with_capacity(key_length);
    for &idx in &kept_indices {
        let pair = sifted.get(idx).ok_or(ProtocolError::InsufficientKeyMaterial {
            have: sifted.len(),
            need: idx + 1,
        })?;
        key_bits.push(pair.alice);
    }

    Ok(BB84Result {
        key_bits,
        qber_sample: qber,
        raw_transmissions,
        sifted_size_before_sample: sifted.len(),
        sample_indices,
        kept_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bit, SiftedPair};

    fn sifted() -> SiftedSequence {
        [
            (Bit::One, Bit::One),
            (Bit::Zero, Bit::One),
            (Bit::One, Bit::One),
            (Bit::Zero, Bit::Zero),
            (Bit::One, Bit::Zero),
        ]
        .into_iter()
        .map(|(alice, bob)| SiftedPair { alice, bob })
        .collect()
    }

    fn report(sample: Vec<usize>, kept: Vec<usize>) -> IntegrityReport {
        IntegrityReport {
            qber: 0.5,
            errors: 1,
            sample_indices: sample,
            kept_indices: kept,
        }
    }

    #[test]
    fn test_takes_alice_bits_from_first_kept_positions() {
        let result = assemble_key(sifted(), report(vec![1, 3], vec![0, 2, 4]), 2, 16).unwrap();
        assert_eq!(result.key_bits, vec![Bit::One, Bit::One]);
        assert_eq!(result.kept_indices, vec![0, 2]);
        assert_eq!(result.sample_indices, vec![1, 3]);
        assert_eq!(result.sifted_size_before_sample, 5);
        assert_eq!(result.raw_transmissions, 16);
        assert_eq!(result.qber_sample, 0.5);
    }

    #[test]
    fn test_uses_alice_not_bob_bits() {
        let result = assemble_key(sifted(), report(vec![], vec![0, 1, 2, 3, 4]), 5, 10).unwrap();
        assert_eq!(
            result.key_bits,
            vec![Bit::One, Bit::Zero, Bit::One, Bit::Zero, Bit::One]
        );
    }

    #[test]
    fn test_insufficient_kept_material() {
        let result = assemble_key(sifted(), report(vec![0, 1, 2], vec![3, 4]), 3, 10);
        assert!(matches!(
            result,
            Err(ProtocolError::InsufficientKeyMaterial { have: 2, need: 3 })
        ));
    }
}
