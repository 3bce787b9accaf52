//! # Domain Entities
//!
//! Records produced and consumed along one protocol run.

use super::value_objects::{Basis, Bit};
use serde::{Deserialize, Serialize};

/// Alice's prepared states and Bob's basis choices for one batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedBatch {
    /// Alice's raw bits
    pub alice_bits: Vec<Bit>,
    /// Alice's encoding bases
    pub alice_bases: Vec<Basis>,
    /// Bob's measurement bases
    pub bob_bases: Vec<Basis>,
}

impl PreparedBatch {
    /// Number of transmissions in the batch.
    pub fn len(&self) -> usize {
        self.alice_bits.len()
    }

    /// True if the batch carries no transmissions.
    pub fn is_empty(&self) -> bool {
        self.alice_bits.is_empty()
    }

    /// Pair the batch with Bob's measurement outcomes.
    ///
    /// Returns `None` when the outcome count differs from the batch size.
    pub fn into_transmissions(self, bob_bits: Vec<Bit>) -> Option<Vec<Transmission>> {
        if bob_bits.len() != self.len() {
            return None;
        }

        let transmissions = self
            .alice_bits
            .into_iter()
            .zip(self.alice_bases)
            .zip(self.bob_bases)
            .zip(bob_bits)
            .map(|(((alice_bit, alice_basis), bob_basis), bob_bit)| Transmission {
                alice_bit,
                alice_basis,
                bob_basis,
                bob_bit,
            })
            .collect();

        Some(transmissions)
    }
}

/// One measured transmission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transmission {
    /// Bit Alice encoded
    pub alice_bit: Bit,
    /// Basis Alice prepared in
    pub alice_basis: Basis,
    /// Basis Bob measured in
    pub bob_basis: Basis,
    /// Bit Bob observed
    pub bob_bit: Bit,
}

impl Transmission {
    /// Bases agree, so the position survives sifting.
    pub fn bases_match(&self) -> bool {
        self.alice_basis == self.bob_basis
    }
}

/// A sifted position: both parties' bits where the bases matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiftedPair {
    /// Alice's bit
    pub alice: Bit,
    /// Bob's bit
    pub bob: Bit,
}

impl SiftedPair {
    /// Alice and Bob disagree on this position.
    pub fn is_error(&self) -> bool {
        self.alice != self.bob
    }
}

/// Sifted key material accumulated across batches, in transmission order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SiftedSequence {
    pairs: Vec<SiftedPair>,
}

impl SiftedSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the sifted output of one batch.
    pub fn extend(&mut self, pairs: impl IntoIterator<Item = SiftedPair>) {
        self.pairs.extend(pairs);
    }

    /// Number of sifted positions.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True if nothing has been sifted yet.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pair at a sifted position.
    pub fn get(&self, index: usize) -> Option<&SiftedPair> {
        self.pairs.get(index)
    }

    /// All pairs in order.
    pub fn pairs(&self) -> &[SiftedPair] {
        &self.pairs
    }
}

impl FromIterator<SiftedPair> for SiftedSequence {
    fn from_iter<I: IntoIterator<Item = SiftedPair>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// Outcome of integrity sampling over a sifted sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegrityReport {
    /// Mismatch ratio on the sample; NaN when the sample is empty
    pub qber: f64,
    /// Number of sampled mismatches
    pub errors: usize,
    /// Sampled positions, in draw order
    pub sample_indices: Vec<usize>,
    /// Positions not sampled, ascending
    pub kept_indices: Vec<usize>,
}

impl IntegrityReport {
    /// Size of the sample.
    pub fn sample_size(&self) -> usize {
        self.sample_indices.len()
    }
}

/// Security gate state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GateState {
    /// QBER not evaluated yet.
    #[default]
    Checking,
    /// QBER within threshold, or no sample requested.
    KeyAccepted,
    /// QBER above threshold; all key material discarded.
    Aborted,
}

impl GateState {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::KeyAccepted | Self::Aborted)
    }
}

/// Final result of a successful run.
///
/// Equality treats two NaN QBERs as equal, so unchecked runs still compare.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BB84Result {
    /// First `n` kept Alice bits
    pub key_bits: Vec<Bit>,
    /// Sampled QBER (NaN when no sample was taken; `null` in JSON)
    #[serde(with = "nan_as_null")]
    pub qber_sample: f64,
    /// Transmissions consumed across all batches
    pub raw_transmissions: u64,
    /// Sifted length at sampling time
    pub sifted_size_before_sample: usize,
    /// Sampled sifted positions, in draw order
    pub sample_indices: Vec<usize>,
    /// Sifted positions the key bits were taken from
    pub kept_indices: Vec<usize>,
}

impl PartialEq for BB84Result {
    fn eq(&self, other: &Self) -> bool {
        let qber_eq = self.qber_sample == other.qber_sample
            || (self.qber_sample.is_nan() && other.qber_sample.is_nan());

        qber_eq
            && self.key_bits == other.key_bits
            && self.raw_transmissions == other.raw_transmissions
            && self.sifted_size_before_sample == other.sifted_size_before_sample
            && self.sample_indices == other.sample_indices
            && self.kept_indices == other.kept_indices
    }
}

/// NaN <-> `null`, since JSON has no NaN.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        let value = if value.is_nan() { None } else { Some(*value) };
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> PreparedBatch {
        PreparedBatch {
            alice_bits: vec![Bit::One, Bit::Zero, Bit::One],
            alice_bases: vec![Basis::Z, Basis::X, Basis::X],
            bob_bases: vec![Basis::Z, Basis::Z, Basis::X],
        }
    }

    #[test]
    fn test_into_transmissions_pairs_positionally() {
        let tx = batch()
            .into_transmissions(vec![Bit::One, Bit::One, Bit::Zero])
            .unwrap();
        assert_eq!(tx.len(), 3);
        assert!(tx[0].bases_match());
        assert!(!tx[1].bases_match());
        assert_eq!(tx[2].bob_bit, Bit::Zero);
    }

    #[test]
    fn test_into_transmissions_rejects_length_mismatch() {
        assert!(batch().into_transmissions(vec![Bit::One]).is_none());
    }

    #[test]
    fn test_sifted_sequence_grows_in_order() {
        let mut seq = SiftedSequence::new();
        assert!(seq.is_empty());
        seq.extend([SiftedPair { alice: Bit::One, bob: Bit::One }]);
        seq.extend([SiftedPair { alice: Bit::Zero, bob: Bit::One }]);
        assert_eq!(seq.len(), 2);
        assert!(seq.get(1).unwrap().is_error());
        assert!(!seq.pairs()[0].is_error());
    }

    #[test]
    fn test_gate_state_terminal() {
        assert!(!GateState::Checking.is_terminal());
        assert!(GateState::KeyAccepted.is_terminal());
        assert!(GateState::Aborted.is_terminal());
    }

    fn unchecked_result() -> BB84Result {
        BB84Result {
            key_bits: vec![Bit::One, Bit::Zero],
            qber_sample: f64::NAN,
            raw_transmissions: 8,
            sifted_size_before_sample: 4,
            sample_indices: vec![],
            kept_indices: vec![0, 1],
        }
    }

    #[test]
    fn test_unchecked_results_compare_equal() {
        assert_eq!(unchecked_result(), unchecked_result());

        let mut checked = unchecked_result();
        checked.qber_sample = 0.0;
        assert_ne!(checked, unchecked_result());
    }

    #[test]
    fn test_nan_qber_survives_json() {
        let json = serde_json::to_string(&unchecked_result()).unwrap();
        assert!(json.contains("\"qber_sample\":null"));

        let back: BB84Result = serde_json::from_str(&json).unwrap();
        assert!(back.qber_sample.is_nan());
        assert_eq!(back, unchecked_result());
    }
}
