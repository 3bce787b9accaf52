//! # Domain Value Objects
//!
//! Classical values exchanged over the quantum and classical channels.

use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A classical bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Bit {
    /// 0
    Zero,
    /// 1
    One,
}

impl Bit {
    /// The opposite bit.
    pub fn flip(self) -> Self {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
        }
    }

    /// Numeric value (0 or 1).
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value {
            Self::One
        } else {
            Self::Zero
        }
    }
}

impl From<Bit> for u8 {
    fn from(bit: Bit) -> Self {
        bit.as_u8()
    }
}

impl TryFrom<u8> for Bit {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            other => Err(format!("not a bit: {other}")),
        }
    }
}

impl Distribution<Bit> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Bit {
        Bit::from(rng.gen::<bool>())
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Encoding/measurement basis.
///
/// `Z` is the rectilinear basis (|0>, |1>), `X` the diagonal basis (|+>, |->).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Rectilinear
    Z,
    /// Diagonal
    X,
}

impl Distribution<Basis> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Basis {
        if rng.gen::<bool>() {
            Basis::X
        } else {
            Basis::Z
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Z => f.write_str("Z"),
            Self::X => f.write_str("X"),
        }
    }
}

/// Render bits as a compact `0101...` string.
pub fn bits_to_string(bits: &[Bit]) -> String {
    bits.iter().map(|b| if *b == Bit::One { '1' } else { '0' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_bit_flip_is_involution() {
        assert_eq!(Bit::Zero.flip(), Bit::One);
        assert_eq!(Bit::One.flip().flip(), Bit::One);
    }

    #[test]
    fn test_bit_u8_conversions() {
        assert_eq!(u8::from(Bit::One), 1);
        assert_eq!(Bit::try_from(0u8), Ok(Bit::Zero));
        assert!(Bit::try_from(2u8).is_err());
    }

    #[test]
    fn test_bit_serializes_as_number() {
        let json = serde_json::to_string(&vec![Bit::One, Bit::Zero]).unwrap();
        assert_eq!(json, "[1,0]");
        let back: Vec<Bit> = serde_json::from_str("[0,1]").unwrap();
        assert_eq!(back, vec![Bit::Zero, Bit::One]);
        assert!(serde_json::from_str::<Bit>("7").is_err());
    }

    #[test]
    fn test_random_basis_is_balanced() {
        let mut rng = StdRng::seed_from_u64(7);
        let sample_size = 20_000;
        let x_count = (0..sample_size)
            .filter(|_| rng.gen::<Basis>() == Basis::X)
            .count();
        let ratio = x_count as f64 / sample_size as f64;
        assert!((ratio - 0.5).abs() < 0.02, "X ratio {ratio}");
    }

    #[test]
    fn test_bits_to_string() {
        assert_eq!(bits_to_string(&[Bit::One, Bit::Zero, Bit::One]), "101");
        assert_eq!(bits_to_string(&[]), "");
    }
}
