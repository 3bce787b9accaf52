//! Adapters Layer (Driven Adapters)
//!
//! In-process implementations of the quantum channel port.
//!
//! ## Adapters
//!
//! - `IdealChannel` - noiseless simulator
//! - `NoisyChannel` - independent bit flips over another channel
//! - `InterceptResendChannel` - eavesdropper measuring in random bases
//! - `LimitedChannel` - per-session transmission quota
//!
//! `build_channel` turns a [`ChannelSelector`] into a fresh session.

pub mod ideal;
pub mod intercept_resend;
pub mod limited;
pub mod noisy;

pub use ideal::IdealChannel;
pub use intercept_resend::InterceptResendChannel;
pub use limited::LimitedChannel;
pub use noisy::NoisyChannel;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::{Basis, Bit, ChannelSelector};
use crate::error::{ChannelError, ProtocolError};
use crate::ports::QuantumChannelAdapter;

/// Separates channel randomness from the run RNG when both derive from one seed.
const CHANNEL_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// RNG for one random stream inside a channel session.
pub(crate) fn session_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64((seed ^ CHANNEL_SEED_SALT).wrapping_add(stream)),
        None => StdRng::from_entropy(),
    }
}

pub(crate) fn check_lengths(
    alice_bits: &[Bit],
    alice_bases: &[Basis],
    bob_bases: &[Basis],
) -> Result<(), ChannelError> {
    let expected = alice_bits.len();
    for got in [alice_bases.len(), bob_bases.len()] {
        if got != expected {
            return Err(ChannelError::LengthMismatch { expected, got });
        }
    }
    Ok(())
}

pub(crate) fn validate_probability(p: f64) -> Result<(), ChannelError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ChannelError::InvalidProbability(p));
    }
    Ok(())
}

/// Open a channel session for `selector`.
///
/// Seeded runs get seeded channels, so a fixed seed reproduces the whole run.
pub fn build_channel(
    selector: &ChannelSelector,
    seed: Option<u64>,
) -> Result<Box<dyn QuantumChannelAdapter>, ProtocolError> {
    let channel: Box<dyn QuantumChannelAdapter> = match selector {
        ChannelSelector::Ideal => Box::new(IdealChannel::new(seed)),
        ChannelSelector::Noisy { flip_probability } => Box::new(
            NoisyChannel::new(IdealChannel::new(seed), *flip_probability, seed)
                .map_err(|e| ProtocolError::Configuration(e.to_string()))?,
        ),
        ChannelSelector::InterceptResend { intercept_ratio } => Box::new(
            InterceptResendChannel::new(*intercept_ratio, seed)
                .map_err(|e| ProtocolError::Configuration(e.to_string()))?,
        ),
        ChannelSelector::Limited {
            inner,
            max_transmissions,
        } => Box::new(LimitedChannel::new(
            build_channel(inner, seed)?,
            *max_transmissions,
        )),
    };

    Ok(channel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_channel_names() {
        let cases = [
            (ChannelSelector::Ideal, "ideal"),
            (ChannelSelector::Noisy { flip_probability: 0.1 }, "noisy"),
            (
                ChannelSelector::InterceptResend { intercept_ratio: 1.0 },
                "intercept-resend",
            ),
            (
                ChannelSelector::Limited {
                    inner: Box::new(ChannelSelector::Ideal),
                    max_transmissions: 100,
                },
                "limited",
            ),
        ];

        for (selector, name) in cases {
            let channel = build_channel(&selector, Some(1)).unwrap();
            assert_eq!(channel.name(), name);
        }
    }

    #[test]
    fn test_build_channel_rejects_bad_probability() {
        let result = build_channel(&ChannelSelector::Noisy { flip_probability: -1.0 }, None);
        assert!(matches!(result, Err(ProtocolError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_seeded_sessions_repeat() {
        let selector = ChannelSelector::InterceptResend { intercept_ratio: 1.0 };
        let bits = vec![Bit::One; 256];
        let alice = vec![Basis::Z; 256];
        let bob = vec![Basis::Z; 256];

        let a = build_channel(&selector, Some(77)).unwrap();
        let b = build_channel(&selector, Some(77)).unwrap();
        assert_eq!(
            a.measure(&bits, &alice, &bob).await.unwrap(),
            b.measure(&bits, &alice, &bob).await.unwrap()
        );
    }
}
