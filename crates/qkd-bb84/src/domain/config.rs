//! Protocol run configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use qkd_bb84::domain::{ChannelSelector, ProtocolConfigBuilder};
//!
//! let config = ProtocolConfigBuilder::new()
//!     .key_length(100)
//!     .sample_size(10)
//!     .seed(42)
//!     .channel(ChannelSelector::Ideal)
//!     .build()?;
//! ```

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default transmissions per accumulation round.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Default QBER abort threshold.
pub const DEFAULT_QBER_THRESHOLD: f64 = 0.02;

/// Which quantum channel adapter a run talks to, with its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelSelector {
    /// Noiseless simulator.
    #[default]
    Ideal,
    /// Noiseless simulator followed by independent bit flips.
    Noisy {
        /// Per-bit flip probability
        flip_probability: f64,
    },
    /// Intercept-resend eavesdropper between Alice and Bob.
    InterceptResend {
        /// Fraction of transmissions Eve measures
        intercept_ratio: f64,
    },
    /// Session with a fixed transmission quota.
    Limited {
        /// Channel behind the quota
        inner: Box<ChannelSelector>,
        /// Transmissions the session accepts before refusing
        max_transmissions: u64,
    },
}

impl ChannelSelector {
    /// Validate selector parameters.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::Ideal => Ok(()),
            Self::Noisy { flip_probability } => {
                check_probability("flip_probability", *flip_probability)
            }
            Self::InterceptResend { intercept_ratio } => {
                check_probability("intercept_ratio", *intercept_ratio)
            }
            Self::Limited {
                inner,
                max_transmissions,
            } => {
                if *max_transmissions == 0 {
                    return Err(ProtocolError::Configuration(
                        "max_transmissions cannot be 0".to_string(),
                    ));
                }
                inner.validate()
            }
        }
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), ProtocolError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ProtocolError::Configuration(format!(
            "{name} must be between 0 and 1, got {value}"
        )));
    }
    Ok(())
}

/// Parameters of one protocol run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Desired key length `n`
    pub key_length: usize,
    /// Sifted bits sacrificed for the integrity check `s`
    pub sample_size: usize,
    /// RNG seed; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Transmissions per accumulation round
    pub batch_size: usize,
    /// Abort when sampled QBER is strictly above this
    pub qber_threshold: f64,
    /// Channel adapter selection
    pub channel: ChannelSelector,
    /// Upper bound on accumulation rounds (`None` = until the channel gives out)
    pub max_batches: Option<usize>,
    /// Per-batch bound on the adapter call
    pub batch_timeout: Option<Duration>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            key_length: 256,
            sample_size: 32,
            seed: None,
            batch_size: DEFAULT_BATCH_SIZE,
            qber_threshold: DEFAULT_QBER_THRESHOLD,
            channel: ChannelSelector::Ideal,
            max_batches: None,
            batch_timeout: None,
        }
    }
}

impl ProtocolConfig {
    /// Create a configuration for `n` key bits and `s` sample bits, other fields default.
    pub fn new(key_length: usize, sample_size: usize) -> Result<Self, ProtocolError> {
        let config = Self {
            key_length,
            sample_size,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Sifted bits the accumulator must collect: `n + s`.
    pub fn required_sifted(&self) -> usize {
        self.key_length.saturating_add(self.sample_size)
    }

    /// Validate all parameters. Runs before any channel use.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.key_length == 0 {
            return Err(ProtocolError::Configuration(
                "key_length must be > 0".to_string(),
            ));
        }

        if self.batch_size == 0 {
            return Err(ProtocolError::Configuration(
                "batch_size must be > 0".to_string(),
            ));
        }

        if !self.qber_threshold.is_finite() || !(0.0..=1.0).contains(&self.qber_threshold) {
            return Err(ProtocolError::Configuration(format!(
                "qber_threshold must be between 0 and 1, got {}",
                self.qber_threshold
            )));
        }

        if self.max_batches == Some(0) {
            return Err(ProtocolError::Configuration(
                "max_batches cannot be 0".to_string(),
            ));
        }

        if self.batch_timeout == Some(Duration::ZERO) {
            return Err(ProtocolError::Configuration(
                "batch_timeout cannot be zero".to_string(),
            ));
        }

        self.channel.validate()
    }

    /// Builder-style method to set the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder-style method to set the channel
    pub fn with_channel(mut self, channel: ChannelSelector) -> Self {
        self.channel = channel;
        self
    }
}

/// Builder for ProtocolConfig with validation
#[derive(Default)]
pub struct ProtocolConfigBuilder {
    key_length: Option<usize>,
    sample_size: Option<usize>,
    seed: Option<u64>,
    batch_size: Option<usize>,
    qber_threshold: Option<f64>,
    channel: Option<ChannelSelector>,
    max_batches: Option<usize>,
    batch_timeout: Option<Duration>,
}

impl ProtocolConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set desired key length `n`
    pub fn key_length(mut self, n: usize) -> Self {
        self.key_length = Some(n);
        self
    }

    /// Set integrity sample size `s`
    pub fn sample_size(mut self, s: usize) -> Self {
        self.sample_size = Some(s);
        self
    }

    /// Set RNG seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set transmissions per batch
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Set QBER abort threshold
    pub fn qber_threshold(mut self, threshold: f64) -> Self {
        self.qber_threshold = Some(threshold);
        self
    }

    /// Set channel adapter selection
    pub fn channel(mut self, channel: ChannelSelector) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Cap the number of accumulation rounds
    pub fn max_batches(mut self, batches: usize) -> Self {
        self.max_batches = Some(batches);
        self
    }

    /// Bound each adapter call
    pub fn batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout = Some(timeout);
        self
    }

    /// Build the ProtocolConfig, validating all parameters
    pub fn build(self) -> Result<ProtocolConfig, ProtocolError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Build without validation (the service validates again before running)
    pub fn build_unchecked(self) -> ProtocolConfig {
        let defaults = ProtocolConfig::default();

        ProtocolConfig {
            key_length: self.key_length.unwrap_or(defaults.key_length),
            sample_size: self.sample_size.unwrap_or(defaults.sample_size),
            seed: self.seed.or(defaults.seed),
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            qber_threshold: self.qber_threshold.unwrap_or(defaults.qber_threshold),
            channel: self.channel.unwrap_or(defaults.channel),
            max_batches: self.max_batches.or(defaults.max_batches),
            batch_timeout: self.batch_timeout.or(defaults.batch_timeout),
        }
    }
}
