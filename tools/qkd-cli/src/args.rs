//! Command-line arguments and their mapping onto `ProtocolConfig`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use qkd_bb84::{ChannelSelector, ProtocolConfig};

const DEFAULT_FLIP_PROBABILITY: f64 = 0.05;
const DEFAULT_INTERCEPT_RATIO: f64 = 1.0;

/// Channel adapter to run against
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ChannelKind {
    /// Noiseless simulator
    Ideal,
    /// Simulator with independent bit flips (--flip-probability)
    Noisy,
    /// Intercept-resend eavesdropper (--intercept-ratio)
    Intercept,
}

/// qkd-cli: run BB84 key distribution sessions
#[derive(Parser, Debug)]
#[command(name = "qkd-cli", version)]
#[command(about = "Run BB84 sessions against simulated quantum channels")]
pub struct Args {
    /// JSON file with a full protocol configuration; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Key length in bits (n)
    #[arg(short = 'n', long)]
    pub key_length: Option<usize>,

    /// Sifted bits sacrificed for the QBER estimate (s)
    #[arg(short = 's', long)]
    pub sample_size: Option<usize>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Transmissions per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Abort when the sampled QBER is above this
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Channel adapter
    #[arg(long, value_enum)]
    pub channel: Option<ChannelKind>,

    /// Bit-flip probability for the noisy channel [default: 0.05]
    #[arg(long)]
    pub flip_probability: Option<f64>,

    /// Fraction of transmissions Eve intercepts [default: 1.0]
    #[arg(long)]
    pub intercept_ratio: Option<f64>,

    /// Session quota in transmissions
    #[arg(long)]
    pub max_transmissions: Option<u64>,

    /// Give up after this many batches
    #[arg(long)]
    pub max_batches: Option<usize>,

    /// Per-batch channel deadline in milliseconds
    #[arg(long)]
    pub batch_timeout_ms: Option<u64>,

    /// Number of sessions to run; seeded sessions use seed, seed+1, ...
    #[arg(long, default_value_t = 1)]
    pub runs: u32,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Log level filter (overrides QKD_LOG_LEVEL)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Build the protocol configuration: file (or defaults), then flags.
    pub fn protocol_config(&self) -> anyhow::Result<ProtocolConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => ProtocolConfig::default(),
        };

        if let Some(n) = self.key_length {
            config.key_length = n;
        }
        if let Some(s) = self.sample_size {
            config.sample_size = s;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(size) = self.batch_size {
            config.batch_size = size;
        }
        if let Some(threshold) = self.threshold {
            config.qber_threshold = threshold;
        }
        if let Some(kind) = self.channel {
            config.channel = match kind {
                ChannelKind::Ideal => ChannelSelector::Ideal,
                ChannelKind::Noisy => ChannelSelector::Noisy {
                    flip_probability: DEFAULT_FLIP_PROBABILITY,
                },
                ChannelKind::Intercept => ChannelSelector::InterceptResend {
                    intercept_ratio: DEFAULT_INTERCEPT_RATIO,
                },
            };
        }
        if let Some(p) = self.flip_probability {
            match noise_target(&mut config.channel) {
                ChannelSelector::Noisy { flip_probability } => *flip_probability = p,
                _ => anyhow::bail!("--flip-probability needs a noisy channel"),
            }
        }
        if let Some(ratio) = self.intercept_ratio {
            match noise_target(&mut config.channel) {
                ChannelSelector::InterceptResend { intercept_ratio } => *intercept_ratio = ratio,
                _ => anyhow::bail!("--intercept-ratio needs an intercept channel"),
            }
        }
        if let Some(limit) = self.max_transmissions {
            config.channel = ChannelSelector::Limited {
                inner: Box::new(config.channel),
                max_transmissions: limit,
            };
        }
        if let Some(batches) = self.max_batches {
            config.max_batches = Some(batches);
        }
        if let Some(ms) = self.batch_timeout_ms {
            config.batch_timeout = Some(Duration::from_millis(ms));
        }

        config.validate()?;
        Ok(config)
    }
}

/// The selector a channel parameter applies to, looking through quotas.
fn noise_target(selector: &mut ChannelSelector) -> &mut ChannelSelector {
    match selector {
        ChannelSelector::Limited { inner, .. } => noise_target(inner),
        other => other,
    }
}
