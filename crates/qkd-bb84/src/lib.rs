//! # QKD BB84
//!
//! BB84 quantum key distribution engine: prepares random bits and bases,
//! pushes them through a quantum channel in batches, sifts on matching
//! bases, estimates the QBER from a sacrificed sample and either aborts
//! or hands back a fixed-length key.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! ```text
//! qkd-bb84/
//! ├── domain/          # Bits, bases, batches, config, invariants
//! ├── algorithms/      # Generation, sifting, sampling, gate, assembly
//! ├── ports/
//! │   ├── inbound.rs   # KeyDistributionApi
//! │   └── outbound.rs  # QuantumChannelAdapter
//! ├── service/         # Batch accumulation and run orchestration
//! └── adapters/        # Ideal, noisy, intercept-resend, limited channels
//! ```
//!
//! ## Security
//!
//! - Sampled positions are disclosed and never enter the key
//! - A QBER strictly above the threshold aborts the run with no key
//! - A zero sample skips the check; the result carries a NaN QBER
//!
//! ## Invariants
//!
//! - Sifted length is at least `key_length + sample_size` before sampling
//! - Sample and kept indices partition the sifted range
//! - An accepted key is exactly `key_length` bits
//!
//! ## Usage Example
//!
//! ```ignore
//! use qkd_bb84::{Bb84Service, KeyDistributionApi, ProtocolConfigBuilder};
//!
//! let config = ProtocolConfigBuilder::new()
//!     .key_length(256)
//!     .sample_size(32)
//!     .seed(42)
//!     .build()?;
//!
//! let result = Bb84Service::new().generate_key(&config).await?;
//! assert_eq!(result.key_bits.len(), 256);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{build_channel, IdealChannel, InterceptResendChannel, LimitedChannel, NoisyChannel};
pub use domain::{
    BB84Result, Basis, Bit, ChannelSelector, GateState, IntegrityReport, ProtocolConfig,
    ProtocolConfigBuilder,
};
pub use error::{ChannelError, ProtocolError};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{KeyDistributionApi, QuantumChannelAdapter};
pub use service::Bb84Service;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
