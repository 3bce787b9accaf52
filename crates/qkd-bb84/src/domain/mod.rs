//! # Domain Module
//!
//! Core types for the BB84 engine: bits and bases, batches, sifted material,
//! integrity reports, the run configuration and its invariants.
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod config;
pub mod entities;
pub mod invariants;
pub mod value_objects;

pub use config::{
    ChannelSelector, ProtocolConfig, ProtocolConfigBuilder, DEFAULT_BATCH_SIZE,
    DEFAULT_QBER_THRESHOLD,
};
pub use entities::{
    BB84Result, GateState, IntegrityReport, PreparedBatch, SiftedPair, SiftedSequence,
    Transmission,
};
pub use invariants::{invariant_key_length, invariant_partition, invariant_sufficient_sifted};
pub use value_objects::{bits_to_string, Basis, Bit};
