//! Service Layer
//!
//! Application services that drive the protocol steps and talk to the
//! quantum channel through the outbound port.

pub mod accumulator;
pub mod key_distribution_service;

pub use accumulator::{Accumulation, BatchAccumulator};
pub use key_distribution_service::Bb84Service;
