//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for external callers
//! - Driven Ports (outbound) - the quantum channel

pub mod inbound;
pub mod outbound;

pub use inbound::KeyDistributionApi;
pub use outbound::QuantumChannelAdapter;
