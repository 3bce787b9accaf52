//! Inbound Ports (Driving Ports)
//!
//! The API callers use to run the protocol.

use async_trait::async_trait;

use crate::domain::{BB84Result, ProtocolConfig};
use crate::error::ProtocolError;

/// Key distribution API (Driving Port)
#[async_trait]
pub trait KeyDistributionApi: Send + Sync {
    /// Run one BB84 session against the channel named in `config.channel`.
    ///
    /// Each call opens a fresh channel session and a fresh RNG; nothing is
    /// carried over between runs.
    ///
    /// # Errors
    /// * `Configuration` - invalid parameters, before any channel use
    /// * `ChannelExhausted` - the adapter failed a batch
    /// * `SecurityViolation` - sampled QBER above threshold
    /// * `InsufficientKeyMaterial` - yield below `n + s`
    async fn generate_key(&self, config: &ProtocolConfig) -> Result<BB84Result, ProtocolError>;
}
