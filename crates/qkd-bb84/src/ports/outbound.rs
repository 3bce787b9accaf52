//! Outbound Ports (Driven Ports)
//!
//! The quantum channel the engine depends on. Qubit preparation, measurement
//! and noise all live behind this trait.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Basis, Bit};
use crate::error::ChannelError;

/// Quantum channel adapter (Driven Port)
///
/// One call measures one batch. All three inputs have equal length and a
/// well-behaved adapter returns exactly that many bits. The call may block
/// on remote hardware; it is the only suspension point of a run.
#[async_trait]
pub trait QuantumChannelAdapter: Send + Sync {
    /// Send Alice's prepared states and return Bob's outcomes in `bob_bases`.
    async fn measure(
        &self,
        alice_bits: &[Bit],
        alice_bases: &[Basis],
        bob_bases: &[Basis],
    ) -> Result<Vec<Bit>, ChannelError>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: QuantumChannelAdapter + ?Sized> QuantumChannelAdapter for Arc<T> {
    async fn measure(
        &self,
        alice_bits: &[Bit],
        alice_bases: &[Basis],
        bob_bases: &[Basis],
    ) -> Result<Vec<Bit>, ChannelError> {
        (**self).measure(alice_bits, alice_bases, bob_bases).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: QuantumChannelAdapter + ?Sized> QuantumChannelAdapter for Box<T> {
    async fn measure(
        &self,
        alice_bits: &[Bit],
        alice_bases: &[Basis],
        bob_bases: &[Basis],
    ) -> Result<Vec<Bit>, ChannelError> {
        (**self).measure(alice_bits, alice_bases, bob_bases).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
