//! Session quota on top of another channel.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Basis, Bit};
use crate::error::ChannelError;
use crate::ports::QuantumChannelAdapter;

/// Accepts at most `max_transmissions` over the session lifetime.
///
/// A batch that would cross the quota is refused whole with
/// `ChannelError::QueueLimit`, the way a remote backend refuses a job once
/// the session allowance is spent.
pub struct LimitedChannel<C> {
    inner: C,
    max_transmissions: u64,
    used: Mutex<u64>,
}

impl<C: QuantumChannelAdapter> LimitedChannel<C> {
    /// Wrap `inner` with a transmission quota.
    pub fn new(inner: C, max_transmissions: u64) -> Self {
        Self {
            inner,
            max_transmissions,
            used: Mutex::new(0),
        }
    }

    /// Transmissions accepted so far.
    pub fn used(&self) -> u64 {
        *self.used.lock()
    }

    fn reserve(&self, requested: u64) -> Result<(), ChannelError> {
        let mut used = self.used.lock();
        if used.saturating_add(requested) > self.max_transmissions {
            return Err(ChannelError::QueueLimit {
                used: *used,
                limit: self.max_transmissions,
            });
        }
        *used += requested;
        Ok(())
    }
}

#[async_trait]
impl<C: QuantumChannelAdapter> QuantumChannelAdapter for LimitedChannel<C> {
    async fn measure(
        &self,
        alice_bits: &[Bit],
        alice_bases: &[Basis],
        bob_bases: &[Basis],
    ) -> Result<Vec<Bit>, ChannelError> {
        self.reserve(alice_bits.len() as u64)?;
        self.inner.measure(alice_bits, alice_bases, bob_bases).await
    }

    fn name(&self) -> &str {
        "limited"
    }
}
