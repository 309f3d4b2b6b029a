use std::sync::Arc;

use in_memory_adapter::InMemorySlot;
use tracing::debug;

use crate::environment::{BaseEnvironment, BrokerSource};


/// Specialized registry layer sitting on top of a parent layer.
///
/// Keeps its own broker slot and forwards every update to `parent`. Reads
/// only ever look at the own slot.
///
/// # Invariants
/// - The own slot is written before the parent is called, and no lock is
///   held during that call, so a parent reading back through this layer
///   already sees the new handle.
/// - Errors from the parent are returned as-is. The own slot keeps the new
///   handle even when the parent fails.
#[derive(Debug)]
pub struct LayeredEnvironment<B: ?Sized, P> {
    broker: InMemorySlot<B>,
    parent: P,
}

impl<B: ?Sized, P> LayeredEnvironment<B, P>
where
    P: BaseEnvironment<B>,
{
    #[must_use]
    pub fn new(parent: P) -> Self {
        Self {
            broker: InMemorySlot::new(),
            parent,
        }
    }

    /// Stores `broker` in this layer, then hands the same handle to the parent.
    /// # Errors
    /// - Returns the parent's error unchanged if its update fails
    pub fn set_message_broker(&self, broker: Option<Arc<B>>) -> Result<(), P::Error> {
        let forwarded = broker.clone();
        let previous = self.broker.replace(broker);
        debug!(
            "Layered environment broker updated (was set: {}, now set: {})",
            previous.is_some(),
            forwarded.is_some()
        );
        self.parent.set_message_broker(forwarded)
    }

    /// The handle last stored in this layer, if any.
    pub fn message_broker(&self) -> Option<Arc<B>> {
        self.broker.get()
    }

    pub fn parent(&self) -> &P {
        &self.parent
    }
}

impl<B: ?Sized, P> BaseEnvironment<B> for LayeredEnvironment<B, P>
where
    P: BaseEnvironment<B>,
{
    type Error = P::Error;

    fn set_message_broker(&self, broker: Option<Arc<B>>) -> Result<(), Self::Error> {
        LayeredEnvironment::set_message_broker(self, broker)
    }
}

impl<B: ?Sized, P> BrokerSource<B> for LayeredEnvironment<B, P>
where
    P: BaseEnvironment<B>,
{
    fn message_broker(&self) -> Option<Arc<B>> {
        LayeredEnvironment::message_broker(self)
    }
}
