use std::convert::Infallible;
use std::sync::Arc;

use in_memory_adapter::InMemorySlot;
use tracing::debug;

use crate::environment::{BaseEnvironment, BrokerSource};

/// Bottom layer of an environment hierarchy.
///
/// Every specialized layer eventually forwards here. Updates cannot fail.
#[derive(Debug)]
pub struct RootEnvironment<B: ?Sized> {
    broker: InMemorySlot<B>,
}

impl<B: ?Sized> RootEnvironment<B> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            broker: InMemorySlot::new(),
        }
    }
}

impl<B: ?Sized> Default for RootEnvironment<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ?Sized> BaseEnvironment<B> for RootEnvironment<B> {
    type Error = Infallible;

    fn set_message_broker(&self, broker: Option<Arc<B>>) -> Result<(), Infallible> {
        let was_set = self.broker.replace(broker).is_some();
        debug!(
            "Root environment broker updated (was set: {}, now set: {})",
            was_set,
            self.broker.is_set()
        );
        Ok(())
    }
}

impl<B: ?Sized> BrokerSource<B> for RootEnvironment<B> {
    fn message_broker(&self) -> Option<Arc<B>> {
        self.broker.get()
    }
}
