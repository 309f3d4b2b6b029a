use std::sync::Arc;

/// A registry layer that accepts message broker updates.
///
/// Implementations decide what an update means for them. A layer that
/// sits on top of another one must forward the same handle down.
pub trait BaseEnvironment<B: ?Sized> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Replaces the stored broker. `None` leaves the layer without one.
    /// # Errors
    /// - Returns `Self::Error` if this layer (or one below it) refuses the update
    fn set_message_broker(&self, broker: Option<Arc<B>>) -> Result<(), Self::Error>;
}

/// Read access to a layer's own broker slot.
pub trait BrokerSource<B: ?Sized> {
    fn message_broker(&self) -> Option<Arc<B>>;

    fn has_message_broker(&self) -> bool {
        self.message_broker().is_some()
    }
}

impl<B: ?Sized, E: BaseEnvironment<B> + ?Sized> BaseEnvironment<B> for Arc<E> {
    type Error = E::Error;

    fn set_message_broker(&self, broker: Option<Arc<B>>) -> Result<(), Self::Error> {
        (**self).set_message_broker(broker)
    }
}

impl<B: ?Sized, E: BaseEnvironment<B> + ?Sized> BaseEnvironment<B> for &E {
    type Error = E::Error;

    fn set_message_broker(&self, broker: Option<Arc<B>>) -> Result<(), Self::Error> {
        (**self).set_message_broker(broker)
    }
}

impl<B: ?Sized, E: BrokerSource<B> + ?Sized> BrokerSource<B> for Arc<E> {
    fn message_broker(&self) -> Option<Arc<B>> {
        (**self).message_broker()
    }
}

impl<B: ?Sized, E: BrokerSource<B> + ?Sized> BrokerSource<B> for &E {
    fn message_broker(&self) -> Option<Arc<B>> {
        (**self).message_broker()
    }
}
