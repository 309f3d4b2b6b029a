use std::sync::Arc;

use broker_adapter::{BrokerError, MessageBroker};
use tracing::{info, warn};

use crate::layered::LayeredEnvironment;
use crate::root::RootEnvironment;

pub type SharedBroker = Arc<dyn MessageBroker>;
pub type InitEnvironment = RootEnvironment<dyn MessageBroker>;

/// The command-line layer: its own broker slot on top of the shared init layer.
pub type CliEnvironment = LayeredEnvironment<dyn MessageBroker, Arc<InitEnvironment>>;

/// Builds the init layer and the command-line layer wired on top of it.
#[must_use]
pub fn bootstrap() -> (Arc<InitEnvironment>, CliEnvironment) {
    let init = Arc::new(InitEnvironment::new());
    let cli = CliEnvironment::new(Arc::clone(&init));
    (init, cli)
}

#[derive(Debug)]
pub enum DispatchError {
    NoBroker,
    Broker(BrokerError),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::NoBroker => write!(f, "No message broker is registered"),
            DispatchError::Broker(err) => write!(f, "Broker error: {err}"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl CliEnvironment {
    /// Registers `broker` with this layer and the init layer below it.
    pub fn install_broker(&self, broker: SharedBroker) {
        info!("Registering message broker: {}", broker.name());
        let Ok(()) = self.set_message_broker(Some(broker));
    }

    /// Leaves both layers without a broker. Later dispatches fail with `NoBroker`.
    pub fn detach_broker(&self) {
        info!("Detaching message broker");
        let Ok(()) = self.set_message_broker(None);
    }

    /// Publishes through whatever broker this layer currently holds.
    pub fn dispatch(&self, topic: &str, payload: &str) -> Result<(), DispatchError> {
        let Some(broker) = self.message_broker() else {
            warn!("Dropping message on {topic}: no broker registered");
            return Err(DispatchError::NoBroker);
        };
        broker.publish(topic, payload).map_err(DispatchError::Broker)
    }
}
