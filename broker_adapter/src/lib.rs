use std::io::Write;
use std::sync::Mutex;

use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

#[cfg(test)]
mod tests;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

// Broker error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    NoSubscribers,
    InvalidTopic(String),
    SendFailed(String),
}

impl std::fmt::Display for BrokerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrokerError::NoSubscribers => write!(f, "No subscriber is listening"),
            BrokerError::InvalidTopic(topic) => write!(f, "Invalid topic: {:?}", topic),
            BrokerError::SendFailed(msg) => write!(f, "Failed to send message: {}", msg),
        }
    }
}

impl std::error::Error for BrokerError {}

/// A message as delivered to channel subscribers
#[derive(Debug, Clone)]
pub struct BrokerMessage {
    pub id: String,
    pub topic: String,
    pub payload: String,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

/// Something that can take a message for a topic and deliver it somewhere.
pub trait MessageBroker: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;
    fn publish(&self, topic: &str, payload: &str) -> Result<(), BrokerError>;
}

/// Topics are non-empty and contain no whitespace.
pub fn validate_topic(topic: &str) -> Result<(), BrokerError> {
    if topic.is_empty() || topic.chars().any(char::is_whitespace) {
        return Err(BrokerError::InvalidTopic(topic.to_string()));
    }
    Ok(())
}

/// Writes every message as `[topic] payload` to an output stream.
pub struct ConsoleBroker {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleBroker {
    #[must_use]
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl Default for ConsoleBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConsoleBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleBroker").finish_non_exhaustive()
    }
}

impl MessageBroker for ConsoleBroker {
    fn name(&self) -> &str {
        "console"
    }

    fn publish(&self, topic: &str, payload: &str) -> Result<(), BrokerError> {
        validate_topic(topic)?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| BrokerError::SendFailed("output stream poisoned".into()))?;
        writeln!(out, "[{}] {}", topic, payload)
            .and_then(|()| out.flush())
            .map_err(|e| BrokerError::SendFailed(e.to_string()))
    }
}

/// In-process fan-out broker backed by a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct ChannelBroker {
    sender: broadcast::Sender<BrokerMessage>,
}

impl ChannelBroker {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Slow subscribers lag once more than `capacity` messages are buffered.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BrokerMessage> {
        self.sender.subscribe()
    }
}

impl Default for ChannelBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBroker for ChannelBroker {
    fn name(&self) -> &str {
        "channel"
    }

    fn publish(&self, topic: &str, payload: &str) -> Result<(), BrokerError> {
        validate_topic(topic)?;
        let message = BrokerMessage {
            id: Uuid::new_v4().to_string(),
            topic: topic.to_string(),
            payload: payload.to_string(),
            published_at: chrono::Utc::now(),
        };
        let id = message.id.clone();

        match self.sender.send(message) {
            Ok(receivers) => {
                debug!("Delivered message {} on {} to {} subscribers", id, topic, receivers);
                Ok(())
            }
            Err(_) => {
                warn!("Dropped message {} on {}: no subscribers", id, topic);
                Err(BrokerError::NoSubscribers)
            }
        }
    }
}
