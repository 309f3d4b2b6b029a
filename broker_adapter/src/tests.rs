use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::{BrokerError, ChannelBroker, ConsoleBroker, MessageBroker, validate_topic};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn validate_topic_rejects_blank_and_spaced_topics() {
    assert!(validate_topic("cli").is_ok());
    assert_eq!(
        validate_topic(""),
        Err(BrokerError::InvalidTopic(String::new()))
    );
    assert!(matches!(
        validate_topic("two words"),
        Err(BrokerError::InvalidTopic(_))
    ));
}

#[test]
fn console_broker_writes_topic_and_payload() {
    let buffer = SharedBuffer::default();
    let broker = ConsoleBroker::with_writer(Box::new(buffer.clone()));

    broker.publish("cli", "hello").unwrap();
    broker.publish("cli", "world").unwrap();

    assert_eq!(buffer.contents(), "[cli] hello\n[cli] world\n");
    assert_eq!(broker.name(), "console");
}

#[test]
fn console_broker_rejects_invalid_topic_without_writing() {
    let buffer = SharedBuffer::default();
    let broker = ConsoleBroker::with_writer(Box::new(buffer.clone()));

    let result = broker.publish(" ", "ignored");
    assert!(matches!(result, Err(BrokerError::InvalidTopic(_))));
    assert!(buffer.contents().is_empty());
}

#[test]
fn channel_broker_without_subscribers_reports_no_subscribers() {
    let broker = ChannelBroker::new();
    assert_eq!(
        broker.publish("cli", "lost"),
        Err(BrokerError::NoSubscribers)
    );
}

#[tokio::test]
async fn channel_broker_fans_out_to_every_subscriber() {
    let broker = ChannelBroker::new();
    let mut first = broker.subscribe();
    let mut second = broker.subscribe();

    broker.publish("cli", "ping").unwrap();

    let a = first.recv().await.unwrap();
    let b = second.recv().await.unwrap();
    assert_eq!(a.topic, "cli");
    assert_eq!(a.payload, "ping");
    assert_eq!(a.id, b.id);
}

#[tokio::test]
async fn channel_broker_is_usable_as_trait_object() {
    let channel = ChannelBroker::new();
    let mut receiver = channel.subscribe();
    let broker: Arc<dyn MessageBroker> = Arc::new(channel);

    broker.publish("events", "started").unwrap();

    let message = receiver.recv().await.unwrap();
    assert_eq!(message.payload, "started");
    assert_eq!(broker.name(), "channel");
}
