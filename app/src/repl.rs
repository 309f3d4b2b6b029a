use std::borrow::Cow;

use broker_adapter::BrokerMessage;
use color_eyre::Result;
use domain::cli::{CliEnvironment, DispatchError};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const DETACH_COMMAND: &str = ":detach";
const STATUS_COMMAND: &str = ":status";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub delivered: usize,
    pub dropped: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PrintSummary {
    pub printed: usize,
    pub lagged: u64,
}

/// Publishes every input line on `topic` through the broker held by `env`.
///
/// Bytes that are not valid UTF-8 are replaced, the line is still published.
pub async fn run<R>(env: &CliEnvironment, topic: &str, input: R) -> Result<Summary>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(input);
    let mut buf = Vec::new();
    let mut summary = Summary::default();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let decoded = String::from_utf8_lossy(&buf);
        if let Cow::Owned(_) = decoded {
            warn!("Replaced invalid UTF-8 in input line");
        }

        match decoded.trim_end() {
            "" => continue,
            DETACH_COMMAND => env.detach_broker(),
            STATUS_COMMAND => match env.message_broker() {
                Some(broker) => eprintln!("broker: {}", broker.name()),
                None => eprintln!("broker: none"),
            },
            payload => match env.dispatch(topic, payload) {
                Ok(()) => {
                    summary.delivered += 1;
                    // channel subscribers get to drain before the next line is sent
                    tokio::task::yield_now().await;
                }
                Err(DispatchError::NoBroker) => {
                    eprintln!("undeliverable: no message broker registered");
                    summary.dropped += 1;
                }
                Err(err) => {
                    eprintln!("undeliverable: {err}");
                    summary.dropped += 1;
                }
            },
        }
    }

    info!(
        "Input closed: {} delivered, {} dropped",
        summary.delivered, summary.dropped
    );
    Ok(summary)
}

/// Prints channel broker traffic until every sender is gone.
///
/// Messages the subscriber fell too far behind on are counted in `lagged`.
pub async fn print_messages(mut receiver: broadcast::Receiver<BrokerMessage>) -> PrintSummary {
    let mut summary = PrintSummary::default();
    loop {
        match receiver.recv().await {
            Ok(message) => {
                debug!("Received message {}", message.id);
                println!(
                    "{} [{}] {}",
                    message.published_at.format("%H:%M:%S%.3f"),
                    message.topic,
                    message.payload
                );
                summary.printed += 1;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Subscriber lagged, skipped {} messages", skipped);
                summary.lagged += skipped;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    summary
}
