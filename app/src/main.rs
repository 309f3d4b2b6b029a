mod config;
mod logging;
mod repl;

use std::sync::Arc;

use broker_adapter::{ChannelBroker, ConsoleBroker};
use color_eyre::{Result, eyre::eyre};
use config::{AppConfig, BrokerKind};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = AppConfig::from_env().map_err(|e| eyre!(e))?;

    // Initialize logging
    logging::init(&config)?;
    tracing::info!("Starting {} with {:?} broker", *config::PROJECT_NAME, config.broker);

    let (init, cli) = domain::cli::bootstrap();

    let printer = match config.broker {
        BrokerKind::Console => {
            cli.install_broker(Arc::new(ConsoleBroker::new()));
            None
        }
        BrokerKind::Channel => {
            let channel = ChannelBroker::new();
            let receiver = channel.subscribe();
            cli.install_broker(Arc::new(channel));
            Some(tokio::spawn(repl::print_messages(receiver)))
        }
    };
    tracing::debug!("Environment initialized: {cli:#?}");

    let summary = repl::run(&cli, &config.topic, tokio::io::stdin()).await?;

    // Dropping both layers releases the last broker handle and closes the channel
    drop(cli);
    drop(init);
    if let Some(printer) = printer {
        let printed = printer.await?;
        if printed.lagged > 0 {
            tracing::warn!("Printer skipped {} messages", printed.lagged);
            eprintln!("{} published messages were never printed", printed.lagged);
        }
    }

    tracing::info!(
        "Shutting down: {} delivered, {} dropped",
        summary.delivered,
        summary.dropped
    );
    Ok(())
}
