use std::fs::OpenOptions;
use std::sync::Mutex;

use color_eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

const LOG_FILE_NAME: &str = "cli-env.log";

/// Sends traces to a log file in the data directory so stdout stays free for broker output.
pub fn init(config: &AppConfig) -> Result<()> {
    std::fs::create_dir_all(&config.data_dir)?;
    let log_path = config.data_dir.join(LOG_FILE_NAME);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(log_file))
        .with_target(true)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(ErrorLayer::default())
        .try_init()?;

    tracing::debug!("Logging to {}", log_path.display());
    Ok(())
}
