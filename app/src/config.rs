use std::path::PathBuf;

lazy_static::lazy_static! {
    pub static ref PROJECT_NAME: String = String::from("cli-env").to_uppercase();
}

/// Get the data directory for the application
pub fn get_data_dir() -> PathBuf {
    let project_name = PROJECT_NAME.clone().to_lowercase();

    if let Ok(data_dir) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(data_dir).join(&project_name)
    } else if let Ok(home_dir) = std::env::var("HOME") {
        PathBuf::from(home_dir)
            .join(".local")
            .join("share")
            .join(&project_name)
    } else {
        // Fallback to current directory if no home directory is found
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(&project_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerKind {
    Console,
    Channel,
}

impl std::str::FromStr for BrokerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(BrokerKind::Console),
            "channel" => Ok(BrokerKind::Channel),
            other => Err(format!(
                "Invalid CLI_BROKER `{other}`: expected console|channel"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub broker: BrokerKind,
    pub topic: String,
    pub log_level: String,
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Create AppConfig from environment variables, reading `.env` first if present
    ///
    /// Optional environment variables:
    /// - CLI_BROKER: which broker to register, console or channel (default: console)
    /// - CLI_TOPIC: topic every input line is published on (default: cli)
    /// - CLI_LOG_LEVEL: fallback filter when RUST_LOG is unset (default: info)
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let broker = lookup("CLI_BROKER")
            .map(|value| value.parse::<BrokerKind>())
            .transpose()?
            .unwrap_or(BrokerKind::Console);

        let topic = lookup("CLI_TOPIC").unwrap_or_else(|| "cli".to_string());
        broker_adapter::validate_topic(&topic).map_err(|e| format!("Invalid CLI_TOPIC: {e}"))?;

        let log_level = lookup("CLI_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            broker,
            topic,
            log_level,
            data_dir: get_data_dir(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.broker, BrokerKind::Console);
        assert_eq!(config.topic, "cli");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn reads_broker_and_topic() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CLI_BROKER", "Channel"),
            ("CLI_TOPIC", "events"),
            ("CLI_LOG_LEVEL", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.broker, BrokerKind::Channel);
        assert_eq!(config.topic, "events");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn rejects_unknown_broker() {
        let err = AppConfig::from_lookup(lookup_from(&[("CLI_BROKER", "smtp")])).unwrap_err();
        assert!(err.contains("CLI_BROKER"));
    }

    #[test]
    fn rejects_topic_with_spaces() {
        let err = AppConfig::from_lookup(lookup_from(&[("CLI_TOPIC", "two words")])).unwrap_err();
        assert!(err.contains("CLI_TOPIC"));
    }

    #[test]
    fn data_dir_ends_with_project_name() {
        assert!(get_data_dir().ends_with("cli-env"));
    }
}
