use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::JsonFields;
use tracing_subscriber::prelude::*;

use crate::config::{LogFormat, LoggingConfig};

/// Installs the global subscriber, writing to stdout.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = build_filter(config)?;

    match config.format {
        LogFormat::Json => {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stdout)
                .fmt_fields(JsonFields::default());
            tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init()?;
        }
        LogFormat::Text => {
            let text_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(text_layer)
                .try_init()?;
        }
    }

    Ok(())
}

/// RUST_LOG wins when set, otherwise the configured level
fn build_filter(config: &LoggingConfig) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .inspect_err(|e| eprintln!("Invalid log level {:?}: {}", config.level, e))
            .map_err(Into::into),
    }
}
