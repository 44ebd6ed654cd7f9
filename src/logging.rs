//! Process-wide `tracing` subscriber setup.

use crate::config::LogFormat;
use crate::config::LoggingConfig;
use crate::error::RosterError;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG`, when set, overrides the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<(), RosterError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|err| RosterError::LoggingError(err.to_string()))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_timer(UtcTime::rfc_3339()),
            )
            .try_init(),
    };
    result.map_err(|err| RosterError::LoggingError(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_subscriber_is_installed_once() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config);

        let error = init_logging(&config).unwrap_err();
        assert!(error.to_string().starts_with("Failed to initialise logging"));
    }
}
