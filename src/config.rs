//! Application configuration, read from an optional TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working in-memory setup:
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! cors_origins = ["http://localhost:5173"]
//!
//! [database]
//! path = "roster.duckdb"
//!
//! [upload]
//! max_file_size = 10485760
//!
//! [validation]
//! policy = "collect_all_errors"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use crate::error::ResultMessage;
use crate::error::RosterError;
use crate::http_server::config::HttpServerConfig;
use crate::validation::ErrorPolicy;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where students are stored. No path means an in-memory database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted upload in bytes (default: 10 MiB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

fn default_max_file_size() -> usize {
    10 * 1024 * 1024
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub policy: ErrorPolicy,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Reads a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(RosterError::from)
            .with_prefix(&format!("Cannot read config '{}'", path.display()))?;
        Self::parse(&text).with_prefix(&format!("Invalid config '{}'", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self, RosterError> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, None);
        assert_eq!(config.upload.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.validation.policy, ErrorPolicy::HaltOnFirstError);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AppConfig::parse(
            r#"
            [server]
            port = 9000

            [validation]
            policy = "collect_all_errors"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.validation.policy, ErrorPolicy::CollectAllErrors);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn rejects_unknown_policy() {
        let error = AppConfig::parse("[validation]\npolicy = \"sometimes\"").unwrap_err();
        assert!(error.to_string().contains("sometimes"), "{error}");
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\npath = \"roster.duckdb\"").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.database.path, Some(PathBuf::from("roster.duckdb")));
    }

    #[test]
    fn missing_file_names_the_path() {
        let error = AppConfig::load("/nonexistent/roster.toml").unwrap_err();
        assert!(error.to_string().starts_with("Cannot read config '/nonexistent/roster.toml'"));
    }
}
