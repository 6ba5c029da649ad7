//! Configuration management for the client.

use std::env;
use std::time::Duration;
use torrentview_engine::Filter;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the status endpoint
    pub base_url: String,
    /// Time between two polls
    pub poll_interval: Duration,
    /// Filter applied at start
    pub filter: Filter,
    /// Columns switched off at start (saved layout)
    pub hidden_columns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8112".to_string(),
            poll_interval: Duration::from_millis(2000),
            filter: Filter::none(),
            hidden_columns: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let base_url = lookup("TORRENTVIEW_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        let poll_interval = match lookup("POLL_INTERVAL_MS") {
            Some(raw) => {
                let millis: u64 = raw.parse().map_err(|_| ConfigError::InvalidInterval)?;
                if millis == 0 {
                    return Err(ConfigError::InvalidInterval);
                }
                Duration::from_millis(millis)
            }
            None => defaults.poll_interval,
        };

        let filter = match (lookup("FILTER_FIELD"), lookup("FILTER_VALUE")) {
            (Some(field), value) if !field.is_empty() => Filter {
                field: Some(field),
                expected: value.map(|raw| parse_filter_value(&raw)),
            },
            (_, Some(_)) => return Err(ConfigError::FilterValueWithoutField),
            _ => defaults.filter,
        };

        let hidden_columns = lookup("HIDDEN_COLUMNS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            base_url,
            poll_interval,
            filter,
            hidden_columns,
        })
    }
}

/// `FILTER_VALUE` is JSON when it parses as JSON, a plain string otherwise,
/// so both `FILTER_VALUE=Seeding` and `FILTER_VALUE=5` do what they look like.
fn parse_filter_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("POLL_INTERVAL_MS must be a positive integer")]
    InvalidInterval,

    #[error("FILTER_VALUE is set but FILTER_FIELD is not")]
    FilterValueWithoutField,
}
