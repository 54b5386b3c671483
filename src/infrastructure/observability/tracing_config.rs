use crate::presentation::config::{DEFAULT_LOG_FILTER, Environment, LoggingSettings};

/// Configuration for tracing initialization.
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Filter directives applied when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl TracingConfig {
    pub fn new(environment: Environment, logging: &LoggingSettings) -> Self {
        Self {
            environment: environment.to_string(),
            json_format: logging.json || env_requests_json(),
            default_filter: logging.filter.clone(),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".to_string()),
            json_format: env_requests_json(),
            default_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn env_requests_json() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false)
}
