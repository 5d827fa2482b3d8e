//! Application configuration loaded from environment variables.

use serde::Deserialize;

/// Environment label that enables verbose errors and response logging.
pub const DEVELOPMENT: &str = "development";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP port to bind on all interfaces.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment label (development, production, ...).
    #[serde(default = "default_environment")]
    pub flask_env: String,

    /// Log level, echoed in `/health` and used as the default log filter.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional port for the Prometheus exporter.
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_port() -> u16 {
    5000
}

fn default_environment() -> String {
    DEVELOPMENT.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            flask_env: default_environment(),
            log_level: default_log_level(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("PORT must be between 1 and 65535".to_string());
        }

        if self.flask_env.trim().is_empty() {
            return Err("FLASK_ENV must not be empty".to_string());
        }

        if self.metrics_port == Some(self.port) {
            return Err("METRICS_PORT must differ from PORT".to_string());
        }

        Ok(())
    }

    /// Whether the service runs with the development label.
    pub fn is_development(&self) -> bool {
        self.flask_env == DEVELOPMENT
    }
}
