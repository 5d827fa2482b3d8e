//! Process-wide service identity and the values derived from it.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{EnumIter, IntoEnumIterator};

use crate::config::Config;
use crate::utils::{format_uptime, iso_timestamp, round2};

/// Service name reported in headers and payloads.
pub const SERVICE_NAME: &str = "app2-api-service";
/// Short service id used by `/status` and `/ping`.
pub const SERVICE_ID: &str = "app2";
/// Service version reported in headers and payloads.
pub const SERVICE_VERSION: &str = "1.0.0";
/// Version of the compiler that built this binary, captured by `build.rs`.
pub const RUSTC_VERSION: &str = env!("RUSTC_VERSION");
/// Edge protection label.
pub const PROTECTION: &str = "Cloudflare Zero Trust Access";

/// Routes served by the responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Endpoint {
    Root,
    Status,
    Health,
    Info,
    Ping,
}

impl Endpoint {
    /// Request path.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Root => "/",
            Endpoint::Status => "/status",
            Endpoint::Health => "/health",
            Endpoint::Info => "/info",
            Endpoint::Ping => "/ping",
        }
    }

    /// HTTP method; every route is read-only.
    pub fn method(self) -> &'static str {
        "GET"
    }

    /// One-line description used by `/` and the banner.
    pub fn description(self) -> &'static str {
        match self {
            Endpoint::Root => "Service information",
            Endpoint::Status => "Service status",
            Endpoint::Health => "Detailed health check",
            Endpoint::Info => "System information",
            Endpoint::Ping => "Simple ping",
        }
    }

    /// `"GET /path"` form used by the 404 body.
    pub fn route(self) -> String {
        format!("{} {}", self.method(), self.path())
    }

    /// Every route, in declaration order.
    pub fn all() -> Vec<Endpoint> {
        Endpoint::iter().collect()
    }
}

/// Immutable identity of the running process.
#[derive(Debug, Clone)]
pub struct ServiceMetadata {
    /// Service name.
    pub name: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Monotonic start instant, used for uptime.
    pub started: Instant,
    /// Wall-clock start time, used for display.
    pub started_at: DateTime<Utc>,
    /// Environment label.
    pub environment: String,
    /// Configured log level.
    pub log_level: String,
    /// Configured port.
    pub port: u16,
}

impl ServiceMetadata {
    /// Capture the start time and configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            name: SERVICE_NAME,
            version: SERVICE_VERSION,
            started: Instant::now(),
            started_at: Utc::now(),
            environment: config.flask_env.clone(),
            log_level: config.log_level.clone(),
            port: config.port,
        }
    }

    /// Time since start.
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Uptime in fractional seconds.
    pub fn uptime_seconds(&self) -> f64 {
        self.uptime().as_secs_f64()
    }

    /// Whether the development label is active.
    pub fn is_development(&self) -> bool {
        self.environment == crate::config::DEVELOPMENT
    }

    /// Fresh health view.
    pub fn health_snapshot(&self) -> std::io::Result<HealthSnapshot> {
        let seconds = self.uptime_seconds();
        let working_directory = std::env::current_dir()?;
        let executable = std::env::current_exe()?;

        Ok(HealthSnapshot {
            uptime: UptimeInfo {
                seconds: round2(seconds),
                formatted: format_uptime(seconds),
                started_at: iso_timestamp(self.started_at),
            },
            environment: EnvironmentInfo {
                flask_env: self.environment.clone(),
                rust_version: RUSTC_VERSION.to_string(),
                platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
                log_level: self.log_level.clone(),
            },
            system: SystemInfo {
                executable: executable.display().to_string(),
                working_directory: working_directory.display().to_string(),
            },
            checks: HealthChecks::default(),
        })
    }
}

/// Derived per-call health view.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub uptime: UptimeInfo,
    pub environment: EnvironmentInfo,
    pub system: SystemInfo,
    pub checks: HealthChecks,
}

/// Uptime block of the health view.
#[derive(Debug, Clone, Serialize)]
pub struct UptimeInfo {
    /// Seconds since start, two decimals.
    pub seconds: f64,
    /// Human-readable uptime.
    pub formatted: String,
    /// Start time, ISO-8601 UTC.
    pub started_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentInfo {
    /// Environment label, keyed after the variable it comes from.
    pub flask_env: String,
    pub rust_version: String,
    pub platform: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub executable: String,
    pub working_directory: String,
}

/// Health check flags. Nothing is actually checked; all flags are constant.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HealthChecks {
    pub api_responsive: bool,
    pub can_connect: bool,
    pub environment_loaded: bool,
}

impl Default for HealthChecks {
    fn default() -> Self {
        Self {
            api_responsive: true,
            can_connect: true,
            environment_loaded: true,
        }
    }
}
