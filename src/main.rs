//! App 2 API service entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app2_api_service::api::{create_router, AppState};
use app2_api_service::config::Config;
use app2_api_service::metadata::{Endpoint, ServiceMetadata, PROTECTION};
use app2_api_service::metrics;
use app2_api_service::utils::{iso_timestamp, shutdown_signal};
use app2_api_service::ServiceError;

/// JSON status service for the demo container stack.
#[derive(Parser, Debug)]
#[command(name = "app2-api-service")]
#[command(about = "Serves status, health and info endpoints over HTTP")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "LOG_JSON")]
    json_logs: bool,

    /// HTTP port, overrides PORT.
    #[arg(short, long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve,

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration before logging so LOG_LEVEL can drive the filter
    let config = Config::load();
    let log_level = config
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("app2_api_service=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level))
    };

    let (json_layer, text_layer) = if args.json_logs {
        (Some(fmt::layer().json()), None)
    } else {
        (None, Some(fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(json_layer)
        .with(text_layer)
        .with(filter)
        .init();

    let mut config = config.map_err(|e| {
        let e = ServiceError::from(e);
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(port) = args.port {
        config.port = port;
    }

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Serve) | None => Ok(cmd_serve(config).await?),
    }
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("============================================================");
    println!("APP 2 API SERVICE - CONFIGURATION CHECK");
    println!("============================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    println!("  Environment: {}", config.flask_env);
    println!("  Log Level: {}", config.log_level);
    match config.metrics_port {
        Some(port) => println!("  Metrics Port: {}", port),
        None => println!("  Metrics: Disabled"),
    }
    println!("============================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("============================================================");

    Ok(())
}

/// Serve the API until a shutdown signal arrives.
async fn cmd_serve(config: Config) -> app2_api_service::Result<()> {
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        ServiceError::InvalidConfig(e)
    })?;

    metrics::init_metrics();
    if let Some(port) = config.metrics_port {
        metrics::install_exporter(port)?;
    }

    let meta = ServiceMetadata::new(&config);
    print_banner(&meta);

    let app_state = AppState::from_metadata(meta);
    let router = create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Print the startup banner.
fn print_banner(meta: &ServiceMetadata) {
    println!("============================================================");
    println!("App 2 - Rust API Service");
    println!("============================================================");
    println!("Service: {}", meta.name);
    println!("Version: {}", meta.version);
    println!("Environment: {}", meta.environment);
    println!("Port: {}", meta.port);
    println!("Runtime: tokio / axum");
    println!("Started: {}", iso_timestamp(meta.started_at));
    println!("============================================================");
    println!("Available endpoints:");
    for endpoint in Endpoint::all() {
        println!(
            "  {:<4} {:<11} - {}",
            endpoint.method(),
            endpoint.path(),
            endpoint.description()
        );
    }
    println!("============================================================");
    println!("Protected by {}", PROTECTION);
    println!("============================================================");
}
