//! ELTIS door server
//!
//! HTTP server that releases an electric door strike by sending fixed-length
//! command frames to an ELTIS controller board over a serial link.
//!
//! # Device selection
//!
//! 1. `--device` (or `device.path` in the config file) names the serial port
//!    explicitly.
//! 2. Otherwise the port is discovered for every request by scanning a glob
//!    (`--pattern`, default `/dev/ttyACM*`) and taking the first match.
//!
//! `--mock` replaces the serial port with an in-memory link that only logs.

mod api;
mod config;
mod hardware;
#[cfg(test)]
mod test_utils;

use anyhow::Result;
use api::AppState;
use clap::Parser;
use config::Overrides;
use eltis_core::config::CONFIG_ENV_VAR;
use eltis_core::{default_config_path, InitResponsePolicy};
use std::path::PathBuf;
use tokio::signal;
use tracing::info;

/// ELTIS door release server
#[derive(Parser, Debug)]
#[command(name = "eltisd")]
#[command(version, about = "ELTIS door release HTTP server", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP listen address (":6976" listens on all interfaces)
    #[arg(short, long)]
    listen: Option<String>,

    /// Serial device path (e.g., /dev/ttyACM0). Disables discovery.
    #[arg(short, long)]
    device: Option<String>,

    /// Glob used to discover the serial device
    #[arg(long)]
    pattern: Option<String>,

    /// Handling of the board's Init reply: best-effort, required, skip
    #[arg(long)]
    init_response: Option<InitResponsePolicy>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable mock mode (run without hardware for testing/development)
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.verbose);

    info!("ELTIS door server {} starting...", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI flag > env var > default
    let config_path = args.config.unwrap_or_else(|| {
        std::env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path())
    });
    info!("Configuration file: {}", config_path.display());

    let mut static_config = config::load_static_config(&config_path).await?;
    Overrides {
        listen: args.listen,
        device: args.device,
        pattern: args.pattern,
        init_response: args.init_response,
    }
    .apply(&mut static_config);
    static_config.device.validate()?;

    let device_config = static_config.device.clone();
    info!(
        "Link: {} baud, {} ms timeout, init reply {}",
        device_config.baud_rate, device_config.read_timeout_ms, device_config.init_response
    );

    let controller = hardware::build_controller(&device_config, args.mock);
    let app_state = AppState::new(controller, device_config, args.mock);

    // Set up API router
    let app = api::create_router(app_state);

    // Start server
    let bind_addr = static_config.server.bind_addr();
    info!("Starting server on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("ELTIS door server listening on {}", bind_addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

/// Initialize tracing subscriber for logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["eltisd"]);
        assert!(args.listen.is_none());
        assert!(args.device.is_none());
        assert!(args.init_response.is_none());
        assert!(!args.mock);
    }

    #[test]
    fn test_args_parse_flags() {
        let args = Args::parse_from([
            "eltisd",
            "--listen",
            ":7000",
            "--device",
            "/dev/ttyACM1",
            "--init-response",
            "required",
            "--mock",
        ]);
        assert_eq!(args.listen.as_deref(), Some(":7000"));
        assert_eq!(args.device.as_deref(), Some("/dev/ttyACM1"));
        assert_eq!(args.init_response, Some(InitResponsePolicy::Required));
        assert!(args.mock);
    }

    #[test]
    fn test_args_reject_unknown_policy() {
        let result = Args::try_parse_from(["eltisd", "--init-response", "sometimes"]);
        assert!(result.is_err());
    }
}
