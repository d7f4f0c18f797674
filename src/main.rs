//! hostpulse - version 0.1.0
//!
//! Host telemetry daemon with rolling history and a JSON dashboard API.
//! This is the main entry point that initializes the sampling loop and
//! the HTTP server, and handles subcommands.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, Level};

use hostpulse::cli::{Args, Commands};
use hostpulse::commands::command_check;
use hostpulse::config::{resolve_config, show_config, validate_effective_config, Config};
use hostpulse::handlers::{
    config_handler, cpu_handler, disk_handler, health_handler, keys_handler, memory_handler,
    network_handler, root_handler, series_handler, system_handler, temperature_handler,
};
use hostpulse::providers::{ProcProvider, SnapshotProvider, SyntheticProvider};
use hostpulse::{sampler, startup_checks, AppState};

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config, args: &Args) {
    let level_str = args
        .log_level
        .as_ref()
        .map(|l| format!("{:?}", l).to_lowercase())
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "info".to_string());

    let log_level = match level_str.as_str() {
        "off" | "error" => Level::ERROR,
        "warn" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging initialized with level: {}", level_str);
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format);
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        let config = resolve_config(&args)?;
        if let Err(e) = validate_effective_config(&config) {
            eprintln!("Configuration invalid: {}", e);
            std::process::exit(1);
        }

        return match command {
            Commands::Check { raw } => Ok(command_check(*raw, &config)?),
        };
    }

    // Load configuration for server mode
    let config = resolve_config(&args)?;

    if let Err(e) = validate_effective_config(&config) {
        eprintln!("Configuration invalid: {}", e);
        std::process::exit(1);
    }

    setup_logging(&config, &args);

    info!("Starting hostpulse");

    // Validate telemetry sources before proceeding
    if let Err(e) = startup_checks::validate_requirements(config.synthetic()) {
        error!("Startup validation failed: {}", e);
        error!("The daemon will start but most series will stay empty!");
        // Continue anyway - don't fail hard
    }

    let provider: Arc<dyn SnapshotProvider> = if config.synthetic() {
        info!("Using synthetic telemetry provider");
        Arc::new(SyntheticProvider::new())
    } else {
        Arc::new(ProcProvider::new())
    };

    let bind_ip = config.bind().to_string();
    let port = config.port();
    let interval = config.interval();
    let window = config.window();

    let state = AppState::new(config, provider);

    info!(
        "Sampling every {:?} into rolling windows of {} samples",
        interval, window
    );

    // Start the sampling loop. The first tick fires immediately and
    // warms the counter baselines of delta-based categories.
    let sampling_task = tokio::spawn(sampler::run(state.clone()));

    // Setup graceful shutdown signal handlers
    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down gracefully...");
            }
        }
    };

    // Configure HTTP server routes
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/cpu", get(cpu_handler))
        .route("/memory", get(memory_handler))
        .route("/disk", get(disk_handler))
        .route("/network", get(network_handler))
        .route("/temperature", get(temperature_handler))
        .route("/series", get(series_handler))
        .route("/keys", get(keys_handler))
        .route("/health", get(health_handler))
        .route("/config", get(config_handler))
        .route("/system", get(system_handler))
        .with_state(state.clone());

    let listener = TcpListener::bind(addr).await?;
    info!("hostpulse listening on http://{}:{}", bind_ip, port);

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                sampling_task.abort();
                return Err(e.into());
            }
        }
        _ = shutdown_signal => {
            info!("Shutdown signal received, exiting...");
        }
    }

    // Stop the sampling loop; its state dies with the process anyway.
    sampling_task.abort();

    info!("hostpulse stopped gracefully");
    Ok(())
}
