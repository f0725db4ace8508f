//! herakles-iostat-exporter - per-device iostat statistics for Prometheus
//!
//! Runs the sysstat iostat utility for a basic and an extended device report,
//! merges both per device and exposes every recognized statistic.

mod cache;
mod cache_updater;
mod cli;
mod commands;
mod config;
mod handlers;
mod metrics;
mod startup_checks;
mod state;

use axum::{routing::get, Router};
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use prometheus::Registry;
use std::net::SocketAddr;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, Level};

use cli::{Args, Commands, LogLevel};
use commands::{command_check, command_config, command_stats, command_test};
use config::{
    resolve_config, show_config, validate_effective_config, Config, DEFAULT_BIND_ADDR,
    DEFAULT_PORT,
};
use handlers::{config_handler, health_handler, metrics_handler, root_handler, stats_handler};
use metrics::IostatMetrics;
use state::AppState;

/// Initializes tracing logging subsystem with the effective log level
/// (CLI flag, then config file, then info).
fn setup_logging(config: &Config) {
    let level = config.log_level().unwrap_or(LogLevel::Info);
    let log_level = match level {
        LogLevel::Off => None,
        LogLevel::Error => Some(Level::ERROR),
        LogLevel::Warn => Some(Level::WARN),
        LogLevel::Info => Some(Level::INFO),
        LogLevel::Debug => Some(Level::DEBUG),
        LogLevel::Trace => Some(Level::TRACE),
    };

    let Some(log_level) = log_level else {
        return;
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging initialized with level: {:?}", level);
}

/// Loads and validates configuration, exiting with code 1 when invalid.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
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
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format.clone());
    }

    if let Some(command) = &args.command {
        // Config generation and statistic listing don't depend on the effective config
        match command {
            Commands::Config {
                output,
                format,
                commented,
            } => return command_config(output.clone(), format.clone(), *commented),
            Commands::Stats { kind } => return command_stats(kind.clone()),
            _ => {}
        }

        return match command {
            // check reports an invalid config itself instead of exiting early
            Commands::Check { collect } => {
                let config = resolve_config(&args)?;
                setup_logging(&config);
                command_check(*collect, &config).await
            }
            Commands::Test {
                iterations,
                verbose,
                format,
            } => {
                let config = load_validated_config(&args)?;
                setup_logging(&config);
                config.warn_unknown_keys();
                command_test(*iterations, *verbose, format.clone(), &config).await
            }
            Commands::Config { .. } | Commands::Stats { .. } => unreachable!("handled above"),
        };
    }

    // Load configuration for main server mode
    let config = load_validated_config(&args)?;

    setup_logging(&config);

    info!("Starting herakles-iostat-exporter");
    config.warn_unknown_keys();

    if config.uses_captured_reports() {
        info!("Replaying captured iostat reports instead of running iostat");
    } else if let Err(e) = startup_checks::validate_requirements(&config.iostat_binary()) {
        error!("❌ Startup validation failed: {}", e);
        error!("   The exporter will start but collections will fail until this is fixed!");
    }

    let bind_ip_str = config
        .bind
        .clone()
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
    let port = config.port.unwrap_or(DEFAULT_PORT);
    let enable_health = config.enable_health.unwrap_or(true);
    let enable_tls = config.enable_tls.unwrap_or(false);
    let tls_paths = (config.tls_cert_path.clone(), config.tls_key_path.clone());

    // Initialize Prometheus metrics registry
    let registry = Registry::new();
    let metrics = IostatMetrics::new(&registry)?;

    let state = AppState::new(config, registry, metrics);
    info!(
        "Collecting for host '{}' (cache_ttl {}s)",
        state.host,
        state.config.cache_ttl().as_secs()
    );

    info!("Performing initial collection");
    if let Err(e) = cache_updater::update_cache(&state).await {
        error!("Initial collection failed: {}", e);
    } else {
        info!("Initial collection completed successfully");
    }

    info!("Note: No background collection task - cycles are triggered by requests");

    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler));

    if enable_health {
        app = app.route("/health", get(health_handler));
    }

    let app = app
        .route("/config", get(config_handler))
        .route("/stats", get(stats_handler))
        .with_state(state.clone());

    if enable_tls {
        // validate_effective_config() guarantees both paths when TLS is enabled
        let (Some(cert_path), Some(key_path)) = tls_paths else {
            return Err("TLS enabled without tls_cert_path and tls_key_path".into());
        };

        info!("Loading TLS certificate from: {}", cert_path);
        info!("Loading TLS private key from: {}", key_path);

        let tls_config = RustlsConfig::from_pem_file(&cert_path, &key_path)
            .await
            .map_err(|e| {
                error!("Failed to load TLS configuration: {}", e);
                e
            })?;

        info!(
            "herakles-iostat-exporter listening on https://{}:{}",
            bind_ip_str, port
        );

        let server = axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service());

        tokio::select! {
            result = server => {
                if let Err(e) = result {
                    error!("Server error: {}", e);
                    return Err(e.into());
                }
            }
            _ = shutdown_signal() => {
                info!("Shutdown signal received, exiting...");
            }
        }
    } else {
        let listener = TcpListener::bind(addr).await?;
        info!(
            "herakles-iostat-exporter listening on http://{}:{}",
            bind_ip_str, port
        );

        tokio::select! {
            result = axum::serve(listener, app) => {
                if let Err(e) = result {
                    error!("Server error: {}", e);
                    return Err(e.into());
                }
            }
            _ = shutdown_signal() => {
                info!("Shutdown signal received, exiting...");
            }
        }
    }

    info!("herakles-iostat-exporter stopped gracefully");
    Ok(())
}
