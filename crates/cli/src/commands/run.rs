//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::session::{Session, SessionConfig};

/// Execute the `run` command
pub async fn run_session(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        endpoint = %blueprint.request.endpoint,
        default_params = blueprint.request.params.len(),
        item_limit = blueprint.limits.item_limit,
        "Configuration loaded"
    );

    if let Some(ref endpoint) = args.endpoint {
        info!(endpoint = %endpoint, "Overriding baseline endpoint from CLI");
    }

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build session configuration
    let session_config = SessionConfig {
        blueprint,
        items: args.items,
        max_size_kb: args.max_size_kb,
        quota_delay: if args.async_quota_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(args.async_quota_ms))
        },
        endpoint_override: args.endpoint.clone(),
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run session
    let session = Session::new(session_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting session...");

    // Run session with shutdown signal
    tokio::select! {
        result = session.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        queued = stats.queued,
                        rejected = stats.rejected,
                        sent = stats.requests_sent,
                        duration_secs = stats.duration.as_secs_f64(),
                        "Session completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Session execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping session...");
        }
    }

    info!("Upload Gate finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::UploaderBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Request:");
    println!("  Endpoint: {}", blueprint.request.endpoint);

    if !blueprint.request.params.is_empty() {
        println!("\nDefault Parameters ({}):", blueprint.request.params.len());
        let mut names: Vec<_> = blueprint.request.params.keys().collect();
        names.sort();
        for name in names {
            println!("  - {} = {}", name, blueprint.request.params[name]);
        }
    }

    println!("\nLimits:");
    if blueprint.limits.item_limit == 0 {
        println!("  Item limit: unlimited");
    } else {
        println!("  Item limit: {}", blueprint.limits.item_limit);
    }

    println!();
}
