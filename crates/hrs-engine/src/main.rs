//! Engine binary for the HRS hierarchical reward system.
//!
//! Loads a deployment, constructs the organization, and logs every
//! notification it publishes until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$HRS_CONFIG` or `hrs-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Construct the organization from the deployment snapshot
//! 4. Attach the notification listener
//! 5. Wait for Ctrl-C, then drop the organization and join the listener

mod error;
mod listener;

use std::path::PathBuf;

use hrs_core::config::LoggingConfig;
use hrs_core::{HrsConfig, Organization};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "hrs-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, logging, or organization construction
/// fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so errors surface
    //    through the returned error.
    let config_path = config_path();
    let config = HrsConfig::from_file(&config_path).map_err(EngineError::from)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!(
        path = %config_path.display(),
        level = %config.logging.level,
        json = config.logging.json,
        "Configuration loaded"
    );

    // 3. Construct the organization.
    let organization = Organization::from_config(&config).map_err(EngineError::from)?;
    let graph = organization.hierarchy();
    let max_depth = graph
        .agents()
        .filter_map(|agent| graph.depth_of(agent))
        .max()
        .unwrap_or(0);
    info!(
        owner = %organization.get_owner(),
        principal = %organization.principal(),
        root = %graph.root(),
        agents = graph.len(),
        max_depth,
        default_term_seconds = organization.settings().default_term_seconds,
        reward_requires_principal = organization.settings().require_principal_for_rewards,
        "Organization ready"
    );

    // 4. Attach the notification listener.
    let listener = tokio::spawn(listener::run(organization.subscribe()));
    info!(
        listeners = organization.notifications().listener_count(),
        "Notification listener started"
    );

    // 5. Run until interrupted.
    tokio::signal::ctrl_c().await.map_err(EngineError::from)?;
    info!("Shutdown requested");
    drop(organization);

    let logged = listener.await.map_err(|e| EngineError::Listener {
        message: format!("{e}"),
    })?;
    info!(logged, "hrs-engine shutdown complete");

    Ok(())
}

/// Resolve the configuration file: `HRS_CONFIG` if set, else the default.
fn config_path() -> PathBuf {
    std::env::var_os("HRS_CONFIG").map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the configured level applies.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level).map_err(|e| EngineError::Logging {
            message: format!("invalid log level {:?}: {e}", logging.level),
        })?,
    };

    let result = if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };
    result.map_err(|e| EngineError::Logging {
        message: format!("{e}"),
    })
}
