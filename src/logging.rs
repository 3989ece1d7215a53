//! Logging init: structured events on stderr, where serverless hosts collect them.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,imgverify=debug";

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
///
/// Returns Err if a subscriber is already installed; a warm host calling this
/// once per invocation can ignore that.
pub fn init_logging() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("logging already initialized: {}", e))?;

    tracing::debug!("imgverify logging initialized");
    Ok(())
}
