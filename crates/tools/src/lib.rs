//! Shared plumbing for the headless binaries: config loading and log setup.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use skirmish_core::{CommandScript, SimConfig};
use tracing_subscriber::EnvFilter;

/// Reads and validates a `SimConfig` from a TOML file. Missing fields fall back to defaults.
pub fn load_config(path: &Path) -> Result<SimConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: SimConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    config.validate().with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(config)
}

pub fn load_script(path: &Path) -> Result<CommandScript> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read script file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to deserialize script {}", path.display()))
}

/// Installs a stderr subscriber filtered by `RUST_LOG`, defaulting to `warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}
