use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sweep_engine::{PoolConfig, TransportSettings};
use sweep_logging::sweep_info;

/// Everything the binary can be configured with. Any subset may be given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pool: PoolConfig,
    pub transport: TransportSettings,
}

/// Load `path` as RON, or the defaults when no file is given.
pub fn load(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let content =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let config = parse(&content).with_context(|| format!("parsing config {}", path.display()))?;
    sweep_info!("Loaded configuration from {:?}", path);
    Ok(config)
}

fn parse(content: &str) -> anyhow::Result<AppConfig> {
    Ok(ron::from_str(content)?)
}
