// CLI Configuration
//
// Optional JSON file; every field can be overridden by a flag.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Organization the caller acts as.
    pub msp_id: Option<String>,

    /// JSON file holding the store snapshot between invocations.
    pub state_path: String,

    /// `tracing` filter directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl CliConfig {
    /// Built-in configuration (used if no config file is provided).
    pub fn default_config() -> Self {
        Self {
            msp_id: None,
            state_path: "employees-state.json".into(),
            log_filter: "info".into(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parsing config {}", path.display()))
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
