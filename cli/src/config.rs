//! CLI configuration with TOML file support.
//!
//! File settings are the base; CLI flags and env vars override them.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use verity_flow::FlowConfig;
use verity_history::ScanConfig;
use verity_types::Address;

/// Configuration for the Verity CLI.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerityConfig {
    /// Verification flow parameters.
    #[serde(default)]
    pub flow: FlowConfig,

    /// History scan pacing parameters.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Directory for the persistent block cache.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// JSON-RPC endpoint of the ledger node. When absent, the CLI runs
    /// against its built-in mock chain.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Address of the verification contract (required with `rpc_url`).
    #[serde(default)]
    pub contract: Option<Address>,

    /// Base URL of the remote attestor service. When absent, attestations
    /// are mocked.
    #[serde(default)]
    pub attestor_url: Option<String>,

    /// Application id presented to the attestor service.
    #[serde(default = "default_attestor_app_id")]
    pub attestor_app_id: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./verity_data")
}

fn default_attestor_app_id() -> String {
    "verity-cli".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

impl Default for VerityConfig {
    fn default() -> Self {
        Self {
            flow: FlowConfig::default(),
            scan: ScanConfig::default(),
            data_dir: default_data_dir(),
            rpc_url: None,
            contract: None,
            attestor_url: None,
            attestor_app_id: default_attestor_app_id(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl VerityConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }
}
