//! Daemon configuration with TOML file support.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dareboard_types::AdminId;
use dareboard_utils::LogFormat;
use dareboard_verification::VerificationParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration for the Dareboard daemon.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Port the HTTP API listens on.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// JSON-RPC endpoint serving chain facts.
    #[serde(default = "default_chain_rpc_url")]
    pub chain_rpc_url: String,

    #[serde(default = "default_fact_timeout_ms")]
    pub fact_timeout_ms: u64,

    /// Votes a tally leader needs before a winner claim can verify.
    #[serde(default = "default_min_winning_votes")]
    pub min_winning_votes: u64,

    /// Whether admins may re-decide Verified or Rejected records.
    #[serde(default = "default_true")]
    pub allow_terminal_override: bool,

    /// Moderator allowlist. Empty accepts any well-formed admin id.
    #[serde(default)]
    pub admins: Vec<String>,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Filter directive, e.g. "info" or "debug,dareboard_verification=trace".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub enable_metrics: bool,

    #[serde(default = "default_lmdb_map_size")]
    pub lmdb_map_size: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./dareboard_data")
}

fn default_rpc_port() -> u16 {
    7080
}

fn default_chain_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_fact_timeout_ms() -> u64 {
    10_000
}

fn default_min_winning_votes() -> u64 {
    1
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_lmdb_map_size() -> usize {
    dareboard_store_lmdb::DEFAULT_MAP_SIZE
}

impl DaemonConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Engine and moderation parameters, validating the admin list.
    pub fn verification_params(&self) -> Result<VerificationParams, ConfigError> {
        if self.fact_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "fact_timeout_ms",
                reason: "must be greater than zero".into(),
            });
        }
        let admins = self
            .admins
            .iter()
            .map(|raw| {
                AdminId::parse(raw.as_str()).map_err(|e| ConfigError::Invalid {
                    field: "admins",
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VerificationParams {
            fact_timeout: Duration::from_millis(self.fact_timeout_ms),
            min_winning_votes: self.min_winning_votes,
            allow_terminal_override: self.allow_terminal_override,
            admins,
        })
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            rpc_port: default_rpc_port(),
            chain_rpc_url: default_chain_rpc_url(),
            fact_timeout_ms: default_fact_timeout_ms(),
            min_winning_votes: default_min_winning_votes(),
            allow_terminal_override: true,
            admins: Vec::new(),
            log_format: LogFormat::Human,
            log_level: default_log_level(),
            enable_metrics: false,
            lmdb_map_size: default_lmdb_map_size(),
        }
    }
}
