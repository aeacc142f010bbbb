//! Node configuration file.
//!
//! ```toml
//! log_filter = "info"
//!
//! [node]
//! shard = 1001
//! validator_id = 3
//! is_leader = true
//!
//! [[topology.groups]]
//! root = 1
//! children = [1001, 1002]
//!
//! [keystore]
//! certificate_path = "cert/cert.json"
//! key_encoding = "compressed"
//!
//! [mempool]
//! fixture_dir = "datasets"
//! fixture_dataset = "monoxide"
//! ```

use serde::{Deserialize, Serialize};
use shardline_keystore::KeyStoreConfig;
use shardline_mempool::MempoolConfig;
use shardline_types::{LocalNode, ShardTopology, StaticShardTopology};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Errors raised while loading or checking a node configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but is inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Default tracing filter, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Identity and role of this node.
    pub node: LocalNode,

    /// Shard tree this node participates in.
    #[serde(default)]
    pub topology: StaticShardTopology,

    /// Committee key store settings.
    #[serde(default)]
    pub keystore: KeyStoreConfig,

    /// Transaction pool settings.
    #[serde(default)]
    pub mempool: MempoolConfig,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl NodeConfig {
    /// Create a config for `node` with default settings.
    pub fn new(node: LocalNode, topology: StaticShardTopology) -> Self {
        Self {
            log_filter: default_log_filter(),
            node,
            topology,
            keystore: KeyStoreConfig::default(),
            mempool: MempoolConfig::default(),
        }
    }

    /// Set the key store settings.
    pub fn with_keystore(mut self, keystore: KeyStoreConfig) -> Self {
        self.keystore = keystore;
        self
    }

    /// Set the transaction pool settings.
    pub fn with_mempool(mut self, mempool: MempoolConfig) -> Self {
        self.mempool = mempool;
        self
    }

    /// Set the default tracing filter.
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Read, parse and validate the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Encode the configuration as TOML text.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Check the configuration for inconsistencies.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.topology.contains(self.node.shard) {
            return Err(ConfigError::Invalid(format!(
                "local {} is not part of the topology",
                self.node.shard
            )));
        }

        let mut seen = BTreeSet::new();
        for shard in self.topology.root_shards().into_iter().chain(
            self.topology
                .groups()
                .iter()
                .flat_map(|g| g.children.iter().copied()),
        ) {
            if shard.is_beacon() {
                return Err(ConfigError::Invalid(
                    "the beacon shard cannot be a root or child shard".to_string(),
                ));
            }
            if !seen.insert(shard) {
                return Err(ConfigError::Invalid(format!(
                    "{} appears more than once in the topology",
                    shard
                )));
            }
        }

        if self.mempool.fixture_dataset.is_empty() {
            return Err(ConfigError::Invalid(
                "mempool.fixture_dataset must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
