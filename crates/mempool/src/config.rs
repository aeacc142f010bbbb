//! Configuration for the transaction pool.

use serde::{Deserialize, Serialize};
use shardline_types::{LocalNode, ShardGroupId};
use std::path::PathBuf;

/// Configuration for the transaction pool and its startup workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MempoolConfig {
    /// Directory holding workload fixtures. Pre-seeding is off when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture_dir: Option<PathBuf>,

    /// Dataset name, used as the fixture file prefix.
    pub fixture_dataset: String,

    /// Only shards with an id strictly above this are pre-seeded.
    ///
    /// Ids at or below it belong to the beacon and root shards, which do not
    /// process user transactions.
    pub seed_threshold: u64,
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            fixture_dir: None,
            fixture_dataset: "monoxide".to_string(),
            seed_threshold: 1000,
        }
    }
}

impl MempoolConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fixture directory.
    pub fn with_fixture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixture_dir = Some(dir.into());
        self
    }

    /// Set the dataset name.
    pub fn with_fixture_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.fixture_dataset = dataset.into();
        self
    }

    /// Set the seed threshold.
    pub fn with_seed_threshold(mut self, threshold: u64) -> Self {
        self.seed_threshold = threshold;
        self
    }

    /// Fixture file for `shard`: `<dir>/<dataset>_shard_<id>_txs.json`.
    pub fn fixture_path(&self, shard: ShardGroupId) -> Option<PathBuf> {
        self.fixture_dir.as_ref().map(|dir| {
            dir.join(format!(
                "{}_shard_{}_txs.json",
                self.fixture_dataset, shard.0
            ))
        })
    }

    /// Check if `node` should start with a pre-seeded pool.
    pub fn should_seed(&self, node: &LocalNode) -> bool {
        node.is_leader && node.shard.0 > self.seed_threshold && self.fixture_dir.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardline_types::ValidatorId;

    #[test]
    fn test_fixture_path() {
        let config = MempoolConfig::new()
            .with_fixture_dir("/data/workload")
            .with_fixture_dataset("estuary");

        assert_eq!(
            config.fixture_path(ShardGroupId(1003)),
            Some(PathBuf::from("/data/workload/estuary_shard_1003_txs.json"))
        );
        assert_eq!(MempoolConfig::default().fixture_path(ShardGroupId(1003)), None);
    }

    #[test]
    fn test_should_seed_rules() {
        let config = MempoolConfig::new().with_fixture_dir("/data");
        let leader = |shard| LocalNode::new(ShardGroupId(shard), ValidatorId(0)).with_leader(true);

        assert!(config.should_seed(&leader(1001)));
        assert!(!config.should_seed(&leader(1000)));
        assert!(!config.should_seed(&leader(1)));
        assert!(!config.should_seed(&LocalNode::new(ShardGroupId(1001), ValidatorId(0))));
        assert!(!MempoolConfig::default().should_seed(&leader(1001)));

        let lowered = config.with_seed_threshold(0);
        assert!(lowered.should_seed(&leader(1)));
    }
}
