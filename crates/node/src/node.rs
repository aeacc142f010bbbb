//! Construction of a node's key store and transaction pool.

use crate::{init_tracing, ConfigError, NodeConfig};
use shardline_keystore::KeyRegistryStore;
use shardline_mempool::TransactionPool;
use shardline_types::{LocalNode, StaticShardTopology};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// The shared state a consensus engine runs against.
///
/// Both components are internally synchronized and handed out as `Arc`s so
/// the engine, network handlers and proposer can hold them concurrently.
#[derive(Debug, Clone)]
pub struct NodeCore {
    node: LocalNode,
    topology: StaticShardTopology,
    key_store: Arc<KeyRegistryStore>,
    pool: Arc<TransactionPool>,
}

impl NodeCore {
    /// Load the config at `path`, install tracing with its `log_filter` and
    /// build the node.
    ///
    /// An already installed global subscriber is kept.
    pub fn start(path: &Path) -> Result<Self, ConfigError> {
        let config = NodeConfig::load(path)?;
        if let Err(e) = init_tracing(&config.log_filter) {
            debug!(error = %e, "Tracing subscriber already installed");
        }
        Self::new(&config)
    }

    /// Validate `config` and build the node's components.
    ///
    /// The key store starts with an empty registry for every shard in the
    /// topology. The pool is pre-seeded from the workload fixture when the
    /// node qualifies.
    pub fn new(config: &NodeConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let key_store = KeyRegistryStore::from_config(&config.topology, &config.keystore);
        let pool = TransactionPool::for_node(&config.mempool, &config.node);

        info!(
            shard = %config.node.shard,
            node = %config.node.validator_id,
            leader = config.node.is_leader,
            registries = key_store.registry_count(),
            pending = pool.pending_tx_count(),
            "Node core initialised"
        );

        Ok(Self {
            node: config.node,
            topology: config.topology.clone(),
            key_store: Arc::new(key_store),
            pool: Arc::new(pool),
        })
    }

    /// This node's identity.
    pub fn local_node(&self) -> &LocalNode {
        &self.node
    }

    /// The shard tree.
    pub fn topology(&self) -> &StaticShardTopology {
        &self.topology
    }

    /// Committee key store.
    pub fn key_store(&self) -> &Arc<KeyRegistryStore> {
        &self.key_store
    }

    /// Transaction pool.
    pub fn pool(&self) -> &Arc<TransactionPool> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardline_mempool::MempoolConfig;
    use shardline_types::{ShardGroupId, ValidatorId};

    fn make_config(shard: u64, leader: bool) -> NodeConfig {
        let topology = StaticShardTopology::new()
            .with_root(ShardGroupId(1), [ShardGroupId(1001), ShardGroupId(1002)]);
        let node = LocalNode::new(ShardGroupId(shard), ValidatorId(0)).with_leader(leader);
        NodeConfig::new(node, topology)
    }

    #[test]
    fn test_new_builds_registries_for_topology() {
        let core = NodeCore::new(&make_config(1001, false)).unwrap();

        assert_eq!(core.key_store().registry_count(), 4);
        assert!(core.pool().is_empty());
        assert_eq!(core.local_node().shard, ShardGroupId(1001));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(matches!(
            NodeCore::new(&make_config(2002, false)),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_leader_without_fixture_dir_starts_empty() {
        let config = make_config(1002, true).with_mempool(MempoolConfig::new());
        let core = NodeCore::new(&config).unwrap();
        assert!(core.pool().is_empty());
    }
}
