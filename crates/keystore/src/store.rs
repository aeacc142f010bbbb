//! Routing of key operations to per-shard registries.

use crate::{CertificateLoader, KeyStoreConfig, ShardKeyRegistry};
use parking_lot::Mutex;
use shardline_types::{
    AggregatePublicKey, BlsPublicKey, BlsScheme, CommitteeBitmap, KeyError, ShardGroupId,
    ShardTopology, ValidatorId,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a multi-shard reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetSummary {
    /// Number of keys refreshed, per shard that completed.
    pub refreshed: BTreeMap<ShardGroupId, usize>,
    /// Shards whose bundle could not be loaded.
    pub failed: BTreeSet<ShardGroupId>,
}

impl ResetSummary {
    /// Check if every shard completed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total keys refreshed across shards.
    pub fn total_refreshed(&self) -> usize {
        self.refreshed.values().sum()
    }
}

/// Committee public keys for every shard this node tracks.
///
/// Registries for the shards named by the topology exist from construction.
/// Writes to any other shard create its registry on demand; reads never do.
#[derive(Debug)]
pub struct KeyRegistryStore {
    scheme: BlsScheme,
    loader: CertificateLoader,
    registries: Mutex<HashMap<ShardGroupId, Arc<ShardKeyRegistry>>>,
}

impl KeyRegistryStore {
    /// Create a store with an empty registry for every shard in `topology`.
    pub fn new(
        topology: &dyn ShardTopology,
        scheme: BlsScheme,
        loader: CertificateLoader,
    ) -> Self {
        let registries: HashMap<_, _> = topology
            .all_shards()
            .into_iter()
            .map(|shard| (shard, Arc::new(ShardKeyRegistry::new(shard, scheme))))
            .collect();

        info!(
            shards = registries.len(),
            bundle = %loader.path().display(),
            "Created key registry store"
        );

        Self {
            scheme,
            loader,
            registries: Mutex::new(registries),
        }
    }

    /// Create a store from its configuration.
    pub fn from_config(topology: &dyn ShardTopology, config: &KeyStoreConfig) -> Self {
        Self::new(topology, config.scheme(), config.loader())
    }

    /// The scheme used to decode keys.
    pub fn scheme(&self) -> BlsScheme {
        self.scheme
    }

    /// The loader used by [`reset`](Self::reset).
    pub fn loader(&self) -> &CertificateLoader {
        &self.loader
    }

    /// Register `raw_key` for `node` on `shard`, creating the shard's
    /// registry if needed.
    ///
    /// Returns `Ok(true)` if `node` had no key on `shard` before.
    pub fn add_pub_key(
        &self,
        shard: ShardGroupId,
        node: ValidatorId,
        raw_key: &[u8],
    ) -> Result<bool, KeyError> {
        self.registry_or_create(shard).add(node, raw_key)
    }

    /// Aggregate key of the members of `shard` selected by `bitmap`.
    ///
    /// `None` if the shard has no registry.
    pub fn get_aggregate_pub_key(
        &self,
        shard: ShardGroupId,
        bitmap: &CommitteeBitmap,
        offset: u64,
    ) -> Option<AggregatePublicKey> {
        self.registry(shard)
            .map(|registry| registry.get_aggregate_pub_key(bitmap, offset))
    }

    /// Key of `node` on `shard`.
    pub fn get_pub_key(&self, shard: ShardGroupId, node: ValidatorId) -> Option<BlsPublicKey> {
        self.registry(shard)?.get_pub_key(node)
    }

    /// Refresh the listed nodes of each shard from the certificate bundle.
    ///
    /// Shards are handled independently: a shard whose reset fails is
    /// recorded in [`ResetSummary::failed`] and the others proceed.
    pub fn reset(
        &self,
        nodes_by_shard: &BTreeMap<ShardGroupId, Vec<ValidatorId>>,
    ) -> ResetSummary {
        let mut summary = ResetSummary::default();

        for (&shard, node_ids) in nodes_by_shard {
            let registry = self.registry_or_create(shard);
            match registry.reset(node_ids, &self.loader) {
                Ok(count) => {
                    summary.refreshed.insert(shard, count);
                }
                Err(_) => {
                    summary.failed.insert(shard);
                }
            }
        }

        info!(
            shards = nodes_by_shard.len(),
            refreshed = summary.total_refreshed(),
            failed = summary.failed.len(),
            "Reset committee keys"
        );

        summary
    }

    /// Shards with a registry, ascending.
    pub fn shard_ids(&self) -> Vec<ShardGroupId> {
        let mut shards: Vec<_> = self.registries.lock().keys().copied().collect();
        shards.sort();
        shards
    }

    /// Check if `shard` has a registry.
    pub fn has_shard(&self, shard: ShardGroupId) -> bool {
        self.registries.lock().contains_key(&shard)
    }

    /// Number of registries.
    pub fn registry_count(&self) -> usize {
        self.registries.lock().len()
    }

    fn registry(&self, shard: ShardGroupId) -> Option<Arc<ShardKeyRegistry>> {
        self.registries.lock().get(&shard).cloned()
    }

    fn registry_or_create(&self, shard: ShardGroupId) -> Arc<ShardKeyRegistry> {
        let mut registries = self.registries.lock();
        registries
            .entry(shard)
            .or_insert_with(|| {
                debug!(shard = %shard, "Creating key registry for unknown shard");
                Arc::new(ShardKeyRegistry::new(shard, self.scheme))
            })
            .clone()
    }
}
