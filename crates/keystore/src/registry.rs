//! Public key registry for a single shard's committee.

use crate::{CertificateError, CertificateLoader};
use parking_lot::Mutex;
use shardline_types::{
    AggregatePublicKey, BlsPublicKey, BlsScheme, CommitteeBitmap, KeyError, ShardGroupId,
    ValidatorId,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Map of validator id to BLS public key for one shard.
///
/// All operations go through a single lock, so readers always see a
/// consistent map. Keys are only ever inserted or replaced; nothing here
/// removes a member.
#[derive(Debug)]
pub struct ShardKeyRegistry {
    shard: ShardGroupId,
    scheme: BlsScheme,
    keys: Mutex<HashMap<ValidatorId, BlsPublicKey>>,
}

impl ShardKeyRegistry {
    /// Create an empty registry for `shard`.
    pub fn new(shard: ShardGroupId, scheme: BlsScheme) -> Self {
        Self {
            shard,
            scheme,
            keys: Mutex::new(HashMap::new()),
        }
    }

    /// The shard this registry serves.
    pub fn shard(&self) -> ShardGroupId {
        self.shard
    }

    /// Decode `raw_key` and store it for `node`, replacing any previous key.
    ///
    /// Returns `Ok(true)` if `node` had no key before. Malformed keys are
    /// rejected without touching the registry.
    pub fn add(&self, node: ValidatorId, raw_key: &[u8]) -> Result<bool, KeyError> {
        let key = self.scheme.decode_public_key(raw_key).inspect_err(|e| {
            warn!(shard = %self.shard, node = %node, error = %e, "Rejected malformed public key");
        })?;

        let inserted = self.keys.lock().insert(node, key).is_none();
        debug!(shard = %self.shard, node = %node, inserted, "Registered public key");
        Ok(inserted)
    }

    /// The key registered for `node`.
    pub fn get_pub_key(&self, node: ValidatorId) -> Option<BlsPublicKey> {
        self.keys.lock().get(&node).cloned()
    }

    /// Sum the keys of the members selected by `bitmap`.
    ///
    /// Position `p` maps to validator `p + offset`. Members without a key,
    /// and positions whose id would overflow, are skipped with a warning, so
    /// the result may cover fewer signers than the bitmap selects. An empty
    /// bitmap yields the identity.
    pub fn get_aggregate_pub_key(
        &self,
        bitmap: &CommitteeBitmap,
        offset: u64,
    ) -> AggregatePublicKey {
        let keys = self.keys.lock();
        let mut aggregate = AggregatePublicKey::identity();

        for position in bitmap.elements() {
            let Some(node) = ValidatorId::at_position(position, offset) else {
                warn!(
                    shard = %self.shard,
                    position,
                    offset,
                    "Committee position overflows validator id space"
                );
                continue;
            };

            match keys.get(&node) {
                Some(key) => aggregate.add(key),
                None => {
                    warn!(
                        shard = %self.shard,
                        position,
                        node = %node,
                        "Missing public key for committee member"
                    );
                }
            }
        }

        aggregate
    }

    /// Refresh the keys of `node_ids` from the trusted certificate bundle.
    ///
    /// The registry stays locked for the whole refresh, bundle read
    /// included. If the bundle cannot be loaded the registry is left
    /// untouched. Ids missing from the bundle, or whose entry does not
    /// decode, keep their current key.
    ///
    /// Returns the number of keys refreshed.
    pub fn reset(
        &self,
        node_ids: &[ValidatorId],
        loader: &CertificateLoader,
    ) -> Result<usize, CertificateError> {
        let mut keys = self.keys.lock();

        let bundle = loader.load().inspect_err(|_| {
            warn!(shard = %self.shard, "Reset aborted, registry unchanged");
        })?;

        let mut refreshed = 0;
        for &node in node_ids {
            let Some(hex_key) = bundle.key_for(node) else {
                warn!(shard = %self.shard, node = %node, "No bundle entry for node");
                continue;
            };

            match self.scheme.decode_hex_public_key(hex_key) {
                Ok(key) => {
                    keys.insert(node, key);
                    refreshed += 1;
                }
                Err(e) => {
                    warn!(
                        shard = %self.shard,
                        node = %node,
                        error = %e,
                        "Skipping undecodable bundle entry"
                    );
                }
            }
        }

        info!(
            shard = %self.shard,
            requested = node_ids.len(),
            refreshed,
            "Reset public keys from certificate bundle"
        );

        Ok(refreshed)
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    /// Check if no keys are registered.
    pub fn is_empty(&self) -> bool {
        self.keys.lock().is_empty()
    }

    /// Check if `node` has a key.
    pub fn contains(&self, node: ValidatorId) -> bool {
        self.keys.lock().contains_key(&node)
    }

    /// Ids with a registered key, ascending.
    pub fn node_ids(&self) -> Vec<ValidatorId> {
        let mut ids: Vec<_> = self.keys.lock().keys().copied().collect();
        ids.sort();
        ids
    }
}
