//! Shard topology trait and static implementation.
//!
//! The network is a two-level tree under the beacon shard: root shards, each
//! owning a set of child (processing) shards.

use crate::ShardGroupId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Read-only view of the shard tree.
pub trait ShardTopology: Send + Sync {
    /// Root shard ids, in configuration order.
    fn root_shards(&self) -> Vec<ShardGroupId>;

    /// Child shard ids of a root shard. Empty for unknown roots.
    fn child_shards(&self, root: ShardGroupId) -> &[ShardGroupId];

    // Derived methods

    /// Every shard in the tree: the beacon, all roots and all children.
    fn all_shards(&self) -> BTreeSet<ShardGroupId> {
        let mut shards = BTreeSet::new();
        shards.insert(ShardGroupId::BEACON);
        for root in self.root_shards() {
            shards.insert(root);
            shards.extend(self.child_shards(root).iter().copied());
        }
        shards
    }

    /// Check if a shard is part of the tree.
    fn contains(&self, shard: ShardGroupId) -> bool {
        self.all_shards().contains(&shard)
    }
}

/// A root shard and the child shards it coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootShardGroup {
    /// The root shard id.
    pub root: ShardGroupId,
    /// Child shard ids.
    #[serde(default)]
    pub children: Vec<ShardGroupId>,
}

/// A topology fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StaticShardTopology {
    #[serde(default)]
    groups: Vec<RootShardGroup>,
}

impl StaticShardTopology {
    /// Create an empty topology (beacon shard only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root shard with its children.
    pub fn with_root(
        mut self,
        root: ShardGroupId,
        children: impl IntoIterator<Item = ShardGroupId>,
    ) -> Self {
        self.groups.push(RootShardGroup {
            root,
            children: children.into_iter().collect(),
        });
        self
    }

    /// The configured root groups.
    pub fn groups(&self) -> &[RootShardGroup] {
        &self.groups
    }
}

impl ShardTopology for StaticShardTopology {
    fn root_shards(&self) -> Vec<ShardGroupId> {
        self.groups.iter().map(|g| g.root).collect()
    }

    fn child_shards(&self, root: ShardGroupId) -> &[ShardGroupId] {
        self.groups
            .iter()
            .find(|g| g.root == root)
            .map(|g| g.children.as_slice())
            .unwrap_or(&[])
    }
}
