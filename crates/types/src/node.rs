//! Identity of the local node.

use crate::{ShardGroupId, ValidatorId};
use serde::{Deserialize, Serialize};

/// Where this node sits in the network and the role it plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalNode {
    /// Shard the node belongs to.
    pub shard: ShardGroupId,
    /// The node's validator id within its shard committee.
    pub validator_id: ValidatorId,
    /// Whether the node currently leads its shard.
    #[serde(default)]
    pub is_leader: bool,
}

impl LocalNode {
    /// Create a non-leader node.
    pub fn new(shard: ShardGroupId, validator_id: ValidatorId) -> Self {
        Self {
            shard,
            validator_id,
            is_leader: false,
        }
    }

    /// Mark the node as leader (or not).
    pub fn with_leader(mut self, is_leader: bool) -> Self {
        self.is_leader = is_leader;
        self
    }
}
