//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Committee member identifier.
///
/// Unique within a shard's committee namespace. Committee bitmap positions
/// map onto identifiers by adding a per-committee offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ValidatorId(pub u64);

impl ValidatorId {
    /// Identifier of the member sitting at `position` in a committee whose
    /// first member has identifier `offset`.
    ///
    /// `None` when the sum falls outside the id space.
    pub fn at_position(position: usize, offset: u64) -> Option<Self> {
        let position = u64::try_from(position).ok()?;
        offset.checked_add(position).map(ValidatorId)
    }
}

impl fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator({})", self.0)
    }
}

/// Shard group identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ShardGroupId(pub u64);

impl ShardGroupId {
    /// The beacon shard, which coordinates the root shards.
    pub const BEACON: Self = ShardGroupId(0);

    /// Check if this is the beacon shard.
    pub fn is_beacon(&self) -> bool {
        *self == Self::BEACON
    }
}

impl fmt::Display for ShardGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shard({})", self.0)
    }
}

/// Height of a block on its shard's chain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct BlockHeight(pub u64);

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_at_position() {
        assert_eq!(ValidatorId::at_position(0, 0), Some(ValidatorId(0)));
        assert_eq!(ValidatorId::at_position(3, 9), Some(ValidatorId(12)));
    }

    #[test]
    fn test_validator_at_position_overflow() {
        assert_eq!(
            ValidatorId::at_position(0, u64::MAX),
            Some(ValidatorId(u64::MAX))
        );
        assert_eq!(ValidatorId::at_position(1, u64::MAX), None);
    }

    #[test]
    fn test_beacon_shard() {
        assert!(ShardGroupId::BEACON.is_beacon());
        assert!(!ShardGroupId(1001).is_beacon());
    }

    #[test]
    fn test_identifiers_serialize_transparently() {
        let json = serde_json::to_string(&ShardGroupId(1003)).unwrap();
        assert_eq!(json, "1003");

        let id: ValidatorId = serde_json::from_str("17").unwrap();
        assert_eq!(id, ValidatorId(17));
    }
}
