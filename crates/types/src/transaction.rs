//! Transactions and the cross-shard chunks that carry them.

use crate::{BlockHeight, Hash, ShardGroupId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    /// Size of an address in bytes.
    pub const BYTES: usize = 20;

    /// Create an address from its 20 bytes.
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build an address from arbitrary raw bytes.
    ///
    /// Inputs longer than 20 bytes keep their last 20 bytes; shorter inputs
    /// are left-padded with zeros.
    pub fn from_raw_bytes(raw: &[u8]) -> Self {
        let mut bytes = [0u8; 20];
        let tail = &raw[raw.len().saturating_sub(Self::BYTES)..];
        bytes[Self::BYTES - tail.len()..].copy_from_slice(tail);
        Self(bytes)
    }

    /// Get the bytes as a slice.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A value transfer, possibly between shards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Shard the transaction originates from.
    pub from_shard: ShardGroupId,
    /// Shard the transaction is destined for.
    pub to_shard: ShardGroupId,
    /// Sending account.
    pub from_address: Address,
    /// Receiving account.
    pub to_address: Address,
    /// Transferred amount.
    pub value: u64,
    /// Opaque payload.
    pub data: Vec<u8>,
    /// Workload-assigned identifier, shared by every copy of the transaction.
    pub logical_hash: String,
}

impl Transaction {
    /// Create a new transaction.
    pub fn new(
        from_shard: ShardGroupId,
        to_shard: ShardGroupId,
        from_address: Address,
        to_address: Address,
        value: u64,
        data: Vec<u8>,
        logical_hash: impl Into<String>,
    ) -> Self {
        Self {
            from_shard,
            to_shard,
            from_address,
            to_address,
            value,
            data,
            logical_hash: logical_hash.into(),
        }
    }

    /// Check if the transaction crosses a shard boundary.
    pub fn is_cross_shard(&self) -> bool {
        self.from_shard != self.to_shard
    }

    /// Compute the content hash of this transaction.
    pub fn hash(&self) -> Hash {
        Hash::from_parts(&[
            &self.from_shard.0.to_le_bytes(),
            &self.to_shard.0.to_le_bytes(),
            self.from_address.as_bytes(),
            self.to_address.as_bytes(),
            &self.value.to_le_bytes(),
            &(self.data.len() as u64).to_le_bytes(),
            &self.data,
            self.logical_hash.as_bytes(),
        ])
    }
}

/// An ordered batch of transactions moving from one shard to another.
///
/// The receiving shard schedules a chunk as a unit: it is either taken into
/// a block whole or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundChunk {
    /// Shard that produced the chunk.
    pub source_shard: ShardGroupId,
    /// Shard the chunk is delivered to.
    pub target_shard: ShardGroupId,
    /// Height of the source block that emitted the chunk.
    pub source_height: BlockHeight,
    /// The transactions, in execution order.
    pub txs: Vec<Transaction>,
}

impl OutboundChunk {
    /// Create a new chunk.
    pub fn new(
        source_shard: ShardGroupId,
        target_shard: ShardGroupId,
        source_height: BlockHeight,
        txs: Vec<Transaction>,
    ) -> Self {
        Self {
            source_shard,
            target_shard,
            source_height,
            txs,
        }
    }

    /// Deep copy of the chunk, including every transaction it carries.
    ///
    /// The copy shares no buffers with `self`.
    pub fn duplicate(&self) -> Self {
        Self {
            source_shard: self.source_shard,
            target_shard: self.target_shard,
            source_height: self.source_height,
            txs: self.txs.iter().map(Transaction::clone).collect(),
        }
    }

    /// Number of transactions in the chunk.
    pub fn len(&self) -> usize {
        self.txs.len()
    }

    /// Check if the chunk carries no transactions.
    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    /// Compute a hash identifying the chunk and its contents.
    pub fn hash(&self) -> Hash {
        let mut data = Vec::with_capacity(24 + self.txs.len() * Hash::BYTES);
        data.extend_from_slice(&self.source_shard.0.to_le_bytes());
        data.extend_from_slice(&self.target_shard.0.to_le_bytes());
        data.extend_from_slice(&self.source_height.0.to_le_bytes());
        for tx in &self.txs {
            data.extend_from_slice(tx.hash().as_bytes());
        }
        Hash::from_bytes(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tx(n: u8) -> Transaction {
        Transaction::new(
            ShardGroupId(1001),
            ShardGroupId(1002),
            Address::new([n; 20]),
            Address::new([n + 1; 20]),
            1,
            vec![n, n, n, n],
            format!("tx_{}", n),
        )
    }

    #[test]
    fn test_address_from_raw_bytes_pads_left() {
        let addr = Address::from_raw_bytes(b"abc");
        let mut expected = [0u8; 20];
        expected[17..].copy_from_slice(b"abc");
        assert_eq!(addr.as_bytes(), &expected);
    }

    #[test]
    fn test_address_from_raw_bytes_keeps_tail() {
        let raw: Vec<u8> = (0..32).collect();
        let addr = Address::from_raw_bytes(&raw);
        assert_eq!(addr.as_bytes()[..], raw[12..]);
    }

    #[test]
    fn test_transaction_hash_covers_payload() {
        let tx = make_tx(1);
        let mut other = tx.clone();
        assert_eq!(tx.hash(), other.hash());

        other.data[0] ^= 0xff;
        assert_ne!(tx.hash(), other.hash());
        assert!(tx.is_cross_shard());
    }

    #[test]
    fn test_duplicate_is_independent() {
        let original = OutboundChunk::new(
            ShardGroupId(1001),
            ShardGroupId(1003),
            BlockHeight(7),
            vec![make_tx(1), make_tx(2)],
        );

        let mut copy = original.duplicate();
        assert_eq!(copy, original);

        copy.txs[0].data.push(9);
        copy.txs.pop();
        assert_eq!(original.len(), 2);
        assert_eq!(original.txs[0].data, vec![1, 1, 1, 1]);
        assert_ne!(copy.hash(), original.hash());
    }
}
