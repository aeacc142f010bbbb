//! Builders for transactions and chunks used across crate tests.

use crate::{Address, BlockHeight, OutboundChunk, ShardGroupId, Transaction};

/// A transaction from `from` to `to`, distinguished by `n`.
pub fn test_transaction(from: ShardGroupId, to: ShardGroupId, n: u64) -> Transaction {
    let seed = n.to_le_bytes();
    Transaction::new(
        from,
        to,
        Address::from_raw_bytes(&[&seed[..], b"from"].concat()),
        Address::from_raw_bytes(&[&seed[..], b"to"].concat()),
        n,
        seed[..4].to_vec(),
        format!("tx_{}_{}_{}", from.0, to.0, n),
    )
}

/// `count` local transactions on `shard`, numbered from `start`.
pub fn test_local_transactions(shard: ShardGroupId, start: u64, count: usize) -> Vec<Transaction> {
    (start..start + count as u64)
        .map(|n| test_transaction(shard, shard, n))
        .collect()
}

/// A chunk of `size` transactions from `source` to `target`.
pub fn test_chunk(source: ShardGroupId, target: ShardGroupId, size: usize) -> OutboundChunk {
    let txs = (0..size as u64)
        .map(|n| test_transaction(source, target, n))
        .collect();
    OutboundChunk::new(source, target, BlockHeight(1), txs)
}
