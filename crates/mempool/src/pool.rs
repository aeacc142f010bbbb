//! Chunk-first transaction pool.

use crate::fixture::{read_fixture, FixtureError};
use crate::MempoolConfig;
use parking_lot::Mutex;
use shardline_types::{LocalNode, OutboundChunk, Transaction};
use std::collections::VecDeque;
use std::path::Path;
use tracing::{debug, info, warn};

/// Workload handed to a block proposer by [`TransactionPool::take_txs`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TakenBatch {
    /// Local transactions, in arrival order.
    pub transactions: Vec<Transaction>,
    /// Whole inbound chunks, in arrival order.
    pub chunks: Vec<OutboundChunk>,
}

impl TakenBatch {
    /// Total transactions in the batch, chunk contents included.
    pub fn tx_count(&self) -> usize {
        self.transactions.len() + self.chunks.iter().map(OutboundChunk::len).sum::<usize>()
    }

    /// Check if nothing was taken.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.chunks.is_empty()
    }
}

/// Pending local transactions and inbound cross-shard chunks.
///
/// Each queue has its own lock. Appends to one queue never wait on the
/// other, and [`take_txs`](Self::take_txs) never holds both locks at once.
#[derive(Debug, Default)]
pub struct TransactionPool {
    pending_txs: Mutex<VecDeque<Transaction>>,
    pending_inbound_chunks: Mutex<VecDeque<OutboundChunk>>,
}

impl TransactionPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the pool for `node`.
    ///
    /// Leaders of shards above the configured threshold start with the
    /// workload fixture for their shard loaded. A missing or malformed
    /// fixture is logged and leaves the pool empty.
    pub fn for_node(config: &MempoolConfig, node: &LocalNode) -> Self {
        let pool = Self::new();

        if !config.should_seed(node) {
            return pool;
        }

        if let Some(path) = config.fixture_path(node.shard) {
            if let Ok(count) = pool.load_test_txs(&path) {
                info!(
                    shard = %node.shard,
                    node = %node.validator_id,
                    count,
                    "Pre-seeded transaction pool"
                );
            }
        }

        pool
    }

    /// Queue a copy of an inbound chunk.
    ///
    /// The pool keeps its own deep copy, so the caller may keep using or
    /// mutating `chunk`.
    pub fn add_inbound_chunk(&self, chunk: &OutboundChunk) {
        let copy = chunk.duplicate();
        debug!(
            chunk = %copy.hash(),
            source = %copy.source_shard,
            height = copy.source_height.0,
            txs = copy.len(),
            "Queued inbound chunk"
        );
        self.pending_inbound_chunks.lock().push_back(copy);
    }

    /// Queue a local transaction.
    pub fn add_transaction(&self, tx: Transaction) {
        self.pending_txs.lock().push_back(tx);
    }

    /// Queue several local transactions, preserving their order.
    pub fn add_transactions(&self, txs: impl IntoIterator<Item = Transaction>) {
        self.pending_txs.lock().extend(txs);
    }

    /// Remove a workload of roughly `budget` transactions.
    ///
    /// Inbound chunks are taken first, whole, while any budget remains; the
    /// last chunk taken may overshoot it. Local transactions then fill what
    /// is left, up to exactly the remaining budget.
    pub fn take_txs(&self, budget: usize) -> TakenBatch {
        let mut remaining = budget;
        let mut batch = TakenBatch::default();

        {
            let mut chunks = self.pending_inbound_chunks.lock();
            while remaining > 0 {
                let Some(chunk) = chunks.pop_front() else {
                    break;
                };
                remaining = remaining.saturating_sub(chunk.len());
                batch.chunks.push(chunk);
            }
        }

        if remaining > 0 {
            let mut txs = self.pending_txs.lock();
            let take = remaining.min(txs.len());
            batch.transactions.extend(txs.drain(..take));
        }

        debug!(
            budget,
            chunks = batch.chunks.len(),
            local = batch.transactions.len(),
            "Took transactions from pool"
        );

        batch
    }

    /// Append every transaction described by the fixture at `path`.
    ///
    /// The file is decoded in full before anything is queued; on failure
    /// the pool is unchanged. Returns the number of transactions added.
    pub fn load_test_txs(&self, path: &Path) -> Result<usize, FixtureError> {
        let descriptors = read_fixture(path).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to load test transactions");
        })?;

        let mut rng = rand::thread_rng();
        let txs: Vec<_> = descriptors
            .into_iter()
            .map(|d| d.into_transaction(&mut rng))
            .collect();
        let count = txs.len();

        self.add_transactions(txs);
        Ok(count)
    }

    /// Number of pending local transactions.
    pub fn pending_tx_count(&self) -> usize {
        self.pending_txs.lock().len()
    }

    /// Number of pending inbound chunks.
    pub fn pending_chunk_count(&self) -> usize {
        self.pending_inbound_chunks.lock().len()
    }

    /// Number of transactions carried by pending inbound chunks.
    pub fn pending_chunk_tx_count(&self) -> usize {
        self.pending_inbound_chunks
            .lock()
            .iter()
            .map(OutboundChunk::len)
            .sum()
    }

    /// Check if both queues are empty.
    pub fn is_empty(&self) -> bool {
        self.pending_chunk_count() == 0 && self.pending_tx_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardline_test_helpers::{
        fixture_entry, test_chunk, test_local_transactions, write_transaction_fixture,
    };
    use shardline_types::{ShardGroupId, ValidatorId};
    use tracing_test::traced_test;

    const LOCAL: ShardGroupId = ShardGroupId(1001);

    fn make_pool_with_locals(count: usize) -> TransactionPool {
        let pool = TransactionPool::new();
        pool.add_transactions(test_local_transactions(LOCAL, 0, count));
        pool
    }

    #[test]
    fn test_chunks_taken_whole_before_locals() {
        let pool = make_pool_with_locals(10);
        pool.add_inbound_chunk(&test_chunk(ShardGroupId(1002), LOCAL, 3));
        pool.add_inbound_chunk(&test_chunk(ShardGroupId(1003), LOCAL, 5));

        let batch = pool.take_txs(4);

        let sizes: Vec<_> = batch.chunks.iter().map(OutboundChunk::len).collect();
        assert_eq!(sizes, vec![3, 5]);
        assert!(batch.transactions.is_empty());
        assert_eq!(batch.tx_count(), 8);
        assert_eq!(pool.pending_chunk_count(), 0);
        assert_eq!(pool.pending_tx_count(), 10);
    }

    #[test]
    fn test_locals_fill_remaining_budget() {
        let pool = make_pool_with_locals(15);

        let batch = pool.take_txs(10);

        assert!(batch.chunks.is_empty());
        assert_eq!(batch.transactions, test_local_transactions(LOCAL, 0, 10));
        assert_eq!(pool.pending_tx_count(), 5);

        let rest = pool.take_txs(10);
        assert_eq!(rest.transactions, test_local_transactions(LOCAL, 10, 5));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_chunk_then_locals_split_at_budget() {
        let pool = make_pool_with_locals(10);
        pool.add_inbound_chunk(&test_chunk(ShardGroupId(1002), LOCAL, 3));

        let batch = pool.take_txs(7);

        assert_eq!(batch.chunks.len(), 1);
        assert_eq!(batch.transactions, test_local_transactions(LOCAL, 0, 4));
        assert_eq!(pool.pending_tx_count(), 6);
    }

    #[test]
    fn test_chunk_exactly_filling_budget_stops_extraction() {
        let pool = make_pool_with_locals(3);
        pool.add_inbound_chunk(&test_chunk(ShardGroupId(1002), LOCAL, 4));
        pool.add_inbound_chunk(&test_chunk(ShardGroupId(1003), LOCAL, 2));

        let batch = pool.take_txs(4);

        assert_eq!(batch.chunks.len(), 1);
        assert!(batch.transactions.is_empty());
        assert_eq!(pool.pending_chunk_count(), 1);
        assert_eq!(pool.pending_chunk_tx_count(), 2);
    }

    #[test]
    fn test_zero_budget_takes_nothing() {
        let pool = make_pool_with_locals(2);
        pool.add_inbound_chunk(&test_chunk(ShardGroupId(1002), LOCAL, 1));

        assert!(pool.take_txs(0).is_empty());
        assert_eq!(pool.pending_chunk_count(), 1);
        assert_eq!(pool.pending_tx_count(), 2);
    }

    #[test]
    fn test_empty_chunk_consumes_no_budget() {
        let pool = make_pool_with_locals(2);
        pool.add_inbound_chunk(&test_chunk(ShardGroupId(1002), LOCAL, 0));

        let batch = pool.take_txs(2);

        assert_eq!(batch.chunks.len(), 1);
        assert_eq!(batch.transactions.len(), 2);
    }

    #[test]
    fn test_pool_keeps_its_own_chunk_copy() {
        let pool = TransactionPool::new();
        let mut chunk = test_chunk(ShardGroupId(1002), LOCAL, 3);
        let original = chunk.clone();

        pool.add_inbound_chunk(&chunk);
        chunk.txs[0].data.clear();
        chunk.txs[1].value = 999;
        chunk.txs.pop();

        let batch = pool.take_txs(10);
        assert_eq!(batch.chunks, vec![original]);
    }

    #[traced_test]
    #[test]
    fn test_inbound_chunk_logged_by_content_hash() {
        let pool = TransactionPool::new();
        let chunk = test_chunk(ShardGroupId(1003), LOCAL, 2);

        pool.add_inbound_chunk(&chunk);

        assert!(logs_contain(&format!("chunk={}", chunk.hash())));
        assert!(logs_contain("Queued inbound chunk"));
    }

    #[test]
    fn test_load_test_txs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_transaction_fixture(
            dir.path(),
            "monoxide",
            LOCAL,
            vec![
                fixture_entry("h1", 1001, "alice", 1001, "bob"),
                fixture_entry("h2", 1001, "carol", 1003, "dave"),
            ],
        );

        let pool = TransactionPool::new();
        assert_eq!(pool.load_test_txs(&path).unwrap(), 2);

        let batch = pool.take_txs(10);
        assert_eq!(batch.transactions.len(), 2);
        assert_eq!(batch.transactions[0].logical_hash, "h1");
        assert!(!batch.transactions[0].is_cross_shard());
        assert_eq!(batch.transactions[1].to_shard, ShardGroupId(1003));
        assert!(batch
            .transactions
            .iter()
            .all(|tx| tx.value == 0 && tx.data.len() == 4));
    }

    #[traced_test]
    #[test]
    fn test_load_test_txs_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = fixture_entry("h2", 1001, "carol", 1003, "dave");
        bad["to_shard"] = serde_json::json!("not a shard");
        let path = write_transaction_fixture(
            dir.path(),
            "monoxide",
            LOCAL,
            vec![fixture_entry("h1", 1001, "alice", 1001, "bob"), bad],
        );

        let pool = make_pool_with_locals(1);
        let result = pool.load_test_txs(&path);

        assert!(matches!(result, Err(FixtureError::Decode { .. })));
        assert_eq!(pool.pending_tx_count(), 1);
        assert!(logs_contain("Failed to load test transactions"));
    }

    #[test]
    fn test_load_test_txs_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let pool = TransactionPool::new();

        let result = pool.load_test_txs(&dir.path().join("none.json"));
        assert!(matches!(result, Err(FixtureError::Io { .. })));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_for_node_seeds_only_leaders_above_threshold() {
        let dir = tempfile::tempdir().unwrap();
        for shard in [1, 1001] {
            write_transaction_fixture(
                dir.path(),
                "monoxide",
                ShardGroupId(shard),
                vec![fixture_entry("h", shard, "a", shard, "b")],
            );
        }
        let config = MempoolConfig::new().with_fixture_dir(dir.path());

        let leader = LocalNode::new(LOCAL, ValidatorId(0)).with_leader(true);
        let follower = LocalNode::new(LOCAL, ValidatorId(1));
        let root_leader = LocalNode::new(ShardGroupId(1), ValidatorId(0)).with_leader(true);

        assert_eq!(TransactionPool::for_node(&config, &leader).pending_tx_count(), 1);
        assert!(TransactionPool::for_node(&config, &follower).is_empty());
        assert!(TransactionPool::for_node(&config, &root_leader).is_empty());
    }

    #[traced_test]
    #[test]
    fn test_for_node_with_missing_fixture_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = MempoolConfig::new().with_fixture_dir(dir.path());
        let leader = LocalNode::new(ShardGroupId(1004), ValidatorId(0)).with_leader(true);

        let pool = TransactionPool::for_node(&config, &leader);

        assert!(pool.is_empty());
        assert!(logs_contain("Failed to load test transactions"));
    }
}
