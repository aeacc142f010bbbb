//! Test helpers for Shardline.
//!
//! Provides deterministic BLS committees (so aggregate keys and signatures
//! are reproducible across runs) and writers for the JSON files the key
//! store and mempool read at startup.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};
use shardline_types::{
    AggregatePublicKey, BlsKeyPair, BlsPublicKey, BlsScheme, BlsSignature, CommitteeBitmap,
    ShardGroupId, ValidatorId,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use shardline_types::test_utils::*;

/// A committee of deterministic BLS key pairs.
///
/// Member at position `i` has validator id `offset + i`.
#[derive(Debug, Clone)]
pub struct TestCommittee {
    offset: u64,
    keypairs: Vec<BlsKeyPair>,
}

impl TestCommittee {
    /// Generate `size` members whose ids start at `offset`, seeded by `seed`.
    pub fn generate(offset: u64, size: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let keypairs = (0..size)
            .map(|_| {
                let mut ikm = [0u8; 32];
                rng.fill_bytes(&mut ikm);
                BlsKeyPair::from_seed(&ikm).expect("32-byte seed is always accepted")
            })
            .collect();

        Self { offset, keypairs }
    }

    /// Number of members.
    pub fn size(&self) -> usize {
        self.keypairs.len()
    }

    /// Validator id of the member at `position`.
    pub fn validator_id(&self, position: usize) -> ValidatorId {
        ValidatorId::at_position(position, self.offset).expect("committee ids fit in u64")
    }

    /// Public key of the member at `position`.
    pub fn public_key(&self, position: usize) -> BlsPublicKey {
        self.keypairs[position].public_key()
    }

    /// Public key of the member at `position`, serialized with `scheme`.
    pub fn encoded_key(&self, position: usize, scheme: &BlsScheme) -> Vec<u8> {
        scheme.encode_public_key(&self.public_key(position))
    }

    /// `(validator id, public key)` for every member.
    pub fn members(&self) -> impl Iterator<Item = (ValidatorId, BlsPublicKey)> + '_ {
        (0..self.size()).map(|i| (self.validator_id(i), self.public_key(i)))
    }

    /// Bitmap selecting `positions` out of this committee.
    pub fn bitmap(&self, positions: &[usize]) -> CommitteeBitmap {
        CommitteeBitmap::from_positions(self.size(), positions.iter().copied())
    }

    /// Expected aggregate of the members at `positions`.
    pub fn aggregate_key(&self, positions: &[usize]) -> AggregatePublicKey {
        let keys: Vec<_> = positions.iter().map(|&p| self.public_key(p)).collect();
        AggregatePublicKey::from_keys(&keys)
    }

    /// Aggregated signature over `message` by the members at `positions`.
    pub fn aggregate_signature(&self, positions: &[usize], message: &[u8]) -> BlsSignature {
        let signatures: Vec<_> = positions
            .iter()
            .map(|&p| self.keypairs[p].sign(message))
            .collect();
        BlsSignature::aggregate(&signatures).expect("positions must not be empty")
    }

    /// Certificate bundle entries (decimal id -> hex key) for every member.
    pub fn bundle_entries(&self, scheme: &BlsScheme) -> BTreeMap<String, String> {
        self.members()
            .map(|(id, key)| (id.0.to_string(), scheme.encode_hex_public_key(&key)))
            .collect()
    }
}

/// Write `value` as JSON to `dir/file_name` and return the path.
pub fn write_json(dir: &Path, file_name: &str, value: &Value) -> PathBuf {
    let path = dir.join(file_name);
    let contents = serde_json::to_string_pretty(value).expect("JSON values always serialize");
    std::fs::write(&path, contents).expect("failed to write test file");
    path
}

/// Write a certificate bundle with the given entries to `dir/cert.json`.
pub fn write_certificate_bundle(dir: &Path, entries: &BTreeMap<String, String>) -> PathBuf {
    write_json(dir, "cert.json", &json!(entries))
}

/// One test transaction descriptor as found in workload fixture files.
pub fn fixture_entry(
    logical_hash: &str,
    from_shard: u64,
    from_address: &str,
    to_shard: u64,
    to_address: &str,
) -> Value {
    json!({
        "tx_hash_logic": logical_hash,
        "from_shard": from_shard,
        "from_address": from_address,
        "to_shard": to_shard,
        "to_address": to_address,
    })
}

/// Write a workload fixture for `shard` to `dir` using the standard file name.
pub fn write_transaction_fixture(
    dir: &Path,
    dataset: &str,
    shard: ShardGroupId,
    entries: Vec<Value>,
) -> PathBuf {
    let file_name = format!("{}_shard_{}_txs.json", dataset, shard.0);
    write_json(dir, &file_name, &Value::Array(entries))
}
