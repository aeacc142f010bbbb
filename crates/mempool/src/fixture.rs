//! Workload fixture files.
//!
//! A fixture is a JSON array of transaction descriptors:
//!
//! ```json
//! [
//!   {
//!     "tx_hash_logic": "0x5e1f..",
//!     "from_shard": 1001,
//!     "from_address": "0x3a2b..",
//!     "to_shard": 1003,
//!     "to_address": "0x9c41.."
//!   }
//! ]
//! ```

use rand::RngCore;
use serde::{Deserialize, Serialize};
use shardline_types::{Address, ShardGroupId, Transaction};
use std::path::{Path, PathBuf};

/// Payload size given to every fixture transaction.
pub(crate) const FIXTURE_PAYLOAD_LEN: usize = 4;

/// One transaction descriptor from a fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureTransaction {
    /// Workload-assigned identifier.
    #[serde(rename = "tx_hash_logic")]
    pub logical_hash: String,
    /// Originating shard.
    pub from_shard: u64,
    /// Sender, as written in the dataset.
    pub from_address: String,
    /// Destination shard.
    pub to_shard: u64,
    /// Receiver, as written in the dataset.
    pub to_address: String,
}

impl FixtureTransaction {
    /// Build the pool transaction for this descriptor.
    ///
    /// Addresses are taken from the raw bytes of the dataset strings. The
    /// value is zero and the payload is freshly drawn from `rng`.
    pub fn into_transaction(self, rng: &mut impl RngCore) -> Transaction {
        let mut data = vec![0u8; FIXTURE_PAYLOAD_LEN];
        rng.fill_bytes(&mut data);

        Transaction::new(
            ShardGroupId(self.from_shard),
            ShardGroupId(self.to_shard),
            Address::from_raw_bytes(self.from_address.as_bytes()),
            Address::from_raw_bytes(self.to_address.as_bytes()),
            0,
            data,
            self.logical_hash,
        )
    }
}

/// Errors raised while reading a workload fixture.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// The fixture file could not be read.
    #[error("failed to read fixture {path}: {source}")]
    Io {
        /// Fixture location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The fixture file is not a JSON array of descriptors.
    #[error("failed to decode fixture {path}: {source}")]
    Decode {
        /// Fixture location.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}

/// Read every descriptor in the fixture at `path`.
///
/// Decoding is all-or-nothing: one bad entry fails the whole file.
pub(crate) fn read_fixture(path: &Path) -> Result<Vec<FixtureTransaction>, FixtureError> {
    let contents = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| FixtureError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
