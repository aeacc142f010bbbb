//! Committee public key registries.
//!
//! Quorum certificates carry an aggregated BLS signature plus a bitmap of the
//! committee positions that signed. To check one, the consensus engine needs
//! the point sum of exactly those members' public keys. This crate keeps
//! those keys, one registry per shard, and computes the sums.
//!
//! # Components
//!
//! - [`ShardKeyRegistry`] - validator id to public key map for one shard
//! - [`KeyRegistryStore`] - routes to per-shard registries, creating them on writes
//! - [`CertificateLoader`] - reads the trusted committee bundle used by resets
//! - [`KeyStoreConfig`] - bundle location and key encoding
//!
//! # Locking
//!
//! ```text
//! KeyRegistryStore
//!   routing: Mutex<HashMap<ShardGroupId, Arc<ShardKeyRegistry>>>   (lookup/insert only)
//!       │
//!       ├── ShardKeyRegistry(shard 0)     keys: Mutex<HashMap<..>>
//!       ├── ShardKeyRegistry(shard 1)     keys: Mutex<HashMap<..>>
//!       └── ...
//! ```
//!
//! The routing lock is released before any registry is touched, so work on
//! one shard never waits on another shard's registry.
//!
//! Aggregation is best effort: members without a registered key are skipped
//! and logged. Deciding whether the result carries enough voting power is
//! left to the caller.

mod certificate;
mod config;
mod registry;
mod store;

pub use certificate::{CertificateBundle, CertificateError, CertificateLoader};
pub use config::KeyStoreConfig;
pub use registry::ShardKeyRegistry;
pub use store::{KeyRegistryStore, ResetSummary};
