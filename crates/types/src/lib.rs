//! Core types for Shardline consensus support.
//!
//! - Identifiers: [`ValidatorId`], [`ShardGroupId`], [`BlockHeight`]
//! - BLS12-381 keys and aggregation: [`BlsScheme`], [`BlsPublicKey`], [`AggregatePublicKey`]
//! - Committee bitmaps: [`CommitteeBitmap`]
//! - Shard topology: [`ShardTopology`], [`StaticShardTopology`], [`LocalNode`]
//! - Workload: [`Transaction`], [`OutboundChunk`], [`Address`]

mod bitmap;
mod crypto;
mod hash;
mod identifiers;
mod node;
mod topology;
mod transaction;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use bitmap::{BitmapError, CommitteeBitmap};
pub use crypto::{
    AggregateError, AggregatePublicKey, BlsKeyPair, BlsPublicKey, BlsScheme, BlsSignature,
    KeyEncoding, KeyError, BLS_DST, PUBLIC_KEY_COMPRESSED_LEN, PUBLIC_KEY_UNCOMPRESSED_LEN,
};
pub use hash::Hash;
pub use identifiers::{BlockHeight, ShardGroupId, ValidatorId};
pub use node::LocalNode;
pub use topology::{RootShardGroup, ShardTopology, StaticShardTopology};
pub use transaction::{Address, OutboundChunk, Transaction};
