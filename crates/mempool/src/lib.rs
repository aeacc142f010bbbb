//! Transaction pool for block proposals.
//!
//! The pool holds two queues: inbound chunks of cross-shard transactions
//! delivered by other shards, and transactions originating on this shard.
//! When a proposer asks for a workload, inbound chunks are served first and
//! always whole; local transactions fill whatever budget is left.
//!
//! Leaders of processing shards can pre-seed the local queue from a JSON
//! workload fixture at startup (see [`MempoolConfig`]).

mod config;
mod fixture;
mod pool;

pub use config::MempoolConfig;
pub use fixture::{FixtureError, FixtureTransaction};
pub use pool::{TakenBatch, TransactionPool};
