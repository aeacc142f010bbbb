//! Node configuration and wiring.
//!
//! This crate loads a node's TOML configuration and builds the pieces the
//! consensus engine works against: the committee key store and the
//! transaction pool.

mod config;
mod logging;
mod node;

pub use config::{ConfigError, NodeConfig};
pub use logging::init_tracing;
pub use node::NodeCore;
