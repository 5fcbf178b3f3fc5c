//! bft-sync: a Byzantine-fault-tolerant block synchronization engine
//!
//! This crate brings a local chain store up to a target height by
//! downloading blocks from peers, validating their linkage, transactions,
//! and precommit votes against a delegate quorum, and committing them in
//! strict height order. See [`sync`] for the engine itself.
//!
//! # Example
//!
//! ```rust,no_run
//! use bft_sync::core::{Chain, GenesisConfig};
//! use bft_sync::network::Node;
//!
//! let chain = Chain::new(GenesisConfig::default());
//! let node = Node::new(chain, 7676);
//!
//! // `node.controller.start(target)` drives the sync engine to `target`;
//! // `node.run(shutdown_rx)` accepts peer connections and dispatches
//! // inbound blocks into it.
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod network;
pub mod storage;
pub mod sync;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use config::NodeConfig;
pub use core::{Chain, GenesisConfig};
pub use crypto::KeyPair;
pub use network::{Node, PeerManager};
pub use storage::Storage;
pub use sync::Controller;
