//! P2P networking
//!
//! Provides peer-to-peer transport for the sync engine: TCP connections,
//! length-prefixed message framing, and peer bookkeeping. The sync engine
//! itself lives in `crate::sync` and only ever sees this module's `Message`
//! and `PeerManager` types.

pub mod message;
pub mod node;
pub mod peer;
pub mod server;

pub use message::{Handshake, Message, MAGIC, PROTOCOL_VERSION};
pub use node::{Node, NodeStatus};
pub use peer::{PeerError, PeerHandle, PeerInfo, PeerManager, PeerState, MAX_PEERS};
pub use server::{connect_to_peer, Server};
