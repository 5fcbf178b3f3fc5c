//! Network message types for P2P communication
//!
//! Defines the wire messages the sync engine's Inbox and Downloader
//! exchange with peers, plus transport-level housekeeping messages.

use crate::core::Block;
use serde::{Deserialize, Serialize};

/// Protocol version
pub const PROTOCOL_VERSION: u32 = 1;

/// Magic bytes for message framing
pub const MAGIC: [u8; 4] = [0x42, 0x46, 0x54, 0x53]; // "BFTS"

/// Network message types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    /// Initial handshake when connecting
    Handshake(Handshake),

    /// Request the block at a given height
    GetBlock(u64),

    /// Response to `GetBlock`; `None` if the peer doesn't have it
    Block(Option<Block>),

    /// A header-only announcement, reserved for a future header-first sync
    /// mode. The Inbox accepts it but currently takes no action.
    BlockHeader(Block),

    /// Keep-alive ping
    Ping(u64),

    /// Keep-alive pong response
    Pong(u64),
}

/// Handshake message for initial connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handshake {
    pub version: u32,
    pub height: u64,
    pub best_hash: [u8; 32],
    pub listen_port: u16,
    pub user_agent: String,
}

impl Handshake {
    pub fn new(height: u64, best_hash: [u8; 32], listen_port: u16) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            height,
            best_hash,
            listen_port,
            user_agent: format!("bft-sync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Message {
    /// Serialize message to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize message from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    /// Get message type name for logging
    pub fn type_name(&self) -> &'static str {
        match self {
            Message::Handshake(_) => "Handshake",
            Message::GetBlock(_) => "GetBlock",
            Message::Block(_) => "Block",
            Message::BlockHeader(_) => "BlockHeader",
            Message::Ping(_) => "Ping",
            Message::Pong(_) => "Pong",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialization() {
        let msg = Message::GetBlock(42);
        let bytes = msg.to_bytes().unwrap();
        let decoded = Message::from_bytes(&bytes).unwrap();

        if let Message::GetBlock(n) = decoded {
            assert_eq!(n, 42);
        } else {
            panic!("Wrong message type");
        }
    }

    #[test]
    fn test_handshake() {
        let handshake = Handshake::new(100, [0u8; 32], 8333);
        assert_eq!(handshake.version, PROTOCOL_VERSION);
        assert_eq!(handshake.height, 100);
    }
}
