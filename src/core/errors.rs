//! Error types for the chain store and its components.

use thiserror::Error;

/// Errors raised while appending to or reading the chain store.
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("block {0} does not link to tip {1}")]
    BadLinkage(u64, u64),
    #[error("block hash mismatch at height {0}")]
    HashMismatch(u64),
    #[error("no block at height {0}")]
    NotFound(u64),
}

/// Errors raised while replaying a transaction against an account overlay.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxError {
    #[error("nonce mismatch: expected {expected}, got {got}")]
    BadNonce { expected: u64, got: u64 },
    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u64, need: u64 },
    #[error("invalid signature")]
    BadSignature,
}
