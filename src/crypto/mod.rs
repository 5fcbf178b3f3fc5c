//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 hashing
//! - ECDSA key management (secp256k1) and address derivation
//! - Canonical BFT vote encoding

pub mod hash;
pub mod keys;
pub mod vote;

pub use hash::{double_sha256, sha256, sha256_hex};
pub use keys::{
    h160, public_key_from_hex, public_key_to_address, sign_message, verify, verify_signature,
    KeyError, KeyPair,
};
pub use vote::{encode_precommit, PHASE_PRECOMMIT, VALUE_APPROVE};
