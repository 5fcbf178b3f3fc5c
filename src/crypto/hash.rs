//! Cryptographic hashing utilities
//!
//! Provides the SHA-256 primitive used for block hashes, transaction ids,
//! and address derivation.

use sha2::{Digest, Sha256};

/// Computes the SHA-256 hash of the input data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes double SHA-256 (SHA-256 of SHA-256), used for the address
/// checksum in [`crate::crypto::keys::public_key_to_address`].
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Computes the SHA-256 hash and returns it as a hex string.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let data = b"hello world";
        let hash = sha256(data);
        assert_eq!(hash.len(), 32);
        assert_eq!(
            sha256_hex(data),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde"
        );
    }

    #[test]
    fn test_double_sha256() {
        let hash = double_sha256(b"hello world");
        assert_eq!(hash.len(), 32);
    }
}
