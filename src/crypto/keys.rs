//! ECDSA key management
//!
//! Key pair generation, signing, and verification using the secp256k1
//! elliptic curve, plus address derivation from a public key.

use rand::rngs::OsRng;
use ripemd::Ripemd160;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::hash::sha256;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key = SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the public key as a hex string (compressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// Derive this key pair's address: `h160(pubkey)`.
    pub fn address(&self) -> [u8; 20] {
        h160(&self.public_key.serialize())
    }

    /// Sign a message hash with the private key
    pub fn sign(&self, message_hash: &[u8]) -> Result<Vec<u8>, KeyError> {
        sign_message(&self.secret_key, message_hash)
    }

    /// Verify a signature against this key pair's public key
    pub fn verify(&self, message_hash: &[u8], signature: &[u8]) -> bool {
        verify(&self.public_key.serialize(), message_hash, signature)
    }
}

/// Derive an address from a public key: RIPEMD-160(SHA-256(pubkey)).
///
/// This is the address hash consumed by the sync engine's vote check
/// (`crate::sync::validator`) to map a signature's public key to a
/// validator-set entry.
pub fn h160(public_key: &[u8]) -> [u8; 20] {
    let sha256_hash = sha256(public_key);
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256_hash);
    ripemd.finalize().into()
}

/// Verify a raw signature against a raw (serialized, compressed) public key.
/// Returns `false` rather than an error on any malformed input, since the
/// sync validator treats a bad signature the same as a mismatched one.
pub fn verify(public_key_bytes: &[u8], message_hash: &[u8], signature: &[u8]) -> bool {
    let Ok(public_key) = PublicKey::from_slice(public_key_bytes) else {
        return false;
    };
    verify_signature(&public_key, message_hash, signature).unwrap_or(false)
}

/// Base58Check-encode a public key into a human-displayable legacy address.
/// Not used by the sync engine itself; kept for CLI/wallet display purposes.
pub fn public_key_to_address(public_key: &PublicKey) -> String {
    use sha2::{Digest, Sha256};

    let ripemd_hash = h160(&public_key.serialize());

    let mut address_bytes = vec![0x00];
    address_bytes.extend_from_slice(&ripemd_hash);

    let checksum = {
        let mut hasher = Sha256::new();
        hasher.update(&address_bytes);
        let first_hash = hasher.finalize();
        let mut hasher = Sha256::new();
        hasher.update(first_hash);
        hasher.finalize()
    };
    address_bytes.extend_from_slice(&checksum[..4]);

    bs58::encode(address_bytes).into_string()
}

/// Parse a public key from hex string
pub fn public_key_from_hex(hex_key: &str) -> Result<PublicKey, KeyError> {
    let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPublicKey)?;
    PublicKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPublicKey)
}

/// Sign a message hash with a secret key
pub fn sign_message(secret_key: &SecretKey, message_hash: &[u8]) -> Result<Vec<u8>, KeyError> {
    let secp = Secp256k1::new();

    let hash = if message_hash.len() == 32 {
        message_hash.to_vec()
    } else {
        sha256(message_hash).to_vec()
    };

    let message = Message::from_digest_slice(&hash)?;
    let signature = secp.sign_ecdsa(&message, secret_key);
    Ok(signature.serialize_compact().to_vec())
}

/// Verify a signature against a public key
pub fn verify_signature(
    public_key: &PublicKey,
    message_hash: &[u8],
    signature: &[u8],
) -> Result<bool, KeyError> {
    let secp = Secp256k1::new();

    let hash = if message_hash.len() == 32 {
        message_hash.to_vec()
    } else {
        sha256(message_hash).to_vec()
    };

    let message = Message::from_digest_slice(&hash)?;
    let sig = secp256k1::ecdsa::Signature::from_compact(signature)
        .map_err(|_| KeyError::InvalidSignature)?;

    match secp.verify_ecdsa(&message, &sig, public_key) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_pair_generation() {
        let kp = KeyPair::generate();
        assert!(!kp.private_key_hex().is_empty());
        assert!(!kp.public_key_hex().is_empty());
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = KeyPair::generate();
        let message_hash = sha256(b"hello blockchain");

        let signature = kp.sign(&message_hash).unwrap();
        assert!(kp.verify(&message_hash, &signature));
    }

    #[test]
    fn test_key_pair_from_hex() {
        let kp1 = KeyPair::generate();
        let private_hex = kp1.private_key_hex();

        let kp2 = KeyPair::from_private_key_hex(&private_hex).unwrap();
        assert_eq!(kp1.public_key_hex(), kp2.public_key_hex());
        assert_eq!(kp1.address(), kp2.address());
    }

    #[test]
    fn h160_matches_keypair_address() {
        let kp = KeyPair::generate();
        assert_eq!(h160(&kp.public_key.serialize()), kp.address());
    }

    #[test]
    fn verify_rejects_wrong_signature() {
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::generate();
        let message_hash = sha256(b"hello blockchain");

        let signature = kp1.sign(&message_hash).unwrap();
        assert!(!verify(&kp2.public_key.serialize(), &message_hash, &signature));
    }
}
