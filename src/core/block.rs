//! Blocks: the unit the sync engine downloads, validates, and commits.

use crate::core::transaction::Tx;
use crate::core::validator_set::Address;
use crate::crypto::hash::sha256;
use serde::{Deserialize, Serialize};

/// A single BFT precommit signature over a block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
}

/// A committed unit of the chain.
///
/// `hash` is carried on the wire rather than recomputed at every read, but
/// [`Block::compute_hash`] is the authority a validator checks it against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub number: u64,
    pub prev_hash: [u8; 32],
    pub hash: [u8; 32],
    pub coinbase: Address,
    pub view: u32,
    pub transactions: Vec<Tx>,
    pub votes: Vec<Vote>,
}

impl Block {
    /// Recompute the content hash over everything except `hash` and `votes`
    /// themselves (votes are signed over the hash, so including them would
    /// be circular).
    pub fn compute_hash(&self) -> [u8; 32] {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.number.to_be_bytes());
        buf.extend_from_slice(&self.prev_hash);
        buf.extend_from_slice(&self.coinbase);
        buf.extend_from_slice(&self.view.to_be_bytes());
        for tx in &self.transactions {
            buf.extend_from_slice(&tx.id());
        }
        sha256(&buf)
    }

    /// Build and set `genesis`, the synthetic height-0 block every chain
    /// starts from. It has no predecessor and no votes.
    pub fn genesis(coinbase: Address) -> Self {
        let mut block = Block {
            number: 0,
            prev_hash: [0u8; 32],
            hash: [0u8; 32],
            coinbase,
            view: 0,
            transactions: Vec::new(),
            votes: Vec::new(),
        };
        block.hash = block.compute_hash();
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_hash_is_self_consistent() {
        let genesis = Block::genesis([0u8; 20]);
        assert_eq!(genesis.hash, genesis.compute_hash());
        assert_eq!(genesis.number, 0);
    }

    #[test]
    fn differing_content_yields_differing_hash() {
        let a = Block::genesis([1u8; 20]);
        let b = Block::genesis([2u8; 20]);
        assert_ne!(a.compute_hash(), b.compute_hash());
    }
}
