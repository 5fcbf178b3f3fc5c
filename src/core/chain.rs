//! The chain store: committed blocks plus account and delegate state.

use crate::core::block::Block;
use crate::core::errors::ChainError;
use crate::core::state::{AccountStore, DelegateStore};
use crate::core::validator_set::{Address, Validator};
use serde::{Deserialize, Serialize};

/// Genesis account balances and delegate roster, supplied at chain creation.
#[derive(Debug, Clone, Default)]
pub struct GenesisConfig {
    pub coinbase: Address,
    pub balances: Vec<(Address, u64)>,
    pub delegates: Vec<(Address, Validator)>,
}

/// The chain's single source of truth: an append-only vector of blocks
/// alongside the account and delegate state they produced.
///
/// `append` does not validate anything; the sync engine's validator
/// (`crate::sync::validator`) is responsible for only calling it once a
/// block has passed every check, with its overlays already committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    blocks: Vec<Block>,
    accounts: AccountStore,
    delegates: DelegateStore,
}

impl Chain {
    /// Start a fresh chain from a genesis configuration.
    pub fn new(genesis: GenesisConfig) -> Self {
        let genesis_block = Block::genesis(genesis.coinbase);

        let mut accounts = AccountStore::new();
        for (addr, balance) in genesis.balances {
            accounts.set(
                addr,
                crate::core::state::AccountState { balance, nonce: 0 },
            );
        }

        let mut delegates = DelegateStore::new();
        for (addr, validator) in genesis.delegates {
            delegates.set(addr, validator);
        }

        Self {
            blocks: vec![genesis_block],
            accounts,
            delegates,
        }
    }

    pub fn latest_number(&self) -> u64 {
        self.blocks.len() as u64 - 1
    }

    pub fn latest_block(&self) -> &Block {
        self.blocks.last().expect("chain always has a genesis block")
    }

    pub fn get_block(&self, number: u64) -> Option<&Block> {
        self.blocks.get(number as usize)
    }

    pub fn account_state(&self) -> &AccountStore {
        &self.accounts
    }

    pub fn account_state_mut(&mut self) -> &mut AccountStore {
        &mut self.accounts
    }

    pub fn delegate_state(&self) -> &DelegateStore {
        &self.delegates
    }

    pub fn delegate_state_mut(&mut self) -> &mut DelegateStore {
        &mut self.delegates
    }

    /// Append a block that has already been validated elsewhere.
    pub fn append(&mut self, block: Block) -> Result<(), ChainError> {
        let tip = self.latest_block();
        if block.number != tip.number + 1 || block.prev_hash != tip.hash {
            return Err(ChainError::BadLinkage(block.number, tip.number));
        }
        self.blocks.push(block);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_advances_tip_by_one() {
        let mut chain = Chain::new(GenesisConfig::default());
        let tip = chain.latest_block().clone();

        let mut next = Block::genesis([9u8; 20]);
        next.number = tip.number + 1;
        next.prev_hash = tip.hash;
        next.hash = next.compute_hash();

        chain.append(next).unwrap();
        assert_eq!(chain.latest_number(), 1);
    }

    #[test]
    fn append_rejects_bad_linkage() {
        let mut chain = Chain::new(GenesisConfig::default());
        let mut bogus = Block::genesis([9u8; 20]);
        bogus.number = 5;
        bogus.hash = bogus.compute_hash();

        assert!(chain.append(bogus).is_err());
        assert_eq!(chain.latest_number(), 0);
    }
}
