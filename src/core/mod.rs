//! Core chain components
//!
//! This module contains the fundamental building blocks the sync engine
//! validates and commits against:
//! - Blocks and account-transfer transactions
//! - The chain store (committed blocks, account state, delegate state)
//! - Staged overlays for speculative mutation
//! - The BFT validator set and quorum arithmetic
//! - The block reward schedule

pub mod block;
pub mod chain;
pub mod errors;
pub mod reward;
pub mod state;
pub mod transaction;
pub mod validator_set;

pub use block::{Block, Vote};
pub use chain::{Chain, GenesisConfig};
pub use errors::{ChainError, TxError};
pub use reward::block_reward;
pub use state::{AccountState, AccountStore, DelegateEntry, DelegateStore, Overlay};
pub use transaction::{execute, Tx, TxResult};
pub use validator_set::{Address, Validator, ValidatorSet};
