//! Account and delegate state, with a staged-overlay mutation pattern.
//!
//! Both stores are mutated only through an [`Overlay`]: `track()` stages a
//! private delta map that the caller mutates freely, and `commit()` folds
//! that delta back into the parent store. An overlay that is simply dropped
//! (the validation-failure path) never touches the parent, because it holds
//! no reference back into it.

use crate::core::validator_set::{Address, Validator, ValidatorSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Balance and replay-protection nonce for one account.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountState {
    pub balance: u64,
    pub nonce: u64,
}

/// All account balances, keyed by address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountStore {
    accounts: HashMap<Address, AccountState>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
        }
    }

    pub fn get(&self, address: &Address) -> AccountState {
        self.accounts.get(address).copied().unwrap_or_default()
    }

    pub fn set(&mut self, address: Address, state: AccountState) {
        self.accounts.insert(address, state);
    }

    /// Stage a private, independently-mutable overlay over the current state.
    pub fn track(&self) -> Overlay<Address, AccountState> {
        Overlay::new(self.accounts.clone())
    }
}

/// One delegate's roster entry, duplicated here so the delegate store can be
/// overlaid the same way the account store is, independent of whatever form
/// [`ValidatorSet`] takes for consumption by the sync engine.
pub type DelegateEntry = Validator;

/// All registered delegates, keyed by address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DelegateStore {
    delegates: HashMap<Address, DelegateEntry>,
}

impl DelegateStore {
    pub fn new() -> Self {
        Self {
            delegates: HashMap::new(),
        }
    }

    pub fn get(&self, address: &Address) -> Option<&DelegateEntry> {
        self.delegates.get(address)
    }

    pub fn set(&mut self, address: Address, entry: DelegateEntry) {
        self.delegates.insert(address, entry);
    }

    pub fn remove(&mut self, address: &Address) {
        self.delegates.remove(address);
    }

    /// Snapshot the current roster as a [`ValidatorSet`] for quorum checks.
    pub fn to_validator_set(&self) -> ValidatorSet {
        let mut set = ValidatorSet::new();
        for (addr, v) in self.delegates.iter() {
            set.insert(*addr, v.clone());
        }
        set
    }

    /// Stage a private, independently-mutable overlay over the current roster.
    pub fn track(&self) -> Overlay<Address, DelegateEntry> {
        Overlay::new(self.delegates.clone())
    }
}

/// A staged set of mutations over a snapshot of a store's key/value map.
///
/// `base` is a clone taken at `track()` time; reads fall through to it when
/// a key has not been written in this overlay. `commit` is the only path
/// back into the parent store; dropping the overlay discards everything.
pub struct Overlay<K, V> {
    base: HashMap<K, V>,
}

impl<K, V> Overlay<K, V>
where
    K: std::hash::Hash + Eq + Clone,
    V: Clone,
{
    fn new(base: HashMap<K, V>) -> Self {
        Self { base }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.base.get(key)
    }

    pub fn set(&mut self, key: K, value: V) {
        self.base.insert(key, value);
    }

    pub fn remove(&mut self, key: &K) {
        self.base.remove(key);
    }
}

impl Overlay<Address, AccountState> {
    /// Fold the staged account deltas back into the parent store.
    pub fn commit(self, store: &mut AccountStore) {
        store.accounts = self.base;
    }
}

impl Overlay<Address, DelegateEntry> {
    /// Snapshot the overlay's current roster as a [`ValidatorSet`], reflecting
    /// any delegate-registration transactions already staged into it. This is
    /// the roster a block's quorum is checked against (`crate::sync::validator`).
    pub fn to_validator_set(&self) -> ValidatorSet {
        let mut set = ValidatorSet::new();
        for (addr, v) in self.base.iter() {
            set.insert(*addr, v.clone());
        }
        set
    }

    /// Fold the staged delegate deltas back into the parent store.
    pub fn commit(self, store: &mut DelegateStore) {
        store.delegates = self.base;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_mutation_invisible_until_commit() {
        let mut store = AccountStore::new();
        let addr = [1u8; 20];
        store.set(
            addr,
            AccountState {
                balance: 100,
                nonce: 0,
            },
        );

        let mut overlay = store.track();
        overlay.set(
            addr,
            AccountState {
                balance: 50,
                nonce: 1,
            },
        );

        // Parent store is untouched while the overlay is merely held.
        assert_eq!(store.get(&addr).balance, 100);

        overlay.commit(&mut store);
        assert_eq!(store.get(&addr).balance, 50);
    }

    #[test]
    fn dropped_overlay_leaves_store_unchanged() {
        let mut store = AccountStore::new();
        let addr = [2u8; 20];
        store.set(
            addr,
            AccountState {
                balance: 10,
                nonce: 0,
            },
        );

        {
            let mut overlay = store.track();
            overlay.set(
                addr,
                AccountState {
                    balance: 999,
                    nonce: 9,
                },
            );
            // overlay dropped here without commit()
        }

        assert_eq!(store.get(&addr).balance, 10);
    }
}
