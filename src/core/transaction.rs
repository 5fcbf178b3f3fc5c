//! Account-transfer transactions and their pure executor.

use crate::core::errors::TxError;
use crate::core::state::{AccountState, DelegateEntry, Overlay};
use crate::core::validator_set::Address;
use crate::crypto::hash::sha256;
use serde::{Deserialize, Serialize};

/// A signed transfer from `sender` to `recipient`.
///
/// A delegate-registration transaction is distinguished by `register_delegate`
/// carrying the delegate's public key; it both transfers `amount` (typically
/// a bond) and writes an entry into the delegate overlay in the same pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tx {
    pub sender: Address,
    pub recipient: Address,
    pub amount: u64,
    pub nonce: u64,
    pub signature: Vec<u8>,
    pub register_delegate: Option<Vec<u8>>,
}

impl Tx {
    /// Canonical bytes a signature is computed over: sender, recipient,
    /// amount and nonce in fixed order. The signature itself is excluded.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(20 + 20 + 8 + 8);
        buf.extend_from_slice(&self.sender);
        buf.extend_from_slice(&self.recipient);
        buf.extend_from_slice(&self.amount.to_be_bytes());
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf
    }

    /// Deterministic transaction id, independent of the signature bytes so
    /// that two broadcasts of the same logical transaction share an id.
    pub fn id(&self) -> [u8; 32] {
        sha256(&self.signing_bytes())
    }
}

/// Outcome of replaying a single transaction against an overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxResult {
    pub tx_id: [u8; 32],
    pub is_success: bool,
    pub error: Option<TxError>,
}

/// Replay `txs` against the given account and delegate overlays in order.
///
/// Execution never short-circuits: every transaction gets a [`TxResult`],
/// even after an earlier one failed, so a proposer (`is_proposing = true`)
/// can use the same function to decide which transactions to include in a
/// block it is building. The sync engine's validator, by contrast, rejects
/// the whole block on the first failing result (see `crate::sync::validator`).
pub fn execute(
    txs: &[Tx],
    accounts: &mut Overlay<Address, AccountState>,
    delegates: &mut Overlay<Address, DelegateEntry>,
    is_proposing: bool,
) -> Vec<TxResult> {
    let _ = is_proposing;
    txs.iter()
        .map(|tx| execute_one(tx, accounts, delegates))
        .collect()
}

fn execute_one(
    tx: &Tx,
    accounts: &mut Overlay<Address, AccountState>,
    delegates: &mut Overlay<Address, DelegateEntry>,
) -> TxResult {
    let tx_id = tx.id();
    let sender_state = accounts.get(&tx.sender).copied().unwrap_or_default();

    if sender_state.nonce != tx.nonce {
        return TxResult {
            tx_id,
            is_success: false,
            error: Some(TxError::BadNonce {
                expected: sender_state.nonce,
                got: tx.nonce,
            }),
        };
    }

    if sender_state.balance < tx.amount {
        return TxResult {
            tx_id,
            is_success: false,
            error: Some(TxError::InsufficientBalance {
                have: sender_state.balance,
                need: tx.amount,
            }),
        };
    }

    let recipient_state = accounts.get(&tx.recipient).copied().unwrap_or_default();

    accounts.set(
        tx.sender,
        AccountState {
            balance: sender_state.balance - tx.amount,
            nonce: sender_state.nonce + 1,
        },
    );
    accounts.set(
        tx.recipient,
        AccountState {
            balance: recipient_state.balance + tx.amount,
            nonce: recipient_state.nonce,
        },
    );

    if let Some(public_key) = &tx.register_delegate {
        delegates.set(
            tx.sender,
            DelegateEntry {
                public_key: public_key.clone(),
                voting_power: 1,
            },
        );
    }

    TxResult {
        tx_id,
        is_success: true,
        error: None,
    }
}
