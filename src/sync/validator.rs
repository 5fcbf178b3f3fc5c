//! The Validator: linkage, transaction replay, quorum, and reward checks.

use crate::core::{execute, AccountState, Block, Chain};
use crate::crypto::{encode_precommit, h160, verify};
use std::collections::HashSet;

/// Run every check in order; the first failure rejects the block and
/// abandons both overlays without mutating `chain`. Returns `true` only
/// after every check passed and both overlays have been committed.
pub fn validate_and_commit(chain: &mut Chain, block: Block) -> bool {
    let tip = chain.latest_block();
    if block.number != tip.number + 1 || block.prev_hash != tip.hash {
        log::warn!(
            "validator: block {} does not link to tip {} ({:?} != {:?})",
            block.number,
            tip.number,
            block.prev_hash,
            tip.hash
        );
        return false;
    }

    let mut accounts = chain.account_state().track();
    let mut delegates = chain.delegate_state().track();

    let results = execute(&block.transactions, &mut accounts, &mut delegates, false);
    if let Some(failed) = results.iter().find(|r| !r.is_success) {
        log::warn!(
            "validator: block {} rejected, transaction failed: {:?}",
            block.number,
            failed.error
        );
        return false;
    }

    let validator_set = delegates.to_validator_set();
    let quorum = validator_set.quorum_threshold();

    let payload = encode_precommit(&block.hash, block.number, block.view);
    let mut approving: HashSet<[u8; 20]> = HashSet::new();
    for vote in &block.votes {
        let address = h160(&vote.public_key);
        if !validator_set.contains(&address) {
            continue;
        }
        if !verify(&vote.public_key, &payload, &vote.signature) {
            continue;
        }
        approving.insert(address);
    }

    if approving.len() < quorum {
        log::warn!(
            "validator: block {} rejected, {} distinct valid votes < quorum {}",
            block.number,
            approving.len(),
            quorum
        );
        return false;
    }

    let reward = crate::core::block_reward(block.number);
    if reward > 0 {
        let coinbase_state = accounts.get(&block.coinbase).copied().unwrap_or_default();
        accounts.set(
            block.coinbase,
            AccountState {
                balance: coinbase_state.balance + reward,
                nonce: coinbase_state.nonce,
            },
        );
    }

    accounts.commit(chain.account_state_mut());
    delegates.commit(chain.delegate_state_mut());

    match chain.append(block.clone()) {
        Ok(()) => {
            log::info!("validator: committed block {}", block.number);
            true
        }
        Err(e) => {
            log::error!("validator: append failed for block {}: {}", block.number, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Chain, GenesisConfig, Validator, Vote};
    use crate::crypto::KeyPair;

    fn next_block(chain: &Chain, coinbase: [u8; 20]) -> Block {
        let tip = chain.latest_block();
        let mut b = Block::genesis(coinbase);
        b.number = tip.number + 1;
        b.prev_hash = tip.hash;
        b.hash = b.compute_hash();
        b
    }

    fn sign_precommit(kp: &KeyPair, block: &Block) -> Vote {
        let payload = encode_precommit(&block.hash, block.number, block.view);
        let hash = crate::crypto::sha256(&payload);
        let signature = kp.sign(&hash).unwrap();
        Vote {
            public_key: kp.public_key.serialize().to_vec(),
            signature,
        }
    }

    #[test]
    fn rejects_bad_linkage() {
        let mut chain = Chain::new(GenesisConfig::default());
        let mut block = next_block(&chain, [0u8; 20]);
        block.prev_hash = [9u8; 32];
        assert!(!validate_and_commit(&mut chain, block));
        assert_eq!(chain.latest_number(), 0);
    }

    fn chain_with_validators(n: usize) -> (Chain, Vec<KeyPair>) {
        let keys: Vec<KeyPair> = (0..n).map(|_| KeyPair::generate()).collect();
        let delegates = keys
            .iter()
            .map(|kp| {
                (
                    kp.address(),
                    Validator {
                        public_key: kp.public_key.serialize().to_vec(),
                        voting_power: 1,
                    },
                )
            })
            .collect();
        let chain = Chain::new(GenesisConfig {
            coinbase: [0u8; 20],
            balances: vec![],
            delegates,
        });
        (chain, keys)
    }

    #[test]
    fn quorum_boundary_accepts_at_exact_threshold() {
        let (mut chain, keys) = chain_with_validators(7); // quorum = 5
        let mut block = next_block(&chain, [1u8; 20]);
        block.votes = keys.iter().take(5).map(|kp| sign_precommit(kp, &block)).collect();

        assert!(validate_and_commit(&mut chain, block));
        assert_eq!(chain.latest_number(), 1);
    }

    #[test]
    fn quorum_boundary_rejects_one_below_threshold() {
        let (mut chain, keys) = chain_with_validators(7); // quorum = 5
        let mut block = next_block(&chain, [1u8; 20]);
        block.votes = keys.iter().take(4).map(|kp| sign_precommit(kp, &block)).collect();

        assert!(!validate_and_commit(&mut chain, block));
        assert_eq!(chain.latest_number(), 0);
    }

    #[test]
    fn duplicate_votes_from_one_validator_do_not_satisfy_quorum() {
        let (mut chain, keys) = chain_with_validators(7); // quorum = 5
        let mut block = next_block(&chain, [1u8; 20]);
        let one_vote = sign_precommit(&keys[0], &block);
        block.votes = vec![one_vote.clone(), one_vote.clone(), one_vote];

        assert!(!validate_and_commit(&mut chain, block));
        assert_eq!(chain.latest_number(), 0);
    }

    #[test]
    fn reward_is_credited_to_coinbase_on_commit() {
        let (mut chain, keys) = chain_with_validators(4); // quorum = 3
        let coinbase = [7u8; 20];
        let mut block = next_block(&chain, coinbase);
        block.votes = keys.iter().take(3).map(|kp| sign_precommit(kp, &block)).collect();

        assert!(validate_and_commit(&mut chain, block));
        assert_eq!(
            chain.account_state().get(&coinbase).balance,
            crate::core::block_reward(1)
        );
    }
}
