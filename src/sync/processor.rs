//! The Processor: drains the Registry in height order and commits blocks.

use crate::core::Chain;
use crate::sync::registry::Registry;
use crate::sync::validator::validate_and_commit;
use tokio::sync::RwLock;

/// Outcome of one processor tick, used by the Controller to decide whether
/// to signal completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Local height reached `target - 1`; sync is done.
    Complete,
    /// A block was committed, or there was nothing ready to process yet.
    Progressed,
}

/// Run one tick: check for completion, otherwise try to commit the next
/// in-order block.
pub async fn tick(registry: &Registry, chain: &RwLock<Chain>) -> TickOutcome {
    let target = registry.target().await;
    let tip = chain.read().await.latest_number();

    if tip + 1 >= target {
        return TickOutcome::Complete;
    }

    let Some(block) = registry.take_next(tip).await else {
        return TickOutcome::Progressed;
    };

    let number = block.number;
    let committed = {
        let mut chain = chain.write().await;
        validate_and_commit(&mut chain, block)
    };

    if !committed {
        registry.reinsert(number).await;
    }

    TickOutcome::Progressed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Block, GenesisConfig};

    #[tokio::test]
    async fn reports_complete_at_target() {
        let registry = Registry::new();
        registry.init(0, 1).await; // tip 0, target 1: already at target
        let chain = RwLock::new(Chain::new(GenesisConfig::default()));

        assert_eq!(tick(&registry, &chain).await, TickOutcome::Complete);
    }

    #[tokio::test]
    async fn commits_ready_block_and_advances_tip() {
        let registry = Registry::new();
        registry.init(0, 2).await;
        let chain = RwLock::new(Chain::new(GenesisConfig::default()));

        let tip_hash = chain.read().await.latest_block().hash;
        let mut block = Block::genesis([3u8; 20]);
        block.number = 1;
        block.prev_hash = tip_hash;
        block.hash = block.compute_hash();
        registry.receive(block).await;

        assert_eq!(tick(&registry, &chain).await, TickOutcome::Progressed);
        assert_eq!(chain.read().await.latest_number(), 1);
    }

    #[tokio::test]
    async fn failed_validation_requeues_height() {
        let registry = Registry::new();
        registry.init(0, 2).await;
        let chain = RwLock::new(Chain::new(GenesisConfig::default()));

        let mut block = Block::genesis([3u8; 20]);
        block.number = 1;
        block.prev_hash = [9u8; 32]; // wrong, fails linkage
        block.hash = block.compute_hash();
        registry.receive(block).await;

        assert_eq!(tick(&registry, &chain).await, TickOutcome::Progressed);
        assert_eq!(chain.read().await.latest_number(), 0);
        assert_eq!(registry.next_to_request().await, Some(1));
    }
}
