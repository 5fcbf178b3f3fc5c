//! The Inbox: files incoming wire messages into the Task Registry.

use crate::network::message::Message;
use crate::sync::registry::Registry;
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether a message was consumed here or should be dispatched elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    Unhandled,
}

/// Accept a `Block`/`BlockHeader` message while the engine is running.
///
/// Does not validate the block — a malformed or adversarial block may enter
/// the Registry's `to_process` set and is only rejected later by the
/// Processor/Validator (`crate::sync::validator`).
pub async fn on_message(registry: &Registry, running: &AtomicBool, msg: &Message) -> Outcome {
    if !running.load(Ordering::SeqCst) {
        return Outcome::Unhandled;
    }

    match msg {
        Message::Block(Some(block)) => {
            registry.receive(block.clone()).await;
            Outcome::Handled
        }
        Message::Block(None) => Outcome::Handled,
        Message::BlockHeader(_) => Outcome::Handled,
        _ => Outcome::Unhandled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::Block;

    #[tokio::test]
    async fn files_block_into_registry() {
        let registry = Registry::new();
        let running = AtomicBool::new(true);

        let mut b = Block::genesis([1u8; 20]);
        b.number = 3;
        let outcome = on_message(&registry, &running, &Message::Block(Some(b))).await;

        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(registry.take_next(2).await.map(|b| b.number), Some(3));
    }

    #[tokio::test]
    async fn ignored_while_not_running() {
        let registry = Registry::new();
        let running = AtomicBool::new(false);

        let mut b = Block::genesis([1u8; 20]);
        b.number = 3;
        let outcome = on_message(&registry, &running, &Message::Block(Some(b))).await;

        assert_eq!(outcome, Outcome::Unhandled);
        assert_eq!(registry.take_next(2).await, None);
    }

    #[tokio::test]
    async fn unrelated_message_is_unhandled() {
        let registry = Registry::new();
        let running = AtomicBool::new(true);

        let outcome = on_message(&registry, &running, &Message::Ping(1)).await;
        assert_eq!(outcome, Outcome::Unhandled);
    }
}
