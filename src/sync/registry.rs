//! The Task Registry: the sync engine's sole mutable state.
//!
//! Three work sets plus a target height, all guarded by one mutex. Every
//! mutation here is a small, self-contained operation — there are no
//! condition variables and nothing blocks except on the mutex itself.

use crate::core::Block;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;
use tokio::sync::Mutex;

struct RegistryState {
    to_download: BTreeSet<u64>,
    in_flight: HashMap<u64, Instant>,
    to_process: BTreeMap<u64, Block>,
    target: u64,
}

impl RegistryState {
    fn empty() -> Self {
        Self {
            to_download: BTreeSet::new(),
            in_flight: HashMap::new(),
            to_process: BTreeMap::new(),
            target: 0,
        }
    }
}

/// Owns the Downloader/Inbox/Processor work sets. Every public method takes
/// the lock, performs one operation, and releases it.
pub struct Registry {
    state: Mutex<RegistryState>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::empty()),
        }
    }

    /// Reset the registry to request every height in `[tip+1, target)`.
    pub async fn init(&self, tip: u64, target: u64) {
        let mut state = self.state.lock().await;
        state.to_download.clear();
        state.in_flight.clear();
        state.to_process.clear();
        state.target = target;
        for height in (tip + 1)..target {
            state.to_download.insert(height);
        }
    }

    pub async fn target(&self) -> u64 {
        self.state.lock().await.target
    }

    /// Pop the smallest pending height, if any.
    pub async fn next_to_request(&self) -> Option<u64> {
        let mut state = self.state.lock().await;
        let next = *state.to_download.iter().next()?;
        state.to_download.remove(&next);
        Some(next)
    }

    /// Mark `height` as dispatched at `now`.
    pub async fn mark_in_flight(&self, height: u64, now: Instant) {
        let mut state = self.state.lock().await;
        state.in_flight.insert(height, now);
    }

    /// Current number of outstanding requests (for the Downloader's
    /// backpressure gate).
    pub async fn in_flight_count(&self) -> usize {
        self.state.lock().await.in_flight.len()
    }

    /// Move any request older than `max_age` back to `to_download`, and
    /// return the heights reaped.
    pub async fn reap_timeouts(&self, now: Instant, max_age: std::time::Duration) -> Vec<u64> {
        let mut state = self.state.lock().await;
        let stale: Vec<u64> = state
            .in_flight
            .iter()
            .filter(|(_, dispatched_at)| now.saturating_duration_since(**dispatched_at) > max_age)
            .map(|(height, _)| *height)
            .collect();

        for height in &stale {
            state.in_flight.remove(height);
            state.to_download.insert(*height);
        }
        stale
    }

    /// File a received block: clear its in-flight entry and queue it for
    /// the Processor. A duplicate arrival for an already-queued height
    /// simply overwrites the queued block.
    pub async fn receive(&self, block: Block) {
        let mut state = self.state.lock().await;
        state.in_flight.remove(&block.number);
        state.to_process.insert(block.number, block);
    }

    /// Return the block at `tip + 1` if it is ready, discarding any stale
    /// entries at or below `tip` along the way (I5).
    pub async fn take_next(&self, tip: u64) -> Option<Block> {
        let mut state = self.state.lock().await;
        state.to_process.retain(|number, _| *number > tip);

        let next_number = *state.to_process.keys().next()?;
        if next_number == tip + 1 {
            state.to_process.remove(&next_number)
        } else {
            None
        }
    }

    /// After a failed commit, return `height` to the download queue,
    /// removing it from the other two sets so invariant I1 keeps holding.
    pub async fn reinsert(&self, height: u64) {
        let mut state = self.state.lock().await;
        state.in_flight.remove(&height);
        state.to_process.remove(&height);
        state.to_download.insert(height);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::Block as CoreBlock;

    fn block(number: u64) -> CoreBlock {
        let mut b = CoreBlock::genesis([0u8; 20]);
        b.number = number;
        b
    }

    #[tokio::test]
    async fn init_populates_full_range() {
        let registry = Registry::new();
        registry.init(10, 13).await;

        let mut seen = vec![];
        while let Some(h) = registry.next_to_request().await {
            seen.push(h);
        }
        assert_eq!(seen, vec![11, 12]);
    }

    #[tokio::test]
    async fn reap_timeouts_only_touches_stale_entries() {
        let registry = Registry::new();
        let now = Instant::now();
        registry.mark_in_flight(1, now).await;
        registry.mark_in_flight(2, now - std::time::Duration::from_secs(200)).await;

        let reaped = registry
            .reap_timeouts(now, std::time::Duration::from_secs(120))
            .await;
        assert_eq!(reaped, vec![2]);
        assert_eq!(registry.in_flight_count().await, 1);
        assert_eq!(registry.next_to_request().await, Some(2));
    }

    #[tokio::test]
    async fn take_next_discards_stale_and_waits_for_in_order() {
        let registry = Registry::new();
        registry.receive(block(5)).await; // stale, below tip
        registry.receive(block(7)).await; // out of order, not next
        registry.receive(block(6)).await; // next

        assert_eq!(registry.take_next(5).await.map(|b| b.number), Some(6));
        // height 7 is ready only once 6 has been taken and tip advances
        assert_eq!(registry.take_next(5).await, None);
        assert_eq!(registry.take_next(6).await.map(|b| b.number), Some(7));
    }

    #[tokio::test]
    async fn reinsert_clears_other_sets() {
        let registry = Registry::new();
        registry.mark_in_flight(4, Instant::now()).await;
        registry.reinsert(4).await;

        assert_eq!(registry.in_flight_count().await, 0);
        assert_eq!(registry.next_to_request().await, Some(4));
    }
}
