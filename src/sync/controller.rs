//! The Controller: start/stop lifecycle for the sync engine.

use crate::core::Chain;
use crate::network::peer::PeerManager;
use crate::sync::constants::SyncTuning;
use crate::sync::error::SyncError;
use crate::sync::registry::Registry;
use crate::sync::{downloader, processor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

/// Owns the Task Registry and drives the Downloader/Processor loops.
///
/// A process is expected to construct one `Controller` and reuse it across
/// `start`/`stop` cycles (L2: restartability).
pub struct Controller {
    chain: Arc<RwLock<Chain>>,
    peers: Arc<PeerManager>,
    registry: Arc<Registry>,
    running: Arc<AtomicBool>,
    done: Arc<Notify>,
    tuning: SyncTuning,
}

impl Controller {
    pub fn new(chain: Arc<RwLock<Chain>>, peers: Arc<PeerManager>) -> Self {
        Self::with_tuning(chain, peers, SyncTuning::default())
    }

    pub fn with_tuning(
        chain: Arc<RwLock<Chain>>,
        peers: Arc<PeerManager>,
        tuning: SyncTuning,
    ) -> Self {
        Self {
            chain,
            peers,
            registry: Arc::new(Registry::new()),
            running: Arc::new(AtomicBool::new(false)),
            done: Arc::new(Notify::new()),
            tuning,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Accessor used by the Inbox to gate incoming blocks on engine state.
    pub fn running_flag(&self) -> &Arc<AtomicBool> {
        &self.running
    }

    /// Sync the chain up to (but not including) `target`. Blocks until
    /// either the target is reached or `stop()` is called from elsewhere.
    ///
    /// Returns `Err(SyncError::AlreadyRunning)` without disturbing the
    /// in-progress run, and `Err(SyncError::NoPeers)` without touching the
    /// registry, if there is nobody to download from yet.
    pub async fn start(&self, target: u64) -> Result<(), SyncError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SyncError::AlreadyRunning);
        }

        let tip = self.chain.read().await.latest_number();
        if tip + 1 < target && self.peers.peer_count().await == 0 {
            self.running.store(false, Ordering::SeqCst);
            return Err(SyncError::NoPeers);
        }

        self.registry.init(tip, target).await;
        log::info!("controller: starting sync from {} to {}", tip, target);

        let downloader_handle = {
            let registry = Arc::clone(&self.registry);
            let peers = Arc::clone(&self.peers);
            let running = Arc::clone(&self.running);
            let tuning = self.tuning;
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(tuning.downloader_period);
                while running.load(Ordering::SeqCst) {
                    interval.tick().await;
                    downloader::tick(&registry, &peers, &tuning).await;
                }
            })
        };

        let processor_handle = {
            let registry = Arc::clone(&self.registry);
            let chain = Arc::clone(&self.chain);
            let running = Arc::clone(&self.running);
            let done = Arc::clone(&self.done);
            let processor_period = self.tuning.processor_period;
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(processor_period);
                loop {
                    interval.tick().await;
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    if processor::tick(&registry, &chain).await == processor::TickOutcome::Complete
                    {
                        running.store(false, Ordering::SeqCst);
                        done.notify_one();
                        break;
                    }
                }
            })
        };

        // Wait for either natural completion or an external stop() call;
        // a spurious wakeup is harmless because we re-check `running` below.
        self.done.notified().await;
        self.running.store(false, Ordering::SeqCst);

        downloader_handle.abort();
        let _ = processor_handle.await;

        log::info!(
            "controller: sync finished at height {}",
            self.chain.read().await.latest_number()
        );
        Ok(())
    }

    /// Request the running sync to stop. A no-op if not running (L1).
    pub fn stop(&self) {
        if self
            .running
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.done.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GenesisConfig;

    #[tokio::test]
    async fn start_with_already_met_target_completes_immediately() {
        let chain = Arc::new(RwLock::new(Chain::new(GenesisConfig::default())));
        let peers = Arc::new(PeerManager::new(8333));
        let controller = Controller::new(chain, peers);

        // target 1 means tip(0)+1 >= target, so the first processor tick
        // observes completion without any peer activity, even with no peers
        // connected.
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), controller.start(1))
            .await
            .expect("controller.start should complete promptly");

        assert!(result.is_ok());
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn start_with_no_peers_and_unmet_target_errors() {
        let chain = Arc::new(RwLock::new(Chain::new(GenesisConfig::default())));
        let peers = Arc::new(PeerManager::new(8333));
        let controller = Controller::new(chain, peers);

        let result = controller.start(10).await;

        assert!(matches!(result, Err(SyncError::NoPeers)));
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn start_while_already_running_errors() {
        let chain = Arc::new(RwLock::new(Chain::new(GenesisConfig::default())));
        let peers = Arc::new(PeerManager::new(8333));
        let controller = Arc::new(Controller::new(chain, peers));

        controller.running.store(true, Ordering::SeqCst);
        let result = controller.start(10).await;

        assert!(matches!(result, Err(SyncError::AlreadyRunning)));
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let chain = Arc::new(RwLock::new(Chain::new(GenesisConfig::default())));
        let peers = Arc::new(PeerManager::new(8333));
        let controller = Controller::new(chain, peers);

        controller.stop();
        controller.stop();
        assert!(!controller.is_running());
    }
}
