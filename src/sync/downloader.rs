//! The Downloader: drains idle peers against the Registry's download queue.

use crate::network::message::Message;
use crate::network::peer::PeerManager;
use crate::sync::constants::SyncTuning;
use crate::sync::registry::Registry;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Instant;

/// Run one scheduling tick: reap timeouts, then dispatch `GetBlock` requests
/// to as many idle peers as the queue and the in-flight cap allow.
pub async fn tick(registry: &Registry, peers: &Arc<PeerManager>, tuning: &SyncTuning) {
    let now = Instant::now();

    if registry.in_flight_count().await > tuning.max_batch_size {
        log::debug!("downloader: in-flight above cap, skipping dispatch this tick");
        return;
    }

    let reaped = registry.reap_timeouts(now, tuning.max_download_time).await;
    for height in &reaped {
        log::debug!("downloader: request for height {} timed out, requeued", height);
    }

    let mut channels = peers.idle_channels().await;
    if channels.is_empty() {
        return;
    }
    if channels.len() > tuning.max_batch_size {
        channels.shuffle(&mut rand::thread_rng());
        channels.truncate(tuning.max_batch_size);
    }

    for channel in channels {
        let Some(height) = registry.next_to_request().await else {
            break;
        };
        match channel.send(Message::GetBlock(height)).await {
            Ok(()) => {
                registry.mark_in_flight(height, now).await;
                log::debug!("downloader: requested block {} from {}", height, channel.addr);
            }
            Err(e) => {
                log::warn!(
                    "downloader: failed to request block {} from {}: {}",
                    height,
                    channel.addr,
                    e
                );
                registry.reinsert(height).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::peer::PeerHandle;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn tick_dispatches_to_available_peer() {
        let registry = Registry::new();
        registry.init(0, 2).await;

        let peers = Arc::new(PeerManager::new(8333));
        let addr: std::net::SocketAddr = "127.0.0.1:9100".parse().unwrap();
        let (tx, mut rx) = mpsc::channel(4);
        peers
            .add_peer(addr, PeerHandle { addr, tx }, true)
            .await
            .unwrap();
        peers
            .update_peer(&addr, &crate::network::message::Handshake::new(0, [0u8; 32], 8333))
            .await;

        tick(&registry, &peers, &SyncTuning::default()).await;

        let msg = rx.try_recv().unwrap();
        assert!(matches!(msg, Message::GetBlock(1)));
        assert_eq!(registry.in_flight_count().await, 1);
    }

    #[tokio::test]
    async fn tick_is_noop_with_no_peers() {
        let registry = Registry::new();
        registry.init(0, 2).await;
        let peers = Arc::new(PeerManager::new(8333));

        tick(&registry, &peers, &SyncTuning::default()).await;
        assert_eq!(registry.in_flight_count().await, 0);
    }

    #[tokio::test]
    async fn tick_respects_configured_batch_size() {
        let registry = Registry::new();
        registry.init(0, 5).await;
        let peers = Arc::new(PeerManager::new(8333));

        for i in 0..3u16 {
            let addr: std::net::SocketAddr = format!("127.0.0.1:{}", 9200 + i).parse().unwrap();
            let (tx, _rx) = mpsc::channel(4);
            peers.add_peer(addr, PeerHandle { addr, tx }, true).await.unwrap();
            peers
                .update_peer(&addr, &crate::network::message::Handshake::new(0, [0u8; 32], 8333))
                .await;
        }

        let tuning = SyncTuning {
            max_batch_size: 1,
            ..SyncTuning::default()
        };
        tick(&registry, &peers, &tuning).await;

        assert_eq!(registry.in_flight_count().await, 1);
    }
}
