//! Node wiring: ties the transport, peer manager, and sync engine together.

use crate::core::Chain;
use crate::network::message::{Handshake, Message};
use crate::network::peer::PeerManager;
use crate::network::server::{connect_to_peer, handle_connection, Server};
use crate::sync::constants::SyncTuning;
use crate::sync::{inbox, Controller};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};

/// A point-in-time snapshot of the node's sync state, for the status API.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NodeStatus {
    pub height: u64,
    pub target: u64,
    pub syncing: bool,
    pub peer_count: usize,
}

/// A running node: owns the chain, the peer manager, and the sync engine
/// controller, and dispatches inbound messages between them.
pub struct Node {
    pub chain: Arc<RwLock<Chain>>,
    pub peers: Arc<PeerManager>,
    pub controller: Arc<Controller>,
    listen_port: u16,
    message_tx: mpsc::Sender<(SocketAddr, Message)>,
    message_rx: Mutex<Option<mpsc::Receiver<(SocketAddr, Message)>>>,
}

impl Node {
    pub fn new(chain: Chain, listen_port: u16) -> Self {
        Self::with_tuning(chain, listen_port, SyncTuning::default())
    }

    pub fn with_tuning(chain: Chain, listen_port: u16, tuning: SyncTuning) -> Self {
        let chain = Arc::new(RwLock::new(chain));
        let peers = Arc::new(PeerManager::new(listen_port));
        let controller = Arc::new(Controller::with_tuning(
            Arc::clone(&chain),
            Arc::clone(&peers),
            tuning,
        ));
        let (message_tx, message_rx) = mpsc::channel(256);
        Self {
            chain,
            peers,
            controller,
            listen_port,
            message_tx,
            message_rx: Mutex::new(Some(message_rx)),
        }
    }

    pub async fn status(&self) -> NodeStatus {
        let height = self.chain.read().await.latest_number();
        NodeStatus {
            height,
            target: self.controller.registry().target().await,
            syncing: self.controller.is_running(),
            peer_count: self.peers.peer_count().await,
        }
    }

    /// Bind the listener and begin accepting peer connections, dispatching
    /// every inbound message to the sync engine's Inbox. Runs until told to
    /// shut down; does not itself drive the sync engine — call
    /// `controller.start(target)` separately.
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) -> std::io::Result<()> {
        let server = Server::bind(self.listen_port).await?;
        let mut message_rx = self
            .message_rx
            .lock()
            .await
            .take()
            .expect("Node::run called more than once");

        let dispatch_chain = Arc::clone(&self.chain);
        let dispatch_running = Arc::clone(self.controller.running_flag());
        let dispatch_registry = Arc::clone(self.controller.registry());
        let dispatch_peers = Arc::clone(&self.peers);
        tokio::spawn(async move {
            while let Some((from, msg)) = message_rx.recv().await {
                log::debug!("node: received {} from {}", msg.type_name(), from);
                match inbox::on_message(&dispatch_registry, &dispatch_running, &msg).await {
                    inbox::Outcome::Handled => {}
                    inbox::Outcome::Unhandled => {
                        handle_unhandled(&dispatch_chain, &dispatch_peers, from, msg).await;
                    }
                }
            }
        });

        loop {
            tokio::select! {
                accepted = server.accept() => {
                    let (stream, addr) = accepted?;
                    let peers = Arc::clone(&self.peers);
                    let tx = self.message_tx.clone();
                    let handshake = self.handshake().await;
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, peers, handshake, tx, false).await {
                            log::warn!("node: connection with {} ended: {}", addr, e);
                        }
                    });
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        log::info!("node: shutting down listener");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Dial an outbound peer. Safe to call before `run()` starts dispatching
    /// (messages simply queue in the channel until the dispatch loop spins up).
    pub async fn connect_to(&self, addr: &str) {
        match connect_to_peer(addr).await {
            Ok((stream, peer_addr)) => {
                let peers = Arc::clone(&self.peers);
                let handshake = self.handshake().await;
                let tx = self.message_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) =
                        handle_connection(stream, peer_addr, peers, handshake, tx, true).await
                    {
                        log::warn!("node: outbound connection to {} ended: {}", peer_addr, e);
                    }
                });
            }
            Err(e) => log::warn!("node: failed to connect to {}: {}", addr, e),
        }
    }

    async fn handshake(&self) -> Handshake {
        let chain = self.chain.read().await;
        Handshake::new(chain.latest_number(), chain.latest_block().hash, self.listen_port)
    }
}

async fn handle_unhandled(
    chain: &Arc<RwLock<Chain>>,
    peers: &Arc<PeerManager>,
    from: SocketAddr,
    msg: Message,
) {
    match msg {
        Message::GetBlock(height) => {
            let block = chain.read().await.get_block(height).cloned();
            if let Err(e) = peers.send_to(&from, Message::Block(block)).await {
                log::warn!("node: failed to answer GetBlock({}) for {}: {}", height, from, e);
            }
        }
        Message::Ping(nonce) => {
            let _ = peers.send_to(&from, Message::Pong(nonce)).await;
        }
        Message::Handshake(h) => {
            peers.update_peer(&from, &h).await;
        }
        other => {
            log::debug!("node: no handler for {} from {}", other.type_name(), from);
        }
    }
}
