//! CLI command handlers: init, sync, serve, status.

use crate::api::{create_router, ApiState};
use crate::config::NodeConfig;
use crate::core::{Chain, GenesisConfig};
use crate::network::Node;
use crate::storage::{Storage, StorageConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn storage_for(data_dir: &PathBuf) -> CliResult<Storage> {
    let storage_config = StorageConfig {
        data_dir: data_dir.clone(),
        ..Default::default()
    };
    Ok(Storage::new(storage_config)?)
}

/// Create a fresh chain store and config file in `data_dir`.
pub fn cmd_init(data_dir: PathBuf) -> CliResult<()> {
    let storage = storage_for(&data_dir)?;
    if storage.exists() {
        println!("chain store already exists at {}", data_dir.display());
        return Ok(());
    }

    let chain = Chain::new(GenesisConfig::default());
    storage.save(&chain)?;

    let config = NodeConfig {
        data_dir: data_dir.clone(),
        ..NodeConfig::default()
    };
    config.save()?;

    println!("initialized chain store at {}", data_dir.display());
    Ok(())
}

/// Print the persisted chain's tip height.
pub fn cmd_status(data_dir: PathBuf) -> CliResult<()> {
    let storage = storage_for(&data_dir)?;
    if !storage.exists() {
        println!("no chain store at {}; run `init` first", data_dir.display());
        return Ok(());
    }
    let chain = storage.load()?;
    println!("height: {}", chain.latest_number());
    println!("tip hash: {}", hex::encode(chain.latest_block().hash));
    Ok(())
}

/// Run the sync engine against `target` and exit once reached.
pub async fn cmd_sync(data_dir: PathBuf, target: u64) -> CliResult<()> {
    let config = NodeConfig::load(&data_dir)?;
    let storage = storage_for(&data_dir)?;
    let chain = if storage.exists() {
        storage.load()?
    } else {
        Chain::new(GenesisConfig::default())
    };

    let node = Arc::new(Node::with_tuning(chain, config.listen_port, config.tuning()));
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let run_node = Arc::clone(&node);
    let listener = tokio::spawn(async move {
        if let Err(e) = run_node.run(shutdown_rx).await {
            log::error!("node listener exited: {}", e);
        }
    });

    for addr in &config.bootstrap_peers {
        node.connect_to(addr).await;
    }
    // give outbound handshakes a moment to land before requesting blocks
    tokio::time::sleep(Duration::from_millis(200)).await;

    if let Err(e) = node.controller.start(target).await {
        log::warn!("sync: {}", e);
    }

    let _ = shutdown_tx.send(true);
    let _ = listener.await;

    storage.save(&node.chain.read().await)?;
    println!("synced to height {}", node.chain.read().await.latest_number());
    Ok(())
}

/// Run a long-lived node: answers peer requests, chases the best known peer
/// height, and serves the status API.
pub async fn cmd_serve(data_dir: PathBuf) -> CliResult<()> {
    let config = NodeConfig::load(&data_dir)?;
    let storage = storage_for(&data_dir)?;
    let chain = if storage.exists() {
        storage.load()?
    } else {
        let chain = Chain::new(GenesisConfig::default());
        storage.save(&chain)?;
        chain
    };

    let node = Arc::new(Node::with_tuning(chain, config.listen_port, config.tuning()));
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let run_node = Arc::clone(&node);
    let listener = tokio::spawn(async move {
        if let Err(e) = run_node.run(shutdown_rx).await {
            log::error!("node listener exited: {}", e);
        }
    });

    for addr in &config.bootstrap_peers {
        node.connect_to(addr).await;
    }

    let api_state = ApiState {
        node: Arc::clone(&node),
    };
    let router = create_router(api_state);
    let api_listener = tokio::net::TcpListener::bind(("0.0.0.0", config.listen_port + 1)).await?;
    log::info!("status API listening on :{}", config.listen_port + 1);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(api_listener, router).await {
            log::error!("api server exited: {}", e);
        }
    });

    let chase_node = Arc::clone(&node);
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            if chase_node.controller.is_running() {
                continue;
            }
            let best = chase_node
                .peers
                .get_all_peer_info()
                .await
                .into_iter()
                .map(|p| p.height)
                .max()
                .unwrap_or(0);
            let tip = chase_node.chain.read().await.latest_number();
            if best > tip {
                log::info!("serve: chasing peers to height {}", best);
                if let Err(e) = chase_node.controller.start(best).await {
                    log::warn!("serve: could not start sync to {}: {}", best, e);
                }
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    log::info!("serve: shutting down");
    let _ = shutdown_tx.send(true);
    let _ = listener.await;
    storage_for(&data_dir)?.save(&node.chain.read().await)?;
    Ok(())
}
