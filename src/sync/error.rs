//! Error type for the sync engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("no peers available")]
    NoPeers,
    #[error("sync already running")]
    AlreadyRunning,
}
