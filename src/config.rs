//! Node configuration: listen address, data directory, bootstrap peers, and
//! the sync engine's tunable timings. Loaded from `<data_dir>/config.json`
//! when present, overridden by CLI flags, and falling back to defaults
//! otherwise.

use crate::sync::constants::SyncTuning;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub listen_port: u16,
    pub data_dir: PathBuf,
    pub bootstrap_peers: Vec<String>,
    pub max_batch_size: usize,
    pub max_download_time_ms: u64,
    pub downloader_period_ms: u64,
    pub processor_period_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_port: 7676,
            data_dir: PathBuf::from(".bft_sync_data"),
            bootstrap_peers: Vec::new(),
            max_batch_size: crate::sync::constants::MAX_BATCH_SIZE,
            max_download_time_ms: crate::sync::constants::MAX_DOWNLOAD_TIME.as_millis() as u64,
            downloader_period_ms: crate::sync::constants::DOWNLOADER_PERIOD.as_millis() as u64,
            processor_period_ms: crate::sync::constants::PROCESSOR_PERIOD.as_millis() as u64,
        }
    }
}

impl NodeConfig {
    fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join("config.json")
    }

    /// Load `<data_dir>/config.json`. A missing file falls back to defaults
    /// (scoped to `data_dir`) with a warning; a present-but-malformed file is
    /// a hard error.
    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(data_dir);
        if !path.exists() {
            log::warn!(
                "no config file at {}, using defaults",
                path.display()
            );
            return Ok(Self {
                data_dir: data_dir.to_path_buf(),
                ..Self::default()
            });
        }

        let raw = fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Malformed {
            path: path.clone(),
            source,
        })?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.data_dir)?;
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(Self::path_in(&self.data_dir), raw)?;
        Ok(())
    }

    /// Convert the persisted millisecond fields into the `Duration`-based
    /// tuning the sync engine's `Controller`/`Downloader` actually run on.
    pub fn tuning(&self) -> SyncTuning {
        SyncTuning {
            max_batch_size: self.max_batch_size,
            max_download_time: Duration::from_millis(self.max_download_time_ms),
            downloader_period: Duration::from_millis(self.downloader_period_ms),
            processor_period: Duration::from_millis(self.processor_period_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = NodeConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.listen_port, NodeConfig::default().listen_port);
        assert_eq!(config.data_dir, temp_dir.path());
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = NodeConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..NodeConfig::default()
        };
        config.listen_port = 9999;
        config.bootstrap_peers.push("127.0.0.1:7676".to_string());
        config.save().unwrap();

        let loaded = NodeConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.listen_port, 9999);
        assert_eq!(loaded.bootstrap_peers, vec!["127.0.0.1:7676".to_string()]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("config.json"), b"not json").unwrap();
        assert!(NodeConfig::load(temp_dir.path()).is_err());
    }

    #[test]
    fn tuning_reflects_configured_timings() {
        let config = NodeConfig {
            max_batch_size: 7,
            max_download_time_ms: 1_000,
            downloader_period_ms: 50,
            processor_period_ms: 25,
            ..NodeConfig::default()
        };

        let tuning = config.tuning();
        assert_eq!(tuning.max_batch_size, 7);
        assert_eq!(tuning.max_download_time, Duration::from_millis(1_000));
        assert_eq!(tuning.downloader_period, Duration::from_millis(50));
        assert_eq!(tuning.processor_period, Duration::from_millis(25));
    }
}
