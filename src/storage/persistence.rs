//! Chain persistence layer
//!
//! Provides save/load functionality for the chain store.

use crate::core::Chain;
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: std::path::PathBuf,
    pub chain_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: std::path::PathBuf::from(".bft_sync_data"),
            chain_file: "chain.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Chain storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self, StorageError> {
        Self::new(StorageConfig::default())
    }

    /// Get the chain file path
    fn chain_path(&self) -> std::path::PathBuf {
        self.config.data_dir.join(&self.config.chain_file)
    }

    /// Get a backup file path
    fn backup_path(&self, index: usize) -> std::path::PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.chain_file, index))
    }

    /// Save the chain to disk
    pub fn save(&self, chain: &Chain) -> Result<(), StorageError> {
        let path = self.chain_path();

        if self.config.backup_enabled && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        let temp_path = self.config.data_dir.join("chain.tmp");
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, chain)?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    /// Load the chain from disk
    pub fn load(&self) -> Result<Chain, StorageError> {
        let path = self.chain_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "chain file not found".to_string(),
            ));
        }

        let file = fs::File::open(&path)?;
        let reader = BufReader::new(file);
        let chain: Chain = serde_json::from_reader(reader)?;

        Ok(chain)
    }

    /// Check if a saved chain exists
    pub fn exists(&self) -> bool {
        self.chain_path().exists()
    }

    /// Delete the saved chain
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.chain_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                let next = self.backup_path(i + 1);
                fs::rename(&current, &next)?;
            }
        }

        Ok(())
    }

    /// Restore from a backup
    pub fn restore_backup(&self, backup_index: usize) -> Result<Chain, StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "backup {} not found",
                backup_index
            )));
        }

        let file = fs::File::open(&backup_path)?;
        let reader = BufReader::new(file);
        let chain: Chain = serde_json::from_reader(reader)?;

        Ok(chain)
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        let mut backups = Vec::new();
        for i in 0..self.config.max_backups {
            if self.backup_path(i).exists() {
                backups.push(i);
            }
        }
        backups
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let path = self.chain_path();

        let file_size = if path.exists() {
            fs::metadata(&path)?.len()
        } else {
            0
        };

        let backup_count = self.list_backups().len();

        Ok(StorageStats {
            file_size,
            backup_count,
            data_dir: self.config.data_dir.clone(),
        })
    }
}

/// Storage statistics
#[derive(Debug)]
pub struct StorageStats {
    pub file_size: u64,
    pub backup_count: usize,
    pub data_dir: std::path::PathBuf,
}

/// Save a chain to a specific file path
pub fn save_to_file(chain: &Chain, path: &Path) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, chain)?;
    Ok(())
}

/// Load a chain from a specific file path
pub fn load_from_file(path: &Path) -> Result<Chain, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let chain: Chain = serde_json::from_reader(reader)?;
    Ok(chain)
}
