//! Atomic block/transaction/UTXO store with chain-continuity integrity
//! checks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use meshchain_crypto::{sha256, Hash16, Hash32};
use serde::{Deserialize, Serialize};

use crate::atomic::write_atomic;
use crate::cache::LruCache;
use crate::error::{Result, StorageError};
use crate::metadata::{BlockMetadata, StateFile, TransactionIndex};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageStats {
    pub blocks_stored: u64,
    pub blocks_validated: u64,
    pub blocks_corrupted: u64,
    pub transactions_stored: u64,
    pub transactions_orphaned: u64,
    pub reads: u64,
    pub writes: u64,
    pub integrity_checks: u64,
}

#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub is_valid: bool,
    pub blocks_checked: u64,
    pub blocks_corrupted: u64,
    pub transactions_checked: u64,
    pub transactions_orphaned: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUtxo {
    pub id: Hash16,
    pub amount: u64,
    pub stealth_address: Hash16,
    pub block_height: u32,
    pub is_spent: bool,
}

pub struct StorageEngine {
    root: PathBuf,
    pub latest_block_height: Option<u32>,
    pub stats: StorageStats,
    block_cache: LruCache<u32, Vec<u8>>,
    utxo_cache: LruCache<Hash16, StoredUtxo>,
}

impl StorageEngine {
    pub fn open(root: impl AsRef<Path>, cache_entries: usize) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        for sub in ["blocks", "metadata", "transactions", "utxos"] {
            std::fs::create_dir_all(root.join(sub))?;
        }

        let latest_block_height = Self::load_state(&root)?;

        Ok(Self {
            root,
            latest_block_height,
            stats: StorageStats::default(),
            block_cache: LruCache::new(cache_entries),
            utxo_cache: LruCache::new(cache_entries),
        })
    }

    fn load_state(root: &Path) -> Result<Option<u32>> {
        let state_path = root.join("state.json");
        if !state_path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&state_path)?;
        let state: StateFile = serde_json::from_slice(&bytes)?;
        if state.latest_block_height < 0 {
            Ok(None)
        } else {
            Ok(Some(state.latest_block_height as u32))
        }
    }

    fn block_path(&self, height: u32) -> PathBuf {
        self.root.join("blocks").join(format!("{height:06}.bin"))
    }

    fn fork_candidate_path(&self, height: u32, hash_hex: &str) -> PathBuf {
        self.root.join("blocks").join(format!("{height:06}__{hash_hex}.bin"))
    }

    fn metadata_path(&self, height: u32) -> PathBuf {
        self.root.join("metadata").join(format!("{height:06}.json"))
    }

    fn tx_data_path(&self, tx_hash_hex: &str) -> PathBuf {
        self.root.join("transactions").join(format!("{tx_hash_hex}.bin"))
    }

    fn tx_index_path(&self, tx_hash_hex: &str) -> PathBuf {
        self.root.join("transactions").join(format!("{tx_hash_hex}.json"))
    }

    fn utxo_path(&self, id: &Hash16) -> PathBuf {
        self.root.join("utxos").join(format!("{}.json", id.to_hex()))
    }

    fn load_metadata(&self, height: u32) -> Result<BlockMetadata> {
        let bytes = std::fs::read(self.metadata_path(height)).map_err(|_| StorageError::BlockNotFound(height))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn save_state(&self) -> Result<()> {
        let now = Utc::now().timestamp();
        let height = self.latest_block_height.map(|h| h as i64).unwrap_or(-1);
        let state = StateFile::new(height, now);
        write_atomic(&self.root.join("state.json"), serde_json::to_vec_pretty(&state)?.as_slice())?;
        Ok(())
    }

    /// 1. reject empty bytes or a hash mismatch; 2. for `height > 0`,
    /// require the previous block's stored hash to equal `prev_hash`;
    /// 3. atomically write block + metadata; 4. advance the in-memory
    /// head and rewrite `state.json` when this is a new tip.
    pub fn add_block(&mut self, height: u32, hash: Hash32, bytes: &[u8], prev_hash: Option<Hash32>, tx_count: u32) -> Result<()> {
        if bytes.is_empty() {
            return Err(StorageError::EmptyBlock);
        }
        let computed = sha256(bytes);
        if computed != hash {
            return Err(StorageError::HashMismatch {
                expected: hash.to_hex(),
                computed: computed.to_hex(),
            });
        }

        if height > 0 {
            let prev_meta = self.load_metadata(height - 1)?;
            let expected_prev = prev_hash.map(|h| h.to_hex()).unwrap_or_default();
            if prev_meta.block_hash != expected_prev {
                return Err(StorageError::ChainBreak {
                    height,
                    prev_height: height - 1,
                });
            }
        }

        self.stats.blocks_validated += 1;

        write_atomic(&self.block_path(height), bytes)?;

        let metadata = BlockMetadata {
            height,
            block_hash: hash.to_hex(),
            timestamp: Utc::now().timestamp(),
            size: bytes.len(),
            tx_count,
            previous_hash: prev_hash.map(|h| h.to_hex()).unwrap_or_default(),
        };
        write_atomic(&self.metadata_path(height), serde_json::to_vec_pretty(&metadata)?.as_slice())?;

        self.block_cache.put(height, bytes.to_vec());

        if self.latest_block_height.is_none() || height > self.latest_block_height.unwrap() {
            self.latest_block_height = Some(height);
            self.save_state()?;
        }

        self.stats.blocks_stored += 1;
        self.stats.writes += 1;
        tracing::info!(height, hash = %hash.to_hex(), "block stored");
        Ok(())
    }

    /// Reads the block file, recomputes its hash, and compares it against
    /// the stored metadata. A mismatch counts as corruption and is
    /// reported to the caller rather than silently masked.
    pub fn get_block(&mut self, height: u32) -> Result<Vec<u8>> {
        self.stats.reads += 1;
        if let Some(cached) = self.block_cache.get(&height) {
            return Ok(cached.clone());
        }

        let bytes = std::fs::read(self.block_path(height)).map_err(|_| StorageError::BlockNotFound(height))?;
        let metadata = self.load_metadata(height)?;
        let computed = sha256(&bytes);
        if computed.to_hex() != metadata.block_hash {
            self.stats.blocks_corrupted += 1;
            tracing::warn!(height, expected = %metadata.block_hash, computed = %computed.to_hex(), "block corrupted on read");
            return Err(StorageError::Corrupted(format!(
                "block {height}: expected {}, computed {}",
                metadata.block_hash,
                computed.to_hex()
            )));
        }

        self.block_cache.put(height, bytes.clone());
        Ok(bytes)
    }

    /// Requires the referencing block to already exist on disk.
    pub fn add_transaction(&mut self, tx_hash: Hash32, block_height: u32, bytes: &[u8]) -> Result<()> {
        if !self.metadata_path(block_height).exists() {
            self.stats.transactions_orphaned += 1;
            return Err(StorageError::OrphanedTransaction(block_height));
        }

        let hex = tx_hash.to_hex();
        write_atomic(&self.tx_data_path(&hex), bytes)?;

        let index = TransactionIndex {
            tx_hash: hex.clone(),
            block_height,
            timestamp: Utc::now().timestamp(),
            size: bytes.len(),
        };
        write_atomic(&self.tx_index_path(&hex), serde_json::to_vec_pretty(&index)?.as_slice())?;

        self.stats.transactions_stored += 1;
        self.stats.writes += 1;
        Ok(())
    }

    pub fn get_transaction(&mut self, tx_hash: &Hash32) -> Result<Vec<u8>> {
        self.stats.reads += 1;
        let hex = tx_hash.to_hex();
        std::fs::read(self.tx_data_path(&hex)).map_err(|_| StorageError::TransactionNotFound(hex))
    }

    pub fn put_utxo(&mut self, utxo: StoredUtxo) -> Result<()> {
        write_atomic(&self.utxo_path(&utxo.id), serde_json::to_vec_pretty(&utxo)?.as_slice())?;
        self.utxo_cache.put(utxo.id, utxo);
        Ok(())
    }

    pub fn get_utxo(&mut self, id: &Hash16) -> Result<Option<StoredUtxo>> {
        if let Some(cached) = self.utxo_cache.get(id) {
            return Ok(Some(cached.clone()));
        }
        let path = self.utxo_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        let utxo: StoredUtxo = serde_json::from_slice(&bytes)?;
        self.utxo_cache.put(*id, utxo.clone());
        Ok(Some(utxo))
    }

    /// Walks `blocks/` in height order, checking each block's own hash
    /// and the previous-hash back-link, then cross-checks every
    /// transaction index against its referenced block.
    pub fn verify_chain_integrity(&mut self) -> Result<IntegrityReport> {
        self.stats.integrity_checks += 1;
        let mut report = IntegrityReport {
            is_valid: true,
            ..Default::default()
        };

        let mut heights = self.list_block_heights()?;
        heights.sort_unstable();

        let mut prev_meta: Option<BlockMetadata> = None;
        for height in heights {
            report.blocks_checked += 1;
            let bytes = match std::fs::read(self.block_path(height)) {
                Ok(b) => b,
                Err(_) => {
                    report.blocks_corrupted += 1;
                    report.is_valid = false;
                    continue;
                }
            };
            let metadata = match self.load_metadata(height) {
                Ok(m) => m,
                Err(_) => {
                    report.blocks_corrupted += 1;
                    report.is_valid = false;
                    continue;
                }
            };

            if sha256(&bytes).to_hex() != metadata.block_hash {
                report.blocks_corrupted += 1;
                report.is_valid = false;
            }

            if let Some(prev) = &prev_meta {
                if metadata.previous_hash != prev.block_hash {
                    report.blocks_corrupted += 1;
                    report.is_valid = false;
                }
            }
            prev_meta = Some(metadata);
        }

        let tx_dir = self.root.join("transactions");
        if tx_dir.exists() {
            for entry in std::fs::read_dir(&tx_dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                report.transactions_checked += 1;
                let bytes = std::fs::read(&path)?;
                let index: TransactionIndex = serde_json::from_slice(&bytes)?;
                if !self.metadata_path(index.block_height).exists() {
                    report.transactions_orphaned += 1;
                    report.is_valid = false;
                }
            }
        }

        tracing::info!(
            is_valid = report.is_valid,
            blocks_checked = report.blocks_checked,
            blocks_corrupted = report.blocks_corrupted,
            "chain integrity check complete"
        );
        Ok(report)
    }

    /// Stores `bytes` as a competing fork candidate at `height`, alongside
    /// (not replacing) whatever block is already canonical there.
    pub fn add_fork_candidate(&mut self, height: u32, hash: Hash32, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Err(StorageError::EmptyBlock);
        }
        let computed = sha256(bytes);
        if computed != hash {
            return Err(StorageError::HashMismatch {
                expected: hash.to_hex(),
                computed: computed.to_hex(),
            });
        }
        write_atomic(&self.fork_candidate_path(height, &hash.to_hex()), bytes)?;
        self.stats.writes += 1;
        Ok(())
    }

    /// Deletes every fork-candidate file at `height` other than
    /// `canonical_hash`. Returns the number of files removed.
    pub fn prune_fork_candidates(&mut self, height: u32, canonical_hash: Hash32) -> Result<usize> {
        let dir = self.root.join("blocks");
        if !dir.exists() {
            return Ok(0);
        }
        let prefix = format!("{height:06}__");
        let keep = format!("{prefix}{}.bin", canonical_hash.to_hex());
        let mut removed = 0usize;
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(&prefix) || name == keep {
                continue;
            }
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
        Ok(removed)
    }

    fn list_block_heights(&self) -> Result<Vec<u32>> {
        let mut heights = Vec::new();
        let dir = self.root.join("blocks");
        if !dir.exists() {
            return Ok(heights);
        }
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let stem = entry.path().file_stem().and_then(|s| s.to_str()).map(str::to_string);
            if let Some(stem) = stem {
                if let Ok(height) = stem.parse::<u32>() {
                    heights.push(height);
                }
            }
        }
        Ok(heights)
    }
}

/// In-memory map of UTXO ids to their stored state, mirrors what the
/// wallet or chain-head logic keeps warm without going through the
/// engine's disk-backed cache.
pub type UtxoIndex = HashMap<Hash16, StoredUtxo>;
