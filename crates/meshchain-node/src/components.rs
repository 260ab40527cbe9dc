//! The per-node component set the orchestrator is the sole mutator of:
//! mempool, router, peer table, validator registry, synchronizer, and
//! storage engine. Each is owned here; nothing outside the orchestrator
//! mutates them directly.

use meshchain_consensus::ValidatorRegistry;
use meshchain_mempool::Mempool;
use meshchain_network::{PeerManager, Router};
use meshchain_storage::StorageEngine;
use meshchain_sync::Synchronizer;

use crate::config::NodeConfig;
use crate::error::Result;

pub struct Components {
    pub mempool: Mempool,
    pub router: Router,
    pub peers: PeerManager,
    pub validators: ValidatorRegistry,
    pub synchronizer: Synchronizer,
    pub storage: StorageEngine,
}

impl Components {
    pub fn open(config: &NodeConfig, cache_entries: usize) -> Result<Self> {
        Ok(Self {
            mempool: Mempool::default(),
            router: Router::default(),
            peers: PeerManager::new(config.max_peers),
            validators: ValidatorRegistry::default(),
            synchronizer: Synchronizer::new(),
            storage: StorageEngine::open(&config.storage_path, cache_entries)?,
        })
    }

    /// Settles a detected fork at `height` on `canonical_hash`: prunes the
    /// synchronizer's competing candidate records and deletes the
    /// non-canonical block files from storage. Returns the number of
    /// on-disk fork-candidate files removed.
    pub fn resolve_fork(&mut self, height: u32, canonical_hash: meshchain_crypto::Hash32) -> Result<usize> {
        self.synchronizer.resolve_fork(height, *canonical_hash.as_bytes());
        Ok(self.storage.prune_fork_candidates(height, canonical_hash)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshchain_core::NodeId;
    use meshchain_crypto::sha256;

    #[test]
    fn open_creates_storage_directories_and_empty_components() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = NodeConfig::new(NodeId::from_bytes([1; 8]), "n1");
        config.storage_path = dir.path().to_string_lossy().to_string();

        let components = Components::open(&config, 16).unwrap();
        assert_eq!(components.mempool.count(), 0);
        assert_eq!(components.peers.len(), 0);
        assert!(dir.path().join("blocks").is_dir());
    }

    #[test]
    fn resolve_fork_prunes_storage_and_records_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = NodeConfig::new(NodeId::from_bytes([1; 8]), "n1");
        config.storage_path = dir.path().to_string_lossy().to_string();
        let mut components = Components::open(&config, 16).unwrap();

        let h1 = b"canonical block".to_vec();
        let h1_hash = sha256(&h1);
        let h2 = b"orphaned fork block".to_vec();
        let h2_hash = sha256(&h2);
        components.storage.add_fork_candidate(10, h1_hash, &h1).unwrap();
        components.storage.add_fork_candidate(10, h2_hash, &h2).unwrap();
        components.synchronizer.detect_fork(10, *h1_hash.as_bytes(), "P1");
        components.synchronizer.detect_fork(10, *h2_hash.as_bytes(), "P2");

        let removed = components.resolve_fork(10, h1_hash).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(components.synchronizer.stats.forks_resolved, 1);
        assert_eq!(components.synchronizer.fork_candidates_at(10), vec![*h1_hash.as_bytes()]);
    }
}
