//! Node configuration: `node_id`/`role`/`stake`/storage-path profile for
//! a single mesh node, persisted as JSON.

use serde::{Deserialize, Serialize};

use meshchain_core::{Amount, NodeId};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Validator,
    Relay,
    Light,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub node_id: NodeId,
    pub node_name: String,
    pub role: Role,
    pub stake: Amount,
    pub storage_path: String,
    pub wallet_path: String,
    pub max_peers: usize,
    pub max_block_size: usize,
    pub block_time_seconds: f64,
    pub sync_timeout_seconds: f64,
}

impl NodeConfig {
    pub fn new(node_id: NodeId, node_name: impl Into<String>) -> Self {
        Self {
            node_id,
            node_name: node_name.into(),
            role: Role::Relay,
            stake: 0,
            storage_path: "./meshchain/blockchain".to_string(),
            wallet_path: "./meshchain/wallets".to_string(),
            max_peers: 20,
            max_block_size: 1024,
            block_time_seconds: 10.0,
            sync_timeout_seconds: 300.0,
        }
    }

    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.json");
        let config = NodeConfig::new(NodeId::from_bytes([3; 8]), "relay-1");
        config.save_to_file(&path).unwrap();

        let loaded = NodeConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.node_name, "relay-1");
        assert_eq!(loaded.role, Role::Relay);
    }
}
