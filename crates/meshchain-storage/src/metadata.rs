//! On-disk JSON schemas.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockMetadata {
    pub height: u32,
    pub block_hash: String,
    pub timestamp: i64,
    pub size: usize,
    pub tx_count: u32,
    pub previous_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionIndex {
    pub tx_hash: String,
    pub block_height: u32,
    pub timestamp: i64,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    pub latest_block_height: i64,
    pub timestamp: i64,
    pub version: String,
    pub integrity_check_timestamp: i64,
}

impl StateFile {
    pub const CURRENT_VERSION: &'static str = "1.0";

    pub fn new(latest_block_height: i64, now: i64) -> Self {
        Self {
            latest_block_height,
            timestamp: now,
            version: Self::CURRENT_VERSION.to_string(),
            integrity_check_timestamp: now,
        }
    }
}
