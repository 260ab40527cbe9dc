use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("block data is empty")]
    EmptyBlock,
    #[error("block hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch { expected: String, computed: String },
    #[error("chain break at height {height}: previous_hash does not match block {prev_height}'s stored hash")]
    ChainBreak { height: u32, prev_height: u32 },
    #[error("block not found at height {0}")]
    BlockNotFound(u32),
    #[error("transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("referencing block {0} does not exist")]
    OrphanedTransaction(u32),
    #[error("stored data corrupted: {0}")]
    Corrupted(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
