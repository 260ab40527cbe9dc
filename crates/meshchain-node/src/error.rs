use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("message queue is full")]
    QueueFull,
    #[error("task id already scheduled: {0}")]
    DuplicateTask(String),
    #[error("storage error: {0}")]
    Storage(#[from] meshchain_storage::StorageError),
    #[error("wallet error: {0}")]
    Wallet(#[from] meshchain_wallet::WalletError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NodeError>;
