use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet not found: {0}")]
    NotFound(String),
    #[error("wallet already exists: {0}")]
    AlreadyExists(String),
    #[error("pin locked for {remaining_seconds} more seconds")]
    Locked { remaining_seconds: i64 },
    #[error("invalid pin, {remaining_attempts} attempts remaining")]
    InvalidPin { remaining_attempts: u32 },
    #[error("pin locked due to too many failed attempts")]
    LockedOut,
    #[error("wallet is locked")]
    NotUnlocked,
    #[error("crypto error: {0}")]
    Crypto(#[from] meshchain_crypto::CryptoError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Storage(#[from] meshchain_storage::StorageError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("corrupt key record: {0}")]
    CorruptRecord(String),
}

pub type Result<T> = std::result::Result<T, WalletError>;
