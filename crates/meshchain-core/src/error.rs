use thiserror::Error;

/// Chain-level fault taxonomy. Codec-level faults stay inside
/// `meshchain-codec::CodecError`; these are the ones the data model and
/// its callers (validation, storage, sync) reason about.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("invalid transaction: {reason}")]
    InvalidTransaction { reason: String },

    #[error("invalid block: {reason}")]
    InvalidBlock { reason: String },

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid hash")]
    InvalidHash,

    #[error("merkle root mismatch")]
    MerkleMismatch,

    #[error("chain continuity broken at height {height}")]
    ChainBreak { height: u32 },
}

pub type Result<T> = std::result::Result<T, ChainError>;

impl From<meshchain_codec::CodecError> for ChainError {
    fn from(e: meshchain_codec::CodecError) -> Self {
        ChainError::MalformedFrame(e.to_string())
    }
}
