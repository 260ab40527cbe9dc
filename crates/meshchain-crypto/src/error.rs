use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid hash length: expected {expected}, got {actual}")]
    InvalidHashLength { expected: usize, actual: usize },

    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("signature verification failed")]
    InvalidSignature,

    #[error("sealed-box open failed: authentication tag mismatch")]
    SealOpenFailed,

    #[error("PIN must be between {min} and {max} digits")]
    InvalidPinLength { min: u8, max: u8 },

    #[error("PIN must contain only ASCII digits")]
    PinNotNumeric,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
