//! SHA-256, exposed as full 32-byte and truncated 16-byte variants.
//!
//! The truncated form is what identifies transactions and blocks on the
//! wire and in storage; the full form backs the stealth-address
//! and sealed-box constructions in [`crate::stealth`] and [`crate::seal`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{CryptoError, Result};

/// Full 256-bit SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash32([u8; 32]);

impl Hash32 {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != 32 {
            return Err(CryptoError::InvalidHashLength {
                expected: 32,
                actual: slice.len(),
            });
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn truncate16(&self) -> Hash16 {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&self.0[..16]);
        Hash16(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Truncated (first 16 bytes of) SHA-256, used for block/transaction ids
/// and merkle nodes.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Hash16([u8; 16]);

impl Hash16 {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != 16 {
            return Err(CryptoError::InvalidHashLength {
                expected: 16,
                actual: slice.len(),
            });
        }
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    pub fn zero() -> Self {
        Self([0u8; 16])
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Hash16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Hash16 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Full SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest: [u8; 32] = hasher.finalize().into();
    Hash32(digest)
}

/// SHA-256 of `data`, truncated to the first 16 bytes. This is the id
/// function used throughout the chain data model.
pub fn sha256_16(data: &[u8]) -> Hash16 {
    sha256(data).truncate16()
}

/// Merkle pair-hash: `sha256_16(left ‖ right)`, the building block of
/// [`crate::merkle::merkle_root`].
pub fn hash_pair(left: &Hash16, right: &Hash16) -> Hash16 {
    let mut combined = Vec::with_capacity(32);
    combined.extend_from_slice(left.as_bytes());
    combined.extend_from_slice(right.as_bytes());
    sha256_16(&combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_keeps_first_16_bytes() {
        let full = sha256(b"hello mesh");
        let trunc = full.truncate16();
        assert_eq!(trunc.as_bytes(), &full.as_bytes()[..16]);
    }

    #[test]
    fn hex_roundtrip() {
        let h = sha256_16(b"round trip");
        let restored = Hash16::from_hex(&h.to_hex()).unwrap();
        assert_eq!(h, restored);
    }

    #[test]
    fn empty_input_hash_is_stable() {
        // sha256("") is a well-known constant; pin it so a future hasher
        // swap can't silently change block-identity semantics.
        let h = sha256(b"");
        assert_eq!(
            h.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }
}
