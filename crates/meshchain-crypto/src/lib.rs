//! Cryptographic primitives for MeshChain: Ed25519 signing, SHA-256
//! hashing (full and truncated), merkle roots, sealed-box amount
//! confidentiality, Argon2 PIN key derivation, stealth addresses, and a
//! pluggable ring-signature extension point.

pub mod error;
pub mod hash;
pub mod keybox;
pub mod merkle;
pub mod pin_kdf;
pub mod ring;
pub mod seal;
pub mod signature;
pub mod stealth;

pub use error::{CryptoError, Result};
pub use hash::{sha256, sha256_16, Hash16, Hash32};
pub use merkle::merkle_root;
pub use signature::{Keypair, PublicKey, SecretKey, Signature};
