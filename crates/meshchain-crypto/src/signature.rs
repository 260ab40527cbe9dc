//! Ed25519 signing and verification: 32-byte public key,
//! 32-byte secret seed, 64-byte signature.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{CryptoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self(bytes))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    fn verifying_key(&self) -> VerifyingKey {
        // Constructed only from a validated `from_bytes`/keypair path, so
        // this can't fail.
        VerifyingKey::from_bytes(&self.0).expect("public key bytes validated at construction")
    }

    /// Verify `signature` over `message`. Never panics on malformed input;
    /// any failure (bad signature shape, wrong key, tampered message)
    /// simply returns `false`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        self.verifying_key().verify(message, &sig).is_ok()
    }
}

/// A 32-byte Ed25519 signing seed. Zeroized on drop since it is secret
/// material; never serialized directly (wallet storage goes through the
/// sealed keystore, not this type).
#[derive(Clone)]
pub struct SecretKey(SigningKey);

impl Drop for SecretKey {
    fn drop(&mut self) {
        // ed25519-dalek's SigningKey does not itself zeroize on drop
        // reliably across versions, so scrub the seed copy we can reach.
        let mut seed = self.0.to_bytes();
        seed.zeroize();
    }
}

impl SecretKey {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self(SigningKey::from_bytes(&seed))
    }

    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut OsRng))
    }

    pub fn to_seed_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.0.sign(message).to_bytes())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature([u8; 64]);

impl Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != 64 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 64,
                actual: slice.len(),
            });
        }
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        self.0
    }
}

/// Convenience pair used by the wallet and by test fixtures elsewhere in
/// the workspace.
pub struct Keypair {
    pub secret: SecretKey,
    pub public: PublicKey,
}

impl Keypair {
    pub fn generate() -> Self {
        let secret = SecretKey::generate();
        let public = secret.public_key();
        Self { secret, public }
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        let secret = SecretKey::from_seed(seed);
        let public = secret.public_key();
        Self { secret, public }
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.secret.sign(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_succeeds() {
        let kp = Keypair::generate();
        let msg = b"mesh transaction payload";
        let sig = kp.sign(msg);
        assert!(kp.public.verify(msg, &sig));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::generate();
        let sig = kp1.sign(b"message");
        assert!(!kp2.public.verify(b"message", &sig));
    }

    #[test]
    fn tampered_message_fails_verification() {
        let kp = Keypair::generate();
        let sig = kp.sign(b"original");
        assert!(!kp.public.verify(b"tampered", &sig));
    }

    #[test]
    fn malformed_signature_never_panics() {
        let kp = Keypair::generate();
        let bogus = Signature::from_bytes([0u8; 64]);
        assert!(!kp.public.verify(b"message", &bogus));
    }
}
