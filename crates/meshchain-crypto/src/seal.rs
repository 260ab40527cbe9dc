//! Amount confidentiality: an X25519 sealed-box over an 8-byte
//! little-endian amount, and a compact keystream cipher used on the wire.
//!
//! The general sealed-box ([`seal`]/[`open`]) is the full construction:
//! ephemeral X25519 key agreement feeding a ChaCha20-Poly1305 AEAD. It's
//! used wherever a full 24-byte authenticated ciphertext can be carried.
//!
//! On the wire, `Transaction::amount_encrypted` is a fixed 8-byte field
//! — too small for an ephemeral key, nonce, and AEAD tag. Rather
//! than discard authentication or balloon the wire format, the compact
//! form ([`amount_keystream_cipher`]) derives its key from the stealth
//! one-time key already carried in the transaction (see `meshchain-core`'s
//! `Transaction::stealth_address`/ring fields) and XORs the amount against
//! a ChaCha20 keystream — confidentiality without re-transmitting key
//! material, at the cost of the 8-byte field being unauthenticated on its
//! own (the transaction signature still covers it). This tradeoff is
//! recorded as a resolved open question in DESIGN.md.

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey, StaticSecret};

use crate::error::{CryptoError, Result};

pub const AMOUNT_LEN: usize = 8;

/// A full sealed-box ciphertext: ephemeral public key + nonce + AEAD output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedAmount {
    pub ephemeral_public: [u8; 32],
    pub nonce: [u8; 12],
    pub ciphertext: Vec<u8>,
}

fn derive_aead_key(shared_secret: &x25519_dalek::SharedSecret) -> Key {
    let digest = crate::hash::sha256(shared_secret.as_bytes());
    Key::clone_from_slice(digest.as_bytes())
}

/// Encrypt `amount` (as 8 little-endian bytes) to `recipient_public` using
/// an ephemeral X25519 key and ChaCha20-Poly1305.
pub fn seal(recipient_public: &[u8; 32], amount: u64) -> SealedAmount {
    let recipient = X25519PublicKey::from(*recipient_public);
    let ephemeral_secret = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = X25519PublicKey::from(&ephemeral_secret);
    let shared = ephemeral_secret.diffie_hellman(&recipient);
    let key = derive_aead_key(&shared);

    let mut nonce_bytes = [0u8; 12];
    OsRng.fill_bytes(&mut nonce_bytes);

    let cipher = ChaCha20Poly1305::new(&key);
    let plaintext = amount.to_le_bytes();
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_ref())
        .expect("encryption over a fixed-size buffer cannot fail");

    SealedAmount {
        ephemeral_public: ephemeral_public.to_bytes(),
        nonce: nonce_bytes,
        ciphertext,
    }
}

/// Decrypt a [`SealedAmount`] using the recipient's static X25519 secret.
pub fn open(recipient_secret: &[u8; 32], sealed: &SealedAmount) -> Result<u64> {
    let secret = StaticSecret::from(*recipient_secret);
    let ephemeral_public = X25519PublicKey::from(sealed.ephemeral_public);
    let shared = secret.diffie_hellman(&ephemeral_public);
    let key = derive_aead_key(&shared);

    let cipher = ChaCha20Poly1305::new(&key);
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_ref())
        .map_err(|_| CryptoError::SealOpenFailed)?;

    if plaintext.len() != AMOUNT_LEN {
        return Err(CryptoError::SealOpenFailed);
    }
    let mut bytes = [0u8; AMOUNT_LEN];
    bytes.copy_from_slice(&plaintext);
    Ok(u64::from_le_bytes(bytes))
}

/// Compact wire form: XOR `amount` against the first 8 bytes of a ChaCha20
/// keystream keyed by `shared_key`. Used for `Transaction::amount_encrypted`
/// where the fixed 8-byte field leaves no room for a nonce or AEAD tag; the
/// transaction's own Ed25519 signature is what authenticates this field.
pub fn amount_keystream_cipher(shared_key: &[u8; 32], nonce: &[u8; 12], amount: u64) -> [u8; AMOUNT_LEN] {
    let mut block = amount.to_le_bytes();
    let mut cipher = ChaCha20::new(shared_key.into(), nonce.into());
    cipher.apply_keystream(&mut block);
    block
}

/// Symmetric with [`amount_keystream_cipher`]: XOR is its own inverse.
pub fn amount_keystream_decipher(shared_key: &[u8; 32], nonce: &[u8; 12], encrypted: [u8; AMOUNT_LEN]) -> u64 {
    let mut block = encrypted;
    let mut cipher = ChaCha20::new(shared_key.into(), nonce.into());
    cipher.apply_keystream(&mut block);
    u64::from_le_bytes(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealed_box_roundtrip() {
        let recipient_secret = StaticSecret::random_from_rng(OsRng);
        let recipient_public = X25519PublicKey::from(&recipient_secret);

        let sealed = seal(&recipient_public.to_bytes(), 42_000);
        let opened = open(&recipient_secret.to_bytes(), &sealed).unwrap();
        assert_eq!(opened, 42_000);
    }

    #[test]
    fn sealed_box_rejects_wrong_key() {
        let recipient_secret = StaticSecret::random_from_rng(OsRng);
        let recipient_public = X25519PublicKey::from(&recipient_secret);
        let other_secret = StaticSecret::random_from_rng(OsRng);

        let sealed = seal(&recipient_public.to_bytes(), 7);
        assert!(open(&other_secret.to_bytes(), &sealed).is_err());
    }

    #[test]
    fn keystream_cipher_roundtrip() {
        let key = [9u8; 32];
        let nonce = [1u8; 12];
        let enc = amount_keystream_cipher(&key, &nonce, 123_456);
        let dec = amount_keystream_decipher(&key, &nonce, enc);
        assert_eq!(dec, 123_456);
    }
}
