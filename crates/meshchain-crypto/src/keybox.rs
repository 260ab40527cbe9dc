//! Symmetric key-at-rest encryption: ChaCha20-Poly1305 under a caller-
//! supplied 32-byte key, random nonce. Used to encrypt the wallet
//! keystore's secret seed at rest. This
//! is distinct from [`crate::seal`]'s ephemeral-X25519 sealed box — here
//! the key is already known to both sides (derived from a PIN), so no
//! key agreement step is needed.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;

use crate::error::{CryptoError, Result};

pub struct Encrypted {
    pub nonce: [u8; 12],
    pub ciphertext: Vec<u8>,
}

pub fn encrypt(key: &[u8; 32], plaintext: &[u8]) -> Encrypted {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let mut nonce_bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .expect("chacha20poly1305 encryption is infallible for valid key/nonce lengths");
    Encrypted {
        nonce: nonce_bytes,
        ciphertext,
    }
}

pub fn decrypt(key: &[u8; 32], nonce: &[u8; 12], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::SealOpenFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let key = [7u8; 32];
        let plaintext = b"a 32-byte ed25519 secret seed!!";
        let enc = encrypt(&key, plaintext);
        let decrypted = decrypt(&key, &enc.nonce, &enc.ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let enc = encrypt(&[1u8; 32], b"secret");
        assert!(decrypt(&[2u8; 32], &enc.nonce, &enc.ciphertext).is_err());
    }
}
