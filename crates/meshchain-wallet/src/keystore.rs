//! PIN-secured embedded wallet: create/unlock/lock/sign over a single
//! Ed25519 keypair, backed by an atomic on-disk store.

use std::path::{Path, PathBuf};

use meshchain_crypto::keybox;
use meshchain_crypto::pin_kdf::{self, SALT_LEN};
use meshchain_crypto::signature::{PublicKey, SecretKey, Signature};
use meshchain_storage::atomic::write_atomic;

use crate::error::{Result, WalletError};
use crate::record::{WalletConfig, WalletKeyRecord, CURRENT_VERSION, MAX_PIN_ATTEMPTS, PIN_LOCK_DURATION_SECONDS};

pub struct Wallet {
    root: PathBuf,
    wallet_id: String,
    config: WalletConfig,
    unlocked_secret: Option<SecretKey>,
    public_key: PublicKey,
}

impl Wallet {
    fn wallet_path(root: &Path, wallet_id: &str) -> PathBuf {
        root.join("wallets").join(format!("{wallet_id}.json"))
    }

    fn key_path(root: &Path, wallet_id: &str, key_id: &str) -> PathBuf {
        root.join("keys").join(format!("{wallet_id}_{key_id}.json"))
    }

    fn save_config(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.config)?;
        write_atomic(&Self::wallet_path(&self.root, &self.wallet_id), &bytes)?;
        Ok(())
    }

    /// Creates a new wallet, generating a fresh Ed25519 keypair and
    /// encrypting its secret seed under a PIN-derived key. The wallet
    /// starts unlocked.
    pub fn create(root: impl Into<PathBuf>, wallet_id: &str, name: &str, pin: &str, now: i64) -> Result<Self> {
        let root = root.into();
        if Self::wallet_path(&root, wallet_id).exists() {
            return Err(WalletError::AlreadyExists(wallet_id.to_string()));
        }

        pin_kdf::validate_pin(pin)?;
        let salt: [u8; SALT_LEN] = pin_kdf::generate_salt();
        let material = pin_kdf::derive(pin, &salt)?;

        let secret = SecretKey::generate();
        let public_key = secret.public_key();
        let encrypted = keybox::encrypt(&material.encryption_key, &secret.to_seed_bytes());

        let mut encrypted_private = hex::encode(encrypted.nonce);
        encrypted_private.push_str(&hex::encode(&encrypted.ciphertext));

        let key_record = WalletKeyRecord {
            key_id: WalletKeyRecord::DEFAULT_KEY_ID.to_string(),
            public_key: public_key.to_hex(),
            encrypted_private,
            key_type: WalletKeyRecord::KEY_TYPE_ED25519.to_string(),
            created_at: now,
        };
        let key_bytes = serde_json::to_vec_pretty(&key_record)?;
        write_atomic(&Self::key_path(&root, wallet_id, WalletKeyRecord::DEFAULT_KEY_ID), &key_bytes)?;

        let config = WalletConfig {
            wallet_id: wallet_id.to_string(),
            name: name.to_string(),
            pin_hash: hex::encode(material.authenticator),
            pin_salt: hex::encode(salt),
            created_at: now,
            last_accessed: now,
            version: CURRENT_VERSION.to_string(),
            pin_attempts: 0,
            pin_locked_until: 0,
        };

        let wallet = Self {
            root,
            wallet_id: wallet_id.to_string(),
            config,
            unlocked_secret: Some(secret),
            public_key,
        };
        wallet.save_config()?;
        tracing::info!(wallet_id, "wallet created");
        Ok(wallet)
    }

    /// Loads a wallet's config and public key from disk without unlocking
    /// it. Call [`Wallet::unlock`] before signing.
    pub fn load(root: impl Into<PathBuf>, wallet_id: &str) -> Result<Self> {
        let root = root.into();
        let config_path = Self::wallet_path(&root, wallet_id);
        if !config_path.exists() {
            return Err(WalletError::NotFound(wallet_id.to_string()));
        }
        let config: WalletConfig = serde_json::from_slice(&std::fs::read(&config_path)?)?;
        let key_record = Self::read_key_record(&root, wallet_id)?;
        let public_key_bytes: [u8; 32] = hex::decode(&key_record.public_key)?
            .try_into()
            .map_err(|_| WalletError::CorruptRecord("public_key length".to_string()))?;
        let public_key = PublicKey::from_bytes(public_key_bytes)?;

        Ok(Self {
            root,
            wallet_id: wallet_id.to_string(),
            config,
            unlocked_secret: None,
            public_key,
        })
    }

    fn read_key_record(root: &Path, wallet_id: &str) -> Result<WalletKeyRecord> {
        let path = Self::key_path(root, wallet_id, WalletKeyRecord::DEFAULT_KEY_ID);
        Ok(serde_json::from_slice(&std::fs::read(path)?)?)
    }

    /// Rejects if currently locked out; verifies the PIN in constant time;
    /// on failure bumps `pin_attempts` and locks out at the configured
    /// threshold; on success decrypts the secret key into memory.
    pub fn unlock(&mut self, pin: &str, now: i64) -> Result<()> {
        if self.config.pin_locked_until > now {
            return Err(WalletError::Locked {
                remaining_seconds: self.config.pin_locked_until - now,
            });
        }

        let salt: [u8; SALT_LEN] = hex::decode(&self.config.pin_salt)?
            .try_into()
            .map_err(|_| WalletError::CorruptRecord("pin_salt length".to_string()))?;
        let stored: [u8; 32] = hex::decode(&self.config.pin_hash)?
            .try_into()
            .map_err(|_| WalletError::CorruptRecord("pin_hash length".to_string()))?;

        let material = pin_kdf::derive(pin, &salt)?;
        if !pin_kdf::verify_authenticator(&material.authenticator, &stored) {
            self.config.pin_attempts += 1;
            if self.config.pin_attempts >= MAX_PIN_ATTEMPTS {
                self.config.pin_locked_until = now + PIN_LOCK_DURATION_SECONDS;
                self.save_config()?;
                return Err(WalletError::LockedOut);
            }
            self.save_config()?;
            return Err(WalletError::InvalidPin {
                remaining_attempts: MAX_PIN_ATTEMPTS - self.config.pin_attempts,
            });
        }

        let key_record = Self::read_key_record(&self.root, &self.wallet_id)?;
        let raw = hex::decode(&key_record.encrypted_private)?;
        if raw.len() < 12 {
            return Err(WalletError::CorruptRecord("encrypted_private too short".to_string()));
        }
        let (nonce, ciphertext) = raw.split_at(12);
        let nonce: [u8; 12] = nonce.try_into().expect("split_at(12) yields a 12-byte prefix");
        let seed_bytes = keybox::decrypt(&material.encryption_key, &nonce, ciphertext)?;
        let seed: [u8; 32] = seed_bytes
            .try_into()
            .map_err(|_| WalletError::CorruptRecord("decrypted seed length".to_string()))?;
        let secret = SecretKey::from_seed(seed);

        self.config.pin_attempts = 0;
        self.config.last_accessed = now;
        self.save_config()?;
        self.unlocked_secret = Some(secret);
        tracing::info!(wallet_id = %self.wallet_id, "wallet unlocked");
        Ok(())
    }

    /// Zeroizes in-memory secret material (via `SecretKey`'s `Drop`).
    pub fn lock(&mut self) {
        self.unlocked_secret = None;
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked_secret.is_some()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Available only while unlocked; never exposes the secret key.
    pub fn sign(&self, message: &[u8]) -> Result<Signature> {
        match &self.unlocked_secret {
            Some(secret) => Ok(secret.sign(message)),
            None => Err(WalletError::NotUnlocked),
        }
    }
}
