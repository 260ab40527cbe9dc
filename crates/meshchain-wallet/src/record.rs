use serde::{Deserialize, Serialize};

pub const MAX_PIN_ATTEMPTS: u32 = 3;
pub const PIN_LOCK_DURATION_SECONDS: i64 = 300;
pub const CURRENT_VERSION: &str = "1.0";

/// `wallets/{id}.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub wallet_id: String,
    pub name: String,
    pub pin_hash: String,
    pub pin_salt: String,
    pub created_at: i64,
    pub last_accessed: i64,
    pub version: String,
    pub pin_attempts: u32,
    pub pin_locked_until: i64,
}

/// `keys/{id}_{key_id}.json`. `encrypted_private` is the hex-encoded
/// concatenation of the ChaCha20-Poly1305 nonce (12 bytes) and ciphertext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletKeyRecord {
    pub key_id: String,
    pub public_key: String,
    pub encrypted_private: String,
    pub key_type: String,
    pub created_at: i64,
}

impl WalletKeyRecord {
    pub const DEFAULT_KEY_ID: &'static str = "default";
    pub const KEY_TYPE_ED25519: &'static str = "ed25519";
}
