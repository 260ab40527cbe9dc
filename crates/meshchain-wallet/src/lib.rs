//! PIN-secured wallet keystore: Ed25519 key custody, constant-time PIN
//! verification with lockout, and signing while unlocked.

pub mod error;
pub mod keystore;
pub mod record;

pub use error::{Result, WalletError};
pub use keystore::Wallet;
pub use record::{WalletConfig, WalletKeyRecord};
