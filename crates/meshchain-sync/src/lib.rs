//! Catch-up synchronizer, fork detection, and longest-finalized-chain
//! reorg resolution.

pub mod synchronizer;

pub use synchronizer::{choose_canonical_tip, ChainTip, SyncState, SyncStats, Synchronizer};
