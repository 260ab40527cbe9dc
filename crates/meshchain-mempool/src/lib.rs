//! Pending-transaction pool with fee-rate eviction.

pub mod entry;
pub mod mempool;

pub use entry::MempoolEntry;
pub use mempool::{Mempool, MempoolStats, DEFAULT_MAX_BYTES, DEFAULT_MAX_COUNT, DEFAULT_STALE_AGE_SECONDS};
