//! A single pending transaction as held by the mempool.

use meshchain_core::NodeId;
use meshchain_crypto::Hash16;

#[derive(Debug, Clone)]
pub struct MempoolEntry {
    pub tx_id: Hash16,
    pub tx_bytes: Vec<u8>,
    pub size: usize,
    pub fee: u8,
    pub received_from: Option<NodeId>,
    pub enqueue_time: i64,
}

impl MempoolEntry {
    pub fn new(tx_id: Hash16, tx_bytes: Vec<u8>, fee: u8, received_from: Option<NodeId>, enqueue_time: i64) -> Self {
        let size = tx_bytes.len();
        Self {
            tx_id,
            tx_bytes,
            size,
            fee,
            received_from,
            enqueue_time,
        }
    }

    pub fn fee_rate(&self) -> f64 {
        if self.size == 0 {
            0.0
        } else {
            self.fee as f64 / self.size as f64
        }
    }

    pub fn is_stale(&self, now: i64, age_seconds: i64) -> bool {
        now - self.enqueue_time > age_seconds
    }
}

/// Cross-multiplied comparison of two fee rates without floating point,
/// so ties and orderings are exact regardless of `size`.
pub(crate) fn fee_rate_cmp(a: &MempoolEntry, b: &MempoolEntry) -> std::cmp::Ordering {
    let lhs = a.fee as u64 * b.size.max(1) as u64;
    let rhs = b.fee as u64 * a.size.max(1) as u64;
    lhs.cmp(&rhs)
}
