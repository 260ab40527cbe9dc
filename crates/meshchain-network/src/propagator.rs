//! Priority fan-out queues, per-peer rate limiting, and block
//! re-broadcast dedup.

use std::collections::{HashMap, HashSet, VecDeque};

use meshchain_core::NodeId;
use meshchain_crypto::Hash16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Critical,
    High,
    Normal,
    Low,
}

const PRIORITIES: [Priority; 4] = [Priority::Critical, Priority::High, Priority::Normal, Priority::Low];

fn capacity_for(priority: Priority) -> usize {
    match priority {
        Priority::Critical => 50,
        Priority::High => 100,
        Priority::Normal => 200,
        Priority::Low => 100,
    }
}

/// Four strictly-ordered FIFO queues. `next()` always drains Critical
/// before High, High before Normal, Normal before Low — a sustained
/// Critical stream can starve the rest, which is intentional so
/// consensus traffic never waits behind gossip.
pub struct PriorityQueues {
    queues: HashMap<Priority, VecDeque<Vec<u8>>>,
    pub dropped: u64,
}

impl PriorityQueues {
    pub fn new() -> Self {
        let mut queues = HashMap::new();
        for p in PRIORITIES {
            queues.insert(p, VecDeque::new());
        }
        Self { queues, dropped: 0 }
    }

    pub fn queue(&mut self, msg: Vec<u8>, priority: Priority) -> bool {
        let q = self.queues.get_mut(&priority).expect("all priorities initialized");
        if q.len() >= capacity_for(priority) {
            self.dropped += 1;
            return false;
        }
        q.push_back(msg);
        true
    }

    pub fn next(&mut self) -> Option<Vec<u8>> {
        for p in PRIORITIES {
            if let Some(msg) = self.queues.get_mut(&p).and_then(|q| q.pop_front()) {
                return Some(msg);
            }
        }
        None
    }

    pub fn len(&self, priority: Priority) -> usize {
        self.queues.get(&priority).map(|q| q.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.queues.values().all(|q| q.is_empty())
    }
}

impl Default for PriorityQueues {
    fn default() -> Self {
        Self::new()
    }
}

/// Token bucket per peer: refills atomically when the window has
/// elapsed, otherwise rejects once the counter reaches `limit`.
pub struct RateLimiter {
    limit: u32,
    window_seconds: f64,
    buckets: HashMap<NodeId, (u32, f64)>,
    pub rate_limited: u64,
}

impl RateLimiter {
    pub fn new(limit: u32, window_seconds: f64) -> Self {
        Self {
            limit,
            window_seconds,
            buckets: HashMap::new(),
            rate_limited: 0,
        }
    }

    pub fn check_rate_limit(&mut self, peer_id: NodeId, now: f64) -> bool {
        let entry = self.buckets.entry(peer_id).or_insert((0, now));
        if now - entry.1 >= self.window_seconds {
            entry.0 = 0;
            entry.1 = now;
        }
        if entry.0 >= self.limit {
            self.rate_limited += 1;
            return false;
        }
        entry.0 += 1;
        true
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(10, 60.0)
    }
}

/// Tracks block hashes this node has already emitted, so a block heard
/// back from the network it originated isn't re-flooded. Independent of
/// the router's message-hash dedup.
#[derive(Default)]
pub struct BlockPropagator {
    seen_blocks: HashSet<Hash16>,
}

impl BlockPropagator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_emitted(&mut self, block_hash: Hash16) {
        self.seen_blocks.insert(block_hash);
    }

    pub fn already_seen(&self, block_hash: &Hash16) -> bool {
        self.seen_blocks.contains(block_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u8) -> NodeId {
        NodeId::from_bytes([id; 8])
    }

    #[test]
    fn next_drains_critical_before_lower_priorities() {
        let mut queues = PriorityQueues::new();
        queues.queue(b"low".to_vec(), Priority::Low);
        queues.queue(b"critical".to_vec(), Priority::Critical);
        assert_eq!(queues.next(), Some(b"critical".to_vec()));
        assert_eq!(queues.next(), Some(b"low".to_vec()));
    }

    #[test]
    fn full_queue_drops_and_counts_without_cross_priority_eviction() {
        let mut queues = PriorityQueues::new();
        for _ in 0..50 {
            assert!(queues.queue(vec![0], Priority::Critical));
        }
        assert!(!queues.queue(vec![0], Priority::Critical));
        assert_eq!(queues.dropped, 1);
        assert_eq!(queues.len(Priority::Critical), 50);
    }

    #[test]
    fn rate_limiter_refills_after_window() {
        let mut limiter = RateLimiter::new(2, 60.0);
        let peer = node(1);
        assert!(limiter.check_rate_limit(peer, 0.0));
        assert!(limiter.check_rate_limit(peer, 0.0));
        assert!(!limiter.check_rate_limit(peer, 0.0));
        assert_eq!(limiter.rate_limited, 1);
        assert!(limiter.check_rate_limit(peer, 61.0));
    }

    #[test]
    fn block_propagator_tracks_self_emitted_hashes() {
        let mut bp = BlockPropagator::new();
        let hash = Hash16::from_bytes([7; 16]);
        assert!(!bp.already_seen(&hash));
        bp.mark_emitted(hash);
        assert!(bp.already_seen(&hash));
    }
}
