//! Message dedup and broadcast flood control, keyed by
//! message hash and independent of block-level dedup in the propagator.

use std::collections::HashMap;

use meshchain_core::NodeId;
use meshchain_crypto::Hash16;

pub const DEFAULT_MESSAGE_TIMEOUT_SECONDS: f64 = 60.0;
pub const DEFAULT_BROADCAST_CACHE_TTL_SECONDS: f64 = 300.0;
pub const DEFAULT_FLOOD_MIN_INTERVAL_SECONDS: f64 = 5.0;

struct SeenEntry {
    first_sender: NodeId,
    first_seen: f64,
}

pub struct Router {
    seen: HashMap<Hash16, SeenEntry>,
    broadcast_cache: HashMap<Hash16, f64>,
    message_timeout: f64,
    broadcast_cache_ttl: f64,
    pub duplicate_count: u64,
}

impl Router {
    pub fn new(message_timeout: f64, broadcast_cache_ttl: f64) -> Self {
        Self {
            seen: HashMap::new(),
            broadcast_cache: HashMap::new(),
            message_timeout,
            broadcast_cache_ttl,
            duplicate_count: 0,
        }
    }

    /// Returns `true` the first time `hash` is observed within the
    /// dedup window; subsequent identical receipts are dropped and
    /// counted.
    pub fn observe(&mut self, hash: Hash16, sender: NodeId, now: f64) -> bool {
        if let Some(entry) = self.seen.get(&hash) {
            if now - entry.first_seen <= self.message_timeout {
                self.duplicate_count += 1;
                return false;
            }
        }
        self.seen.insert(hash, SeenEntry { first_sender: sender, first_seen: now });
        true
    }

    pub fn first_sender(&self, hash: &Hash16) -> Option<NodeId> {
        self.seen.get(hash).map(|e| e.first_sender)
    }

    /// `true` iff `hash` has not been flooded within `flood_min_interval`
    /// of `now`; records the flood timestamp as a side effect when it
    /// returns `true`.
    pub fn should_broadcast_flood(&mut self, hash: Hash16, now: f64, flood_min_interval: f64) -> bool {
        let should = match self.broadcast_cache.get(&hash) {
            Some(last) => now - last >= flood_min_interval,
            None => true,
        };
        if should {
            self.broadcast_cache.insert(hash, now);
        }
        should
    }

    /// Purges seen-message and broadcast-cache entries past their
    /// respective TTLs, returning `(seen_purged, cache_purged)`.
    pub fn cleanup(&mut self, now: f64) -> (usize, usize) {
        let seen_before = self.seen.len();
        self.seen.retain(|_, entry| now - entry.first_seen <= self.message_timeout);
        let cache_before = self.broadcast_cache.len();
        self.broadcast_cache.retain(|_, last| now - *last <= self.broadcast_cache_ttl);
        (seen_before - self.seen.len(), cache_before - self.broadcast_cache.len())
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_TIMEOUT_SECONDS, DEFAULT_BROADCAST_CACHE_TTL_SECONDS)
    }
}
