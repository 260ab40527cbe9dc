//! Peer table and sync/broadcast peer selection.

use std::collections::HashMap;

use meshchain_core::{BlockHeight, NodeId};
use rand::Rng;

use crate::reputation::Reputation;

pub const DEFAULT_MAX_PEERS: usize = 100;
pub const DEFAULT_PEER_TIMEOUT_SECONDS: f64 = 300.0;

#[derive(Debug, Clone)]
pub struct PeerInfo {
    pub node_id: NodeId,
    pub last_seen: f64,
    pub block_height: BlockHeight,
    pub stake: u64,
    pub hop_distance: u8,
    pub is_validator: bool,
    pub messages_received: u64,
    pub blocks_received: u64,
    pub transactions_received: u64,
    pub sync_count: u64,
    pub avg_latency_ms: f64,
}

impl PeerInfo {
    pub fn new(node_id: NodeId, now: f64) -> Self {
        Self {
            node_id,
            last_seen: now,
            block_height: 0,
            stake: 0,
            hop_distance: 1,
            is_validator: false,
            messages_received: 0,
            blocks_received: 0,
            transactions_received: 0,
            sync_count: 0,
            avg_latency_ms: 0.0,
        }
    }

    pub fn is_stale(&self, now: f64, timeout: f64) -> bool {
        now - self.last_seen > timeout
    }

    /// Running average over successful syncs.
    pub fn record_sync_latency(&mut self, latency_ms: f64) {
        let n = self.sync_count as f64;
        self.avg_latency_ms = (self.avg_latency_ms * n + latency_ms) / (n + 1.0);
        self.sync_count += 1;
    }
}

pub struct PeerManager {
    peers: HashMap<NodeId, PeerInfo>,
    reputations: HashMap<NodeId, Reputation>,
    max_peers: usize,
}

impl PeerManager {
    pub fn new(max_peers: usize) -> Self {
        Self {
            peers: HashMap::new(),
            reputations: HashMap::new(),
            max_peers,
        }
    }

    /// Inserts or refreshes a peer. On overflow, evicts the peer with the
    /// oldest `last_seen` before inserting.
    pub fn upsert(&mut self, node_id: NodeId, now: f64) -> &mut PeerInfo {
        if !self.peers.contains_key(&node_id) && self.peers.len() >= self.max_peers {
            if let Some(oldest) = self.peers.values().min_by(|a, b| a.last_seen.total_cmp(&b.last_seen)).map(|p| p.node_id) {
                self.peers.remove(&oldest);
                self.reputations.remove(&oldest);
            }
        }
        self.reputations.entry(node_id).or_insert_with(|| Reputation::new(now));
        self.peers.entry(node_id).or_insert_with(|| PeerInfo::new(node_id, now))
    }

    pub fn get(&self, node_id: &NodeId) -> Option<&PeerInfo> {
        self.peers.get(node_id)
    }

    pub fn reputation_mut(&mut self, node_id: &NodeId) -> Option<&mut Reputation> {
        self.reputations.get_mut(node_id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn purge_stale(&mut self, now: f64, timeout: f64) -> usize {
        let stale: Vec<NodeId> = self
            .peers
            .values()
            .filter(|p| p.is_stale(now, timeout))
            .map(|p| p.node_id)
            .collect();
        for id in &stale {
            self.peers.remove(id);
            self.reputations.remove(id);
        }
        stale.len()
    }

    /// `score = 0.5 * trust + 0.3 * (height / max_height) + 0.2 * (1 -
    /// latency / max_latency)`, weighted-random among Fair-or-better
    /// candidates; falls back to a uniform pick when every candidate has
    /// zero weight.
    pub fn select_peer_for_sync<R: Rng>(&mut self, exclude: &[NodeId], now: f64, rng: &mut R) -> Option<NodeId> {
        let max_height = self.peers.values().map(|p| p.block_height).max().unwrap_or(0).max(1) as f64;
        let max_latency = self
            .peers
            .values()
            .map(|p| p.avg_latency_ms)
            .fold(0.0_f64, f64::max)
            .max(1.0);

        let mut candidates: Vec<(NodeId, f64)> = Vec::new();
        let node_ids: Vec<NodeId> = self.peers.keys().copied().collect();
        for id in node_ids {
            if exclude.contains(&id) {
                continue;
            }
            let trust = self.reputations.get_mut(&id).map(|r| r.trustworthiness(now)).unwrap_or(0.0);
            if trust < 0.5 {
                continue;
            }
            let peer = &self.peers[&id];
            let latency_term = 1.0 - (peer.avg_latency_ms / max_latency).min(1.0);
            let weight = 0.5 * trust + 0.3 * (peer.block_height as f64 / max_height) + 0.2 * latency_term;
            candidates.push((id, weight.max(0.0)));
        }

        if candidates.is_empty() {
            return None;
        }

        let total: f64 = candidates.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            let idx = rng.gen_range(0..candidates.len());
            return Some(candidates[idx].0);
        }

        let mut draw = rng.gen_range(0.0..total);
        for (id, weight) in &candidates {
            if draw < *weight {
                return Some(*id);
            }
            draw -= weight;
        }
        candidates.last().map(|(id, _)| *id)
    }

    /// Top-`k` by trustworthiness among active, non-excluded peers.
    pub fn select_peers_for_broadcast(&mut self, k: usize, exclude: &[NodeId], now: f64) -> Vec<NodeId> {
        let mut scored: Vec<(NodeId, f64)> = self
            .peers
            .keys()
            .filter(|id| !exclude.contains(id))
            .map(|id| {
                let trust = self.reputations.get_mut(id).map(|r| r.trustworthiness(now)).unwrap_or(0.0);
                (*id, trust)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        scored.into_iter().map(|(id, _)| id).collect()
    }
}

impl Default for PeerManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PEERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn node(id: u8) -> NodeId {
        NodeId::from_bytes([id; 8])
    }

    #[test]
    fn overflow_evicts_oldest_last_seen() {
        let mut mgr = PeerManager::new(2);
        mgr.upsert(node(1), 10.0);
        mgr.upsert(node(2), 20.0);
        mgr.upsert(node(3), 30.0);
        assert_eq!(mgr.len(), 2);
        assert!(mgr.get(&node(1)).is_none());
    }

    #[test]
    fn purge_stale_removes_peers_past_timeout() {
        let mut mgr = PeerManager::new(10);
        mgr.upsert(node(1), 0.0);
        mgr.upsert(node(2), 290.0);
        let removed = mgr.purge_stale(300.0, DEFAULT_PEER_TIMEOUT_SECONDS);
        assert_eq!(removed, 1);
        assert!(mgr.get(&node(1)).is_none());
        assert!(mgr.get(&node(2)).is_some());
    }

    #[test]
    fn select_peer_for_sync_excludes_low_trust_peers() {
        let mut mgr = PeerManager::new(10);
        mgr.upsert(node(1), 0.0);
        mgr.reputation_mut(&node(1)).unwrap().add_event(0.0, crate::reputation::ReputationEvent::InvalidBlock);
        mgr.upsert(node(2), 0.0);

        let mut rng = StepRng::new(0, 1);
        let picked = mgr.select_peer_for_sync(&[], 0.0, &mut rng);
        assert_eq!(picked, Some(node(2)));
    }

    #[test]
    fn select_peers_for_broadcast_orders_by_trust() {
        let mut mgr = PeerManager::new(10);
        mgr.upsert(node(1), 0.0);
        mgr.upsert(node(2), 0.0);
        mgr.reputation_mut(&node(2)).unwrap().add_event(0.0, crate::reputation::ReputationEvent::ValidBlock);

        let top = mgr.select_peers_for_broadcast(1, &[], 0.0);
        assert_eq!(top, vec![node(2)]);
    }
}
