//! Catch-up synchronizer state machine: collapses the richer five-state
//! design of an async `ChainSynchronizer`/`SyncProgress` down to the
//! three states `Idle -> Syncing -> {Synced | Error}`.

use std::collections::HashMap;

use meshchain_core::BlockHeight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Syncing,
    Synced,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    pub total_syncs: u64,
    pub successful_syncs: u64,
    pub failed_syncs: u64,
    pub total_sync_time: f64,
    pub avg_sync_time: f64,
    pub forks_detected: u64,
    pub forks_resolved: u64,
}

pub struct Synchronizer {
    pub state: SyncState,
    pub target_height: BlockHeight,
    pub blocks_synced: u64,
    pub blocks_remaining: u64,
    pub last_update: f64,
    start_time: f64,
    pub stats: SyncStats,
    /// height -> canonical block hash, as observed so far this session.
    known_hashes: HashMap<BlockHeight, [u8; 32]>,
    /// height -> every distinct (hash, source) pair reported for it.
    fork_candidates: HashMap<BlockHeight, Vec<([u8; 32], String)>>,
}

impl Synchronizer {
    pub fn new() -> Self {
        Self {
            state: SyncState::Idle,
            target_height: 0,
            blocks_synced: 0,
            blocks_remaining: 0,
            last_update: 0.0,
            start_time: 0.0,
            stats: SyncStats::default(),
            known_hashes: HashMap::new(),
            fork_candidates: HashMap::new(),
        }
    }

    /// Rejected if already `Syncing`. The target is whatever the caller
    /// decided (e.g. the max height among trustworthy peers).
    pub fn start_sync(&mut self, current_height: BlockHeight, target_height: BlockHeight, now: f64) -> bool {
        if self.state == SyncState::Syncing {
            return false;
        }
        self.state = SyncState::Syncing;
        self.target_height = target_height;
        self.blocks_synced = 0;
        self.blocks_remaining = target_height.saturating_sub(current_height) as u64;
        self.start_time = now;
        self.last_update = now;
        true
    }

    /// Records a received block during an active sync; auto-completes
    /// successfully once `blocks_remaining` hits zero.
    pub fn add_sync_block(&mut self, height: BlockHeight, hash: [u8; 32], now: f64) {
        if self.state != SyncState::Syncing {
            return;
        }
        if let Some(known) = self.known_hashes.get(&height) {
            if *known != hash {
                self.stats.forks_detected += 1;
            }
        } else {
            self.known_hashes.insert(height, hash);
        }

        self.blocks_synced += 1;
        self.blocks_remaining = self.blocks_remaining.saturating_sub(1);
        self.last_update = now;

        if self.blocks_remaining == 0 {
            self.complete_sync(true, now);
        }
    }

    pub fn complete_sync(&mut self, ok: bool, now: f64) {
        if self.state != SyncState::Syncing {
            return;
        }
        self.state = if ok { SyncState::Synced } else { SyncState::Error };
        self.stats.total_syncs += 1;
        if ok {
            self.stats.successful_syncs += 1;
        } else {
            self.stats.failed_syncs += 1;
        }
        self.stats.total_sync_time += now - self.start_time;
        self.stats.avg_sync_time = self.stats.total_sync_time / self.stats.total_syncs as f64;
    }

    pub fn is_syncing(&self) -> bool {
        self.state == SyncState::Syncing
    }

    /// Records that `source` reported `hash` as the block at `height`.
    /// Returns true once a second distinct hash shows up for that height;
    /// `forks_detected` increments the first time a height crosses that
    /// threshold, not on every subsequent conflicting report.
    pub fn detect_fork(&mut self, height: BlockHeight, hash: [u8; 32], source: impl Into<String>) -> bool {
        let candidates = self.fork_candidates.entry(height).or_default();
        let is_new_hash = !candidates.iter().any(|(h, _)| *h == hash);
        let was_already_forked = candidates.len() > 1;
        if is_new_hash {
            candidates.push((hash, source.into()));
        }
        let is_fork = candidates.len() > 1;
        if is_fork && !was_already_forked {
            self.stats.forks_detected += 1;
            tracing::warn!(height, total_forks_detected = self.stats.forks_detected, "fork detected");
        }
        is_fork
    }

    /// Prunes every candidate hash recorded at `height` other than
    /// `canonical_hash`, leaving just the canonical one on record. Returns
    /// true (and bumps `forks_resolved`) only if the height actually had
    /// more than one candidate to begin with.
    pub fn resolve_fork(&mut self, height: BlockHeight, canonical_hash: [u8; 32]) -> bool {
        let Some(candidates) = self.fork_candidates.get_mut(&height) else {
            return false;
        };
        let had_fork = candidates.len() > 1;
        candidates.retain(|(h, _)| *h == canonical_hash);
        if candidates.is_empty() {
            candidates.push((canonical_hash, String::new()));
        }
        if had_fork {
            self.stats.forks_resolved += 1;
            tracing::info!(height, total_forks_resolved = self.stats.forks_resolved, "fork resolved");
        }
        had_fork
    }

    /// Distinct hashes currently on record for `height`.
    pub fn fork_candidates_at(&self, height: BlockHeight) -> Vec<[u8; 32]> {
        self.fork_candidates
            .get(&height)
            .map(|candidates| candidates.iter().map(|(h, _)| *h).collect())
            .unwrap_or_default()
    }
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new()
    }
}

/// A competing chain tip as seen during reorg evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ChainTip {
    pub height: BlockHeight,
    pub finalized: bool,
    pub tip_hash: [u8; 32],
}

/// Prefers the longest chain whose tip is finalized; ties break toward
/// the lowest tip-hash.
pub fn choose_canonical_tip(candidates: &[ChainTip]) -> Option<ChainTip> {
    candidates
        .iter()
        .filter(|c| c.finalized)
        .copied()
        .max_by(|a, b| {
            a.height
                .cmp(&b.height)
                .then_with(|| b.tip_hash.cmp(&a.tip_hash))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_sync_rejected_while_already_syncing() {
        let mut sync = Synchronizer::new();
        assert!(sync.start_sync(0, 10, 0.0));
        assert!(!sync.start_sync(0, 20, 1.0));
    }

    #[test]
    fn add_sync_block_decrements_remaining_and_autocompletes() {
        let mut sync = Synchronizer::new();
        sync.start_sync(0, 2, 0.0);
        sync.add_sync_block(1, [1; 32], 1.0);
        assert_eq!(sync.state, SyncState::Syncing);
        sync.add_sync_block(2, [2; 32], 2.0);
        assert_eq!(sync.state, SyncState::Synced);
        assert_eq!(sync.stats.successful_syncs, 1);
    }

    #[test]
    fn complete_sync_updates_avg_sync_time() {
        let mut sync = Synchronizer::new();
        sync.start_sync(0, 5, 0.0);
        sync.complete_sync(true, 10.0);
        assert_eq!(sync.stats.total_sync_time, 10.0);
        assert_eq!(sync.stats.avg_sync_time, 10.0);
    }

    #[test]
    fn conflicting_hash_at_known_height_marks_fork() {
        let mut sync = Synchronizer::new();
        sync.start_sync(0, 2, 0.0);
        sync.add_sync_block(1, [1; 32], 1.0);
        sync.target_height = 3;
        sync.blocks_remaining = 1;
        sync.state = SyncState::Syncing;
        sync.add_sync_block(1, [9; 32], 2.0);
        assert_eq!(sync.stats.forks_detected, 1);
    }

    #[test]
    fn choose_canonical_tip_prefers_longest_finalized_chain() {
        let candidates = vec![
            ChainTip { height: 5, finalized: true, tip_hash: [1; 32] },
            ChainTip { height: 7, finalized: false, tip_hash: [2; 32] },
            ChainTip { height: 6, finalized: true, tip_hash: [3; 32] },
        ];
        let winner = choose_canonical_tip(&candidates).unwrap();
        assert_eq!(winner.height, 6);
    }

    #[test]
    fn choose_canonical_tip_breaks_ties_by_lowest_hash() {
        let candidates = vec![
            ChainTip { height: 5, finalized: true, tip_hash: [9; 32] },
            ChainTip { height: 5, finalized: true, tip_hash: [1; 32] },
        ];
        let winner = choose_canonical_tip(&candidates).unwrap();
        assert_eq!(winner.tip_hash, [1; 32]);
    }

    #[test]
    fn no_finalized_candidate_yields_none() {
        let candidates = vec![ChainTip { height: 5, finalized: false, tip_hash: [1; 32] }];
        assert!(choose_canonical_tip(&candidates).is_none());
    }

    #[test]
    fn detect_fork_returns_false_until_a_second_distinct_hash_appears() {
        let mut sync = Synchronizer::new();
        assert!(!sync.detect_fork(10, [1; 32], "P1"));
        assert!(sync.detect_fork(10, [2; 32], "P2"));
        assert_eq!(sync.stats.forks_detected, 1);
    }

    #[test]
    fn repeated_reports_of_the_same_conflicting_hash_do_not_double_count() {
        let mut sync = Synchronizer::new();
        sync.detect_fork(10, [1; 32], "P1");
        sync.detect_fork(10, [2; 32], "P2");
        assert!(sync.detect_fork(10, [2; 32], "P3"));
        assert_eq!(sync.stats.forks_detected, 1);
    }

    #[test]
    fn resolve_fork_prunes_non_canonical_candidates_and_counts_once() {
        let mut sync = Synchronizer::new();
        sync.detect_fork(10, [1; 32], "P1");
        sync.detect_fork(10, [2; 32], "P2");

        assert!(sync.resolve_fork(10, [1; 32]));
        assert_eq!(sync.fork_candidates_at(10), vec![[1; 32]]);
        assert_eq!(sync.stats.forks_resolved, 1);

        // Resolving again with nothing left to prune does not recount.
        assert!(!sync.resolve_fork(10, [1; 32]));
        assert_eq!(sync.stats.forks_resolved, 1);
    }
}
