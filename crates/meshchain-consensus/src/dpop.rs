//! Delegated Proof-of-Proximity validator selection.
//!
//! Selection is a weighted random walk over a prefix sum of validator
//! weights: draw `r` uniformly from `[0, total_weight)`, then pick the
//! first validator whose cumulative weight exceeds `r`. Validators are
//! walked in ascending `NodeId` order so the same weight snapshot always
//! produces the same prefix-sum layout for a given draw.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use meshchain_core::NodeId;

use crate::registry::ValidatorRegistry;

pub struct DpopSelector {
    rng: ChaCha8Rng,
}

impl DpopSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Snapshots active validator weights, draws uniformly over the total,
    /// and walks the prefix sum. Returns `None` if no validator has
    /// positive weight.
    pub fn select_validator(&mut self, registry: &ValidatorRegistry) -> Option<NodeId> {
        let weights = weight_snapshot(registry);
        let total: u64 = weights.iter().map(|(_, w)| w).sum();
        if total == 0 {
            return None;
        }
        let draw = self.rng.gen_range(0..total);
        let selected = select_by_draw(&weights, draw);
        match selected {
            Some(id) => tracing::debug!(?id, total_weight = total, draw, "selected validator"),
            None => tracing::warn!(total_weight = total, draw, "no validator matched the draw"),
        }
        selected
    }

    /// `k` independent draws without replacement: each pick is removed from
    /// the pool before the next draw. Returns fewer than `k` entries if the
    /// active set is smaller than `k`.
    pub fn select_committee(&mut self, registry: &ValidatorRegistry, k: usize) -> Vec<NodeId> {
        let mut weights = weight_snapshot(registry);
        let mut committee = Vec::with_capacity(k);

        for _ in 0..k {
            let total: u64 = weights.iter().map(|(_, w)| w).sum();
            if total == 0 {
                break;
            }
            let draw = self.rng.gen_range(0..total);
            let Some(picked) = select_by_draw(&weights, draw) else {
                break;
            };
            committee.push(picked);
            weights.retain(|(id, _)| *id != picked);
        }
        committee
    }
}

fn weight_snapshot(registry: &ValidatorRegistry) -> Vec<(NodeId, u64)> {
    let mut weights: Vec<(NodeId, u64)> = registry
        .active_validators()
        .map(|v| (v.node_id, v.weight(registry.min_stake)))
        .filter(|(_, w)| *w > 0)
        .collect();
    weights.sort_by_key(|(id, _)| *id);
    weights
}

/// Walks the prefix sum of `weights` (already in a stable order) and
/// returns the first entry whose cumulative weight exceeds `draw`.
fn select_by_draw(weights: &[(NodeId, u64)], draw: u64) -> Option<NodeId> {
    let mut cumulative = 0u64;
    for (id, weight) in weights {
        cumulative += weight;
        if draw < cumulative {
            return Some(*id);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u8) -> NodeId {
        NodeId::from_bytes([id; 8])
    }

    fn scenario_registry() -> ValidatorRegistry {
        let mut r = ValidatorRegistry::new(1, 50_000);
        r.add_validator(node(1), 100, 1); // A: weight 100
        r.add_validator(node(2), 100, 2); // B: weight 50
        r.add_validator(node(3), 200, 4); // C: weight 50
        r
    }

    #[test]
    fn prefix_sum_walk_matches_expected_bands() {
        let registry = scenario_registry();
        let weights = weight_snapshot(&registry);
        assert_eq!(select_by_draw(&weights, 75), Some(node(1)));
        assert_eq!(select_by_draw(&weights, 120), Some(node(2)));
        assert_eq!(select_by_draw(&weights, 170), Some(node(3)));
    }

    #[test]
    fn no_active_weight_yields_none() {
        let registry = ValidatorRegistry::new(100, 50_000);
        let mut selector = DpopSelector::new(42);
        assert_eq!(selector.select_validator(&registry), None);
    }

    #[test]
    fn committee_selection_has_no_duplicates() {
        let registry = scenario_registry();
        let mut selector = DpopSelector::new(7);
        let committee = selector.select_committee(&registry, 3);
        assert_eq!(committee.len(), 3);
        let mut sorted = committee.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);
    }

    #[test]
    fn committee_selection_caps_at_active_validator_count() {
        let registry = scenario_registry();
        let mut selector = DpopSelector::new(7);
        let committee = selector.select_committee(&registry, 10);
        assert_eq!(committee.len(), 3);
    }
}
