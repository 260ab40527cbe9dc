//! Validator record.

use meshchain_core::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub node_id: NodeId,
    pub stake: u64,
    pub hop_distance: u8,
    pub active: bool,
    pub slashed_amount: u64,
    pub validation_count: u64,
    pub missed_validations: u64,
    pub last_validation_time: i64,
}

impl Validator {
    pub fn new(node_id: NodeId, stake: u64, hop_distance: u8) -> Self {
        Self {
            node_id,
            stake,
            hop_distance,
            active: true,
            slashed_amount: 0,
            validation_count: 0,
            missed_validations: 0,
            last_validation_time: 0,
        }
    }

    /// `effective_stake = max(0, stake − slashed_amount)`.
    pub fn effective_stake(&self) -> u64 {
        self.stake.saturating_sub(self.slashed_amount)
    }

    /// `weight = effective_stake / max(1, hop_distance)` when active and
    /// `effective_stake ≥ min_stake`, else 0.
    pub fn weight(&self, min_stake: u64) -> u64 {
        if !self.active || self.effective_stake() < min_stake {
            return 0;
        }
        self.effective_stake() / (self.hop_distance.max(1) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u8) -> NodeId {
        NodeId::from_bytes([id; 8])
    }

    #[test]
    fn effective_stake_floors_at_zero() {
        let mut v = Validator::new(node(1), 100, 1);
        v.slashed_amount = 150;
        assert_eq!(v.effective_stake(), 0);
    }

    #[test]
    fn weight_divides_by_hop_distance() {
        let v = Validator::new(node(1), 100, 2);
        assert_eq!(v.weight(10), 50);
    }

    #[test]
    fn inactive_validator_has_zero_weight() {
        let mut v = Validator::new(node(1), 100, 1);
        v.active = false;
        assert_eq!(v.weight(10), 0);
    }

    #[test]
    fn below_min_stake_has_zero_weight() {
        let v = Validator::new(node(1), 50, 1);
        assert_eq!(v.weight(100), 0);
    }
}
