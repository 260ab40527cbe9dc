//! Gini coefficient over validator effective stake, used as an advisory
//! decentralization metric. Nothing gates on it; it is
//! reported, not enforced.

use crate::registry::ValidatorRegistry;

pub const DEFAULT_TARGET_GINI: f64 = 0.35;

pub struct GiniCalculator {
    pub target_gini: f64,
}

impl GiniCalculator {
    pub fn new(target_gini: f64) -> Self {
        Self { target_gini }
    }

    /// `G = (2 * sum(i * x[i])) / (n * sum(x)) - (n + 1) / n` over stakes
    /// sorted ascending, `i` 1-indexed. Clamped to `[0, 1]`; returns 0 for
    /// `n <= 1` or an all-zero distribution.
    pub fn compute(&self, registry: &ValidatorRegistry) -> f64 {
        let mut stakes: Vec<u64> = registry.all_validators().map(|v| v.effective_stake()).collect();
        gini_of(&mut stakes)
    }
}

impl Default for GiniCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_GINI)
    }
}

fn gini_of(stakes: &mut [u64]) -> f64 {
    let n = stakes.len();
    if n <= 1 {
        return 0.0;
    }
    stakes.sort_unstable();
    let sum: u128 = stakes.iter().map(|&x| x as u128).sum();
    if sum == 0 {
        return 0.0;
    }
    let weighted_sum: u128 = stakes
        .iter()
        .enumerate()
        .map(|(idx, &x)| (idx as u128 + 1) * x as u128)
        .sum();

    let n_f = n as f64;
    let gini = (2.0 * weighted_sum as f64) / (n_f * sum as f64) - (n_f + 1.0) / n_f;
    gini.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u8) -> meshchain_core::NodeId {
        meshchain_core::NodeId::from_bytes([id; 8])
    }

    #[test]
    fn perfectly_equal_stakes_yield_zero() {
        let mut registry = ValidatorRegistry::new(1, 50_000);
        registry.add_validator(node(1), 100, 1);
        registry.add_validator(node(2), 100, 1);
        registry.add_validator(node(3), 100, 1);
        let calc = GiniCalculator::default();
        assert!((calc.compute(&registry) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn single_validator_yields_zero() {
        let mut registry = ValidatorRegistry::new(1, 50_000);
        registry.add_validator(node(1), 100, 1);
        let calc = GiniCalculator::default();
        assert_eq!(calc.compute(&registry), 0.0);
    }

    #[test]
    fn empty_registry_yields_zero() {
        let registry = ValidatorRegistry::new(1, 50_000);
        let calc = GiniCalculator::default();
        assert_eq!(calc.compute(&registry), 0.0);
    }

    #[test]
    fn skewed_stakes_yield_positive_gini() {
        let mut registry = ValidatorRegistry::new(1, 50_000);
        registry.add_validator(node(1), 10, 1);
        registry.add_validator(node(2), 10, 1);
        registry.add_validator(node(3), 1000, 1);
        let calc = GiniCalculator::default();
        assert!(calc.compute(&registry) > 0.3);
    }
}
