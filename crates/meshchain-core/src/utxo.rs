//! UTXO set. Mutated only by block application/rollback; never
//! touched directly by wallets or the network layer.

use std::collections::HashMap;

use meshchain_crypto::Hash16;
use serde::{Deserialize, Serialize};

use crate::types::{Amount, BlockHeight};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub id: Hash16,
    pub amount: Amount,
    pub stealth_address: Hash16,
    pub block_height: BlockHeight,
    pub is_spent: bool,
}

/// The full unspent-output set, indexed by UTXO id. Mutation is exclusively
/// through `apply_block`/`rollback_block` in the chain state machine that
/// owns this set — see "Ownership".
#[derive(Debug, Clone, Default)]
pub struct UtxoSet {
    entries: HashMap<Hash16, Utxo>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, utxo: Utxo) {
        self.entries.insert(utxo.id, utxo);
    }

    pub fn get(&self, id: &Hash16) -> Option<&Utxo> {
        self.entries.get(id)
    }

    /// Mark a UTXO spent; returns false if it was unknown or already spent.
    pub fn spend(&mut self, id: &Hash16) -> bool {
        match self.entries.get_mut(id) {
            Some(utxo) if !utxo.is_spent => {
                utxo.is_spent = true;
                true
            }
            _ => false,
        }
    }

    /// Reverse a spend during rollback.
    pub fn unspend(&mut self, id: &Hash16) -> bool {
        match self.entries.get_mut(id) {
            Some(utxo) if utxo.is_spent => {
                utxo.is_spent = false;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: &Hash16) -> Option<Utxo> {
        self.entries.remove(id)
    }

    /// `Balance(addr) = Σ unspent.amount where utxo.stealth_address == addr`.
    pub fn balance(&self, stealth_address: &Hash16) -> Amount {
        self.entries
            .values()
            .filter(|u| !u.is_spent && u.stealth_address == *stealth_address)
            .map(|u| u.amount)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
