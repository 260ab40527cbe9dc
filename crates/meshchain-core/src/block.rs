//! Block data model.
//!
//! Two hash widths are used deliberately:
//! `wire_hash()` (truncated-16) is what `previous_hash` and mempool/router
//! dedup use on the wire and in memory; `storage_hash()` (full-32, hex) is
//! what `meshchain-storage` persists and verifies by recomputing SHA-256
//! and comparing it against the stored bytes. Both are computed
//! over the same canonical serialization, so they always agree on which
//! block they name — only their on-disk/on-wire *width* differs.

use meshchain_codec::{Reader, Writer};
use meshchain_crypto::{merkle_root, sha256, sha256_16, Hash16, Hash32};
use serde::{Deserialize, Serialize};

use crate::error::{ChainError, Result};
use crate::transaction::Transaction;
use crate::types::NodeId;

pub const MAX_VALIDATORS: usize = 7;
pub const MAX_TRANSACTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub version: u8,
    pub height: u32,
    pub timestamp: u16,
    pub previous_hash: Hash16,
    pub merkle_root: Hash16,
    pub proposer_id: NodeId,
    pub validators: Vec<NodeId>,
    pub approvals: Vec<bool>,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Set-bits in `approvals` required for finalization: `ceil((2N + 2) / 3)`.
    pub fn approval_threshold(validator_count: usize) -> usize {
        let n = validator_count as u64;
        (((2 * n + 2) + 2) / 3) as usize
    }

    pub fn approvals_count(&self) -> usize {
        self.approvals.iter().filter(|b| **b).count()
    }

    pub fn is_finalized(&self) -> bool {
        self.approvals_count() >= Self::approval_threshold(self.validators.len())
    }

    pub fn computed_merkle_root(&self) -> Hash16 {
        let leaves: Vec<Hash16> = self.transactions.iter().map(|tx| tx.hash()).collect();
        merkle_root(&leaves)
    }

    /// Structural invariants: merkle root matches
    /// transactions, approvals length matches validators, bounds on
    /// validators/transactions counts, every transaction individually valid.
    pub fn validate_structure(&self) -> Result<()> {
        if self.validators.len() > MAX_VALIDATORS {
            return Err(ChainError::InvalidBlock {
                reason: format!("{} validators exceeds cap of {MAX_VALIDATORS}", self.validators.len()),
            });
        }
        if self.transactions.len() > MAX_TRANSACTIONS {
            return Err(ChainError::InvalidBlock {
                reason: format!(
                    "{} transactions exceeds per-block cap of {MAX_TRANSACTIONS}",
                    self.transactions.len()
                ),
            });
        }
        if self.approvals.len() != self.validators.len() {
            return Err(ChainError::InvalidBlock {
                reason: "approvals length does not match validators length".into(),
            });
        }
        if self.computed_merkle_root() != self.merkle_root {
            return Err(ChainError::MerkleMismatch);
        }
        for tx in &self.transactions {
            tx.validate_structure()
                .map_err(|e| ChainError::InvalidBlock { reason: e.to_string() })?;
        }
        Ok(())
    }

    fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_u8(self.version);
        w.write_varint(self.height).expect("height fits the wire varint range");
        w.write_u16(self.timestamp);
        w.write_bytes(self.previous_hash.as_bytes());
        w.write_bytes(self.merkle_root.as_bytes());
        w.write_bytes(self.proposer_id.as_bytes());
        w.write_varint(self.validators.len() as u32).expect("validator count fits a varint");
        for v in &self.validators {
            w.write_bytes(v.as_bytes());
        }
        w.write_bytes(&pack_bits(&self.approvals));
        w.write_varint(self.transactions.len() as u32).expect("tx count fits a varint");
        for tx in &self.transactions {
            let body = tx.encode(true);
            w.write_varint(body.len() as u32).expect("tx body fits the per-block MTU budget");
            w.write_bytes(&body);
        }
        w.into_vec()
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut r = Reader::new(buf);
        let version = r.read_u8()?;
        let height = r.read_varint()?;
        let timestamp = r.read_u16()?;
        let previous_hash = Hash16::from_bytes(r.read_array::<16>()?);
        let merkle_root = Hash16::from_bytes(r.read_array::<16>()?);
        let proposer_id = NodeId::from_bytes(r.read_array::<8>()?);

        let validator_count = r.read_varint()? as usize;
        if validator_count > MAX_VALIDATORS {
            return Err(ChainError::InvalidBlock {
                reason: format!("{validator_count} validators exceeds cap of {MAX_VALIDATORS}"),
            });
        }
        let mut validators = Vec::with_capacity(validator_count);
        for _ in 0..validator_count {
            validators.push(NodeId::from_bytes(r.read_array::<8>()?));
        }

        let approval_bytes = r.read_bytes(approval_byte_len(validator_count))?;
        let approvals = unpack_bits(approval_bytes, validator_count);

        let tx_count = r.read_varint()? as usize;
        if tx_count > MAX_TRANSACTIONS {
            return Err(ChainError::InvalidBlock {
                reason: format!("{tx_count} transactions exceeds per-block cap of {MAX_TRANSACTIONS}"),
            });
        }
        let mut transactions = Vec::with_capacity(tx_count);
        for _ in 0..tx_count {
            let len = r.read_varint()? as usize;
            let body = r.read_bytes(len)?;
            transactions.push(Transaction::decode(body)?);
        }

        let block = Block {
            version,
            height,
            timestamp,
            previous_hash,
            merkle_root,
            proposer_id,
            validators,
            approvals,
            transactions,
        };
        block.validate_structure()?;
        Ok(block)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode()
    }

    /// Truncated-16 wire/mempool identity.
    pub fn wire_hash(&self) -> Hash16 {
        sha256_16(&self.encode())
    }

    /// Full-32 identity used by the storage engine.
    pub fn storage_hash(&self) -> Hash32 {
        sha256(&self.encode())
    }
}

fn approval_byte_len(n: usize) -> usize {
    (n + 7) / 8
}

fn pack_bits(bits: &[bool]) -> Vec<u8> {
    let mut out = vec![0u8; approval_byte_len(bits.len())];
    for (i, bit) in bits.iter().enumerate() {
        if *bit {
            out[i / 8] |= 1 << (i % 8);
        }
    }
    out
}

fn unpack_bits(bytes: &[u8], n: usize) -> Vec<bool> {
    (0..n).map(|i| bytes[i / 8] & (1 << (i % 8)) != 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u8) -> NodeId {
        NodeId::from_bytes([id; 8])
    }

    fn empty_block(height: u32, validators: usize) -> Block {
        let validators: Vec<NodeId> = (0..validators).map(|i| node(i as u8)).collect();
        let approvals = vec![false; validators.len()];
        Block {
            version: 1,
            height,
            timestamp: 0,
            previous_hash: Hash16::zero(),
            merkle_root: meshchain_crypto::merkle_root(&[]),
            proposer_id: node(0),
            validators,
            approvals,
            transactions: vec![],
        }
    }

    #[test]
    fn zero_tx_block_merkle_root_is_hash_of_empty_string() {
        let block = empty_block(1, 3);
        assert_eq!(block.computed_merkle_root(), meshchain_crypto::sha256_16(b""));
        assert!(block.validate_structure().is_ok());
    }

    #[test]
    fn wire_roundtrip() {
        let mut block = empty_block(10, 4);
        block.approvals = vec![true, true, false, true];
        let bytes = block.to_bytes();
        let decoded = Block::decode(&bytes).unwrap();
        assert_eq!(block, decoded);
    }

    #[test]
    fn finalization_threshold_matches_two_thirds_rule() {
        // N=7 -> ceil((2*7+2)/3) = ceil(16/3) = 6
        assert_eq!(Block::approval_threshold(7), 6);
        // N=3 -> ceil(8/3) = 3
        assert_eq!(Block::approval_threshold(3), 3);
        // N=1 -> ceil(4/3) = 2 (a single validator alone can never finalize)
        assert_eq!(Block::approval_threshold(1), 2);
    }

    #[test]
    fn finalized_requires_threshold_approvals() {
        let mut block = empty_block(1, 3);
        block.approvals = vec![true, true, false];
        assert!(!block.is_finalized()); // 2 < 3
        block.approvals = vec![true, true, true];
        assert!(block.is_finalized());
    }

    #[test]
    fn rejects_too_many_validators() {
        let mut block = empty_block(1, MAX_VALIDATORS + 1);
        block.approvals = vec![false; block.validators.len()];
        assert!(block.validate_structure().is_err());
    }

    #[test]
    fn rejects_approvals_length_mismatch() {
        let mut block = empty_block(1, 3);
        block.approvals = vec![true, true];
        assert!(block.validate_structure().is_err());
    }

    #[test]
    fn rejects_bad_merkle_root() {
        let mut block = empty_block(1, 2);
        block.merkle_root = Hash16::from_bytes([0xAB; 16]);
        assert!(matches!(block.validate_structure(), Err(ChainError::MerkleMismatch)));
    }
}
