//! MeshChain chain data model: the entities (transaction,
//! block, UTXO set) plus their wire (de)serialization and structural
//! invariants. Consensus, mempool, storage, and network logic live in
//! their own crates and depend on this one.

pub mod block;
pub mod error;
pub mod transaction;
pub mod types;
pub mod utxo;

pub use block::Block;
pub use error::{ChainError, Result};
pub use transaction::{Transaction, TxKind};
pub use types::{Amount, BlockHeight, NodeId};
pub use utxo::{Utxo, UtxoSet};
