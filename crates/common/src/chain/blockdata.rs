/// Genesis block construction and golden values.
pub mod genesis;

pub use bitcoin::{Block, BlockHash, Transaction, TxMerkleNode, block::Header};
pub use genesis::{GenesisError, GenesisInfo, build_genesis};
