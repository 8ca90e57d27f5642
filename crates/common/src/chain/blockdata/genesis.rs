//! Genesis block construction for the Vertoreum networks.
//!
//! The genesis block is never downloaded: every node rebuilds it from the
//! fixed inputs below and must arrive at the same header hash and Merkle root
//! bit for bit.

use bitcoin::{
    Amount, Block, BlockHash, CompactTarget, OutPoint, ScriptBuf, Sequence, Transaction, TxIn,
    TxMerkleNode, TxOut, Witness,
    absolute::LockTime,
    block::{Header, Version},
    hashes::Hash,
    opcodes::all::OP_CHECKSIG,
    script::{Builder, PushBytes, PushBytesError},
    transaction,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::chain::network::Network;

/// Number of base units in one coin.
pub const COIN: u64 = 100_000_000;

/// Message embedded in the genesis coinbase input.
pub const GENESIS_MESSAGE: &[u8] = b"Vertoreum / A coin worth collecting";

/// Uncompressed public key paid by the genesis coinbase output.
const GENESIS_OUTPUT_KEY: &str = "04d83ed1b7caee5fe75d94e72fdeef4bec36f59f8f7cac0dae8eb91050023ac1f956e06021f9d754cfa9e6b8a19281fd96235bdbeceefd649557bb96deb336a60c";

/// Leading push of the coinbase scriptSig, carried over from the Bitcoin
/// genesis block (`0x1d00ffff`).
const COINBASE_SCRIPT_NUMBER: i64 = 486_604_799;

/// Errors that can occur while building or checking a genesis block.
#[derive(Debug, Error)]
pub enum GenesisError {
    /// The coinbase message or output key cannot be pushed onto a script.
    #[error("Genesis data cannot be pushed: {0}")]
    Push(#[from] PushBytesError),

    /// The embedded output key is not valid hex.
    #[error("Invalid genesis output key: {0}")]
    InvalidKey(#[from] hex::FromHexError),

    /// A block without transactions has no Merkle root.
    #[error("Genesis block has no transactions")]
    NoTransactions,

    /// The header hash differs from the hard-coded value.
    #[error("Genesis hash mismatch: expected {expected}, computed {actual}")]
    HashMismatch {
        /// The hard-coded hash
        expected: BlockHash,
        /// The hash of the constructed header
        actual: BlockHash,
    },

    /// The Merkle root differs from the hard-coded value.
    #[error("Genesis merkle root mismatch: expected {expected}, computed {actual}")]
    MerkleRootMismatch {
        /// The hard-coded Merkle root
        expected: TxMerkleNode,
        /// The Merkle root of the constructed block
        actual: TxMerkleNode,
    },
}

/// Genesis block information for different networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisInfo {
    /// The hash of the genesis block.
    pub hash: BlockHash,
    /// The merkle root of the genesis block.
    pub merkle_root: TxMerkleNode,
    /// The timestamp of the genesis block.
    pub timestamp: u32,
    /// The nonce of the genesis block.
    pub nonce: u32,
    /// The bits (difficulty) of the genesis block.
    pub bits: u32,
    /// The version of the genesis block.
    pub version: i32,
    /// The coinbase reward, in base units.
    pub reward: u64,
}

impl GenesisInfo {
    /// Returns the genesis block information for the specified network.
    ///
    /// # Arguments
    ///
    /// * `network` - The network type (mainnet, testnet, regtest)
    ///
    /// # Returns
    ///
    /// * `GenesisInfo` - The genesis block information for the specified
    ///   network
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
            Network::Regtest => Self::regtest(),
        }
    }

    /// Returns the genesis block information for the mainnet network.
    pub fn mainnet() -> Self {
        Self {
            hash: BlockHash::from_byte_array([
                0x6a, 0xc4, 0xd0, 0x91, 0x26, 0xd1, 0xd9, 0x87, 0x09, 0xc3, 0xd0, 0x13, 0x9e, 0xde,
                0xec, 0xc3, 0x50, 0x69, 0xb8, 0xb3, 0x57, 0xf0, 0x6a, 0xff, 0x97, 0xf3, 0xd2, 0x91,
                0x7b, 0x7a, 0x58, 0x8b,
            ]),
            merkle_root: Self::merkle_root(),
            timestamp: 1664416111,
            nonce: 860,
            bits: 0x20000fff,
            version: 1,
            reward: 50 * COIN,
        }
    }

    /// Returns the genesis block information for the testnet network.
    pub fn testnet() -> Self {
        Self {
            hash: BlockHash::from_byte_array([
                0x04, 0x0d, 0x24, 0x3e, 0xf4, 0x0c, 0x6e, 0x55, 0xf3, 0x39, 0x3b, 0x9e, 0xed, 0xfd,
                0xa2, 0x6f, 0x4f, 0x0d, 0x05, 0x35, 0x71, 0x22, 0x41, 0x64, 0x28, 0x9f, 0x20, 0x2f,
                0x5b, 0x62, 0x3c, 0x0c,
            ]),
            merkle_root: Self::merkle_root(),
            timestamp: 1664416112,
            nonce: 12383,
            bits: 0x20000fff,
            version: 1,
            reward: 50 * COIN,
        }
    }

    /// Returns the genesis block information for the regtest network.
    pub fn regtest() -> Self {
        Self {
            hash: BlockHash::from_byte_array([
                0x00, 0x5d, 0xab, 0x1e, 0x26, 0x0a, 0x95, 0x1c, 0xb4, 0xd5, 0xb7, 0xf1, 0xe7, 0x19,
                0xb3, 0x6f, 0xf2, 0x1c, 0xa0, 0xa1, 0x63, 0x92, 0x45, 0xe5, 0xf9, 0x89, 0x6d, 0xaf,
                0xaf, 0x35, 0xa1, 0x50,
            ]),
            merkle_root: Self::merkle_root(),
            timestamp: 1664416113,
            nonce: 23,
            bits: 0x207fffff,
            version: 1,
            reward: 50 * COIN,
        }
    }

    // All three networks share one coinbase, hence one Merkle root.
    fn merkle_root() -> TxMerkleNode {
        TxMerkleNode::from_byte_array([
            0x2a, 0x1b, 0x97, 0x1c, 0x3c, 0x37, 0xd6, 0xa8, 0x55, 0xd6, 0x30, 0xa9, 0xd9, 0x2a,
            0xbe, 0x69, 0x0d, 0x17, 0xf6, 0xf9, 0xf9, 0x29, 0x08, 0xaa, 0x8b, 0x5b, 0xeb, 0xf7,
            0x9f, 0x8f, 0x0c, 0x65,
        ])
    }

    /// Builds the genesis block from this information, without checking it
    /// against the expected hashes.
    pub fn build(&self) -> Result<Block, GenesisError> {
        let output_script = genesis_output_script()?;
        build_genesis(
            GENESIS_MESSAGE,
            output_script,
            self.timestamp,
            self.nonce,
            self.bits,
            self.version,
            Amount::from_sat(self.reward),
        )
    }

    /// Checks a constructed block against the expected Merkle root and header
    /// hash.
    pub fn verify(&self, block: &Block) -> Result<(), GenesisError> {
        let merkle_root = block.header.merkle_root;
        if merkle_root != self.merkle_root {
            return Err(GenesisError::MerkleRootMismatch {
                expected: self.merkle_root,
                actual: merkle_root,
            });
        }

        let hash = block.block_hash();
        if hash != self.hash {
            return Err(GenesisError::HashMismatch {
                expected: self.hash,
                actual: hash,
            });
        }

        Ok(())
    }

    /// Builds the genesis block and checks it against the expected hashes.
    pub fn build_verified(&self) -> Result<Block, GenesisError> {
        let block = self.build()?;
        self.verify(&block)?;
        Ok(block)
    }
}

/// Builds the scriptSig of the genesis coinbase input: the legacy difficulty
/// number, a push of `4`, and the message.
pub fn coinbase_script_sig(message: &[u8]) -> Result<ScriptBuf, GenesisError> {
    let message = <&PushBytes>::try_from(message)?;
    let four = <&PushBytes>::try_from(&[4u8][..])?;
    Ok(Builder::new()
        .push_int(COINBASE_SCRIPT_NUMBER)
        .push_slice(four)
        .push_slice(message)
        .into_script())
}

/// Builds the pay-to-pubkey script of the genesis coinbase output.
pub fn genesis_output_script() -> Result<ScriptBuf, GenesisError> {
    let key = hex::decode(GENESIS_OUTPUT_KEY)?;
    let key = <&PushBytes>::try_from(key.as_slice())?;
    Ok(Builder::new()
        .push_slice(key)
        .push_opcode(OP_CHECKSIG)
        .into_script())
}

/// Builds a genesis block from its fixed inputs.
///
/// The block holds a single coinbase transaction: one input carrying
/// `message` with a null previous output, and one output paying `reward` to
/// `output_script`. The header has no predecessor and its Merkle root is the
/// coinbase transaction id. The result is fully determined by the arguments.
pub fn build_genesis(
    message: &[u8],
    output_script: ScriptBuf,
    time: u32,
    nonce: u32,
    bits: u32,
    version: i32,
    reward: Amount,
) -> Result<Block, GenesisError> {
    let coinbase = Transaction {
        version: transaction::Version::ONE,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint::null(),
            script_sig: coinbase_script_sig(message)?,
            sequence: Sequence::MAX,
            witness: Witness::default(),
        }],
        output: vec![TxOut {
            value: reward,
            script_pubkey: output_script,
        }],
    };

    let mut block = Block {
        header: Header {
            version: Version::from_consensus(version),
            prev_blockhash: BlockHash::all_zeros(), // Genesis block has no previous block
            merkle_root: TxMerkleNode::all_zeros(),
            time,
            bits: CompactTarget::from_consensus(bits),
            nonce,
        },
        txdata: vec![coinbase],
    };
    block.header.merkle_root = block
        .compute_merkle_root()
        .ok_or(GenesisError::NoTransactions)?;

    debug!(
        hash = %block.block_hash(),
        merkle_root = %block.header.merkle_root,
        time,
        nonce,
        "Built genesis block"
    );

    Ok(block)
}

#[cfg(test)]
mod tests {
    use bitcoin::consensus::serialize;

    use super::*;

    const COINBASE_HEX: &str = "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff2b04ffff001d010423566572746f7265756d202f204120636f696e20776f72746820636f6c6c656374696e67ffffffff0100f2052a01000000434104d83ed1b7caee5fe75d94e72fdeef4bec36f59f8f7cac0dae8eb91050023ac1f956e06021f9d754cfa9e6b8a19281fd96235bdbeceefd649557bb96deb336a60cac00000000";

    #[test]
    fn test_genesis_info() {
        let mainnet_genesis = GenesisInfo::mainnet();
        assert_eq!(
            mainnet_genesis.hash.to_string(),
            "8b587a7b91d2f397ff6af057b3b86950c3ecde9e13d0c30987d9d12691d0c46a"
        );
        assert_eq!(
            mainnet_genesis.merkle_root.to_string(),
            "650c8f9ff7eb5b8baa0829f9f9f6170d69be2ad9a930d655a8d6373c1c971b2a"
        );
        assert_eq!(mainnet_genesis.timestamp, 1664416111);
        assert_eq!(mainnet_genesis.nonce, 860);
        assert_eq!(mainnet_genesis.bits, 0x20000fff);
        assert_eq!(mainnet_genesis.version, 1);
        assert_eq!(mainnet_genesis.reward, 5_000_000_000);
    }

    #[test]
    fn test_mainnet_genesis_golden_values() {
        let block = GenesisInfo::mainnet().build().unwrap();
        assert_eq!(
            block.block_hash().to_string(),
            "8b587a7b91d2f397ff6af057b3b86950c3ecde9e13d0c30987d9d12691d0c46a"
        );
        assert_eq!(
            block.header.merkle_root.to_string(),
            "650c8f9ff7eb5b8baa0829f9f9f6170d69be2ad9a930d655a8d6373c1c971b2a"
        );
    }

    #[test]
    fn test_testnet_genesis_golden_values() {
        let block = GenesisInfo::testnet().build().unwrap();
        assert_eq!(
            block.block_hash().to_string(),
            "0c3c625b2f209f286441227135050d4f6fa2fded9e3b39f3556e0cf43e240d04"
        );
        assert_eq!(
            block.header.merkle_root.to_string(),
            "650c8f9ff7eb5b8baa0829f9f9f6170d69be2ad9a930d655a8d6373c1c971b2a"
        );
    }

    #[test]
    fn test_regtest_genesis_golden_values() {
        let block = GenesisInfo::regtest().build().unwrap();
        assert_eq!(
            block.block_hash().to_string(),
            "50a135afaf6d89f9e5459263a1a01cf26fb319e7f1b7d5b41c950a261eab5d00"
        );
    }

    #[test]
    fn test_genesis_is_deterministic() {
        for network in Network::ALL {
            let info = GenesisInfo::for_network(network);
            let first = info.build().unwrap();
            let second = info.build().unwrap();
            assert_eq!(serialize(&first), serialize(&second));
            assert_eq!(first.block_hash(), second.block_hash());
            assert_eq!(first.header.merkle_root, second.header.merkle_root);
        }
    }

    #[test]
    fn test_genesis_coinbase_layout() {
        let block = GenesisInfo::mainnet().build().unwrap();
        assert_eq!(block.txdata.len(), 1);

        let coinbase = &block.txdata[0];
        assert!(coinbase.is_coinbase());
        assert_eq!(hex::encode(serialize(coinbase)), COINBASE_HEX);
        assert_eq!(coinbase.output[0].value, Amount::from_sat(50 * COIN));

        // Single transaction: the Merkle root is the coinbase txid.
        assert_eq!(
            block.header.merkle_root.to_byte_array(),
            coinbase.compute_txid().to_byte_array()
        );
    }

    #[test]
    fn test_genesis_header_fields() {
        let info = GenesisInfo::regtest();
        let header = info.build().unwrap().header;

        assert_eq!(header.version.to_consensus(), 1);
        assert_eq!(header.prev_blockhash, BlockHash::all_zeros());
        assert_eq!(header.time, info.timestamp);
        assert_eq!(header.bits.to_consensus(), info.bits);
        assert_eq!(header.nonce, info.nonce);
    }

    #[test]
    fn test_verify_detects_wrong_nonce() {
        let mut info = GenesisInfo::mainnet();
        info.nonce = 861;
        let block = info.build().unwrap();
        assert!(matches!(
            GenesisInfo::mainnet().verify(&block),
            Err(GenesisError::HashMismatch { .. })
        ));
    }

    #[test]
    fn test_verify_detects_wrong_message() {
        let info = GenesisInfo::mainnet();
        let block = build_genesis(
            b"Vertoreum / A coin worth collecting!",
            genesis_output_script().unwrap(),
            info.timestamp,
            info.nonce,
            info.bits,
            info.version,
            Amount::from_sat(info.reward),
        )
        .unwrap();
        assert!(matches!(
            info.verify(&block),
            Err(GenesisError::MerkleRootMismatch { .. })
        ));
    }
}
