//! Per-network parameter sets.
//!
//! A [`NetworkParams`] bundles the consensus rules of a network with its
//! identity: message start bytes, default port, Base58 prefixes, checkpoints
//! and seeds. Each set is assembled from constants and then checked. The
//! genesis block is rebuilt and compared with the hard-coded hashes, and any
//! mismatch is reported as an error rather than producing a usable set.

use std::net::{IpAddr, Ipv4Addr};

use bitcoin::{Block, BlockHash};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::chain::{
    base58::{Base58Error, Base58Prefixes, Base58Type},
    blockdata::genesis::{GenesisError, GenesisInfo},
    checkpoints::{CheckpointError, Checkpoints},
    consensus::{ConsensusParams, DeploymentId},
    network::Network,
    p2p::{Magic, SeedAddress},
    pow::Target,
    util::blockhash_from_display,
};

/// Heights of the mainnet checkpoints above genesis.
const MAINNET_HEIGHTS: [u32; 5] = [1, 16, 48, 72, 101];

/// Displayed block hashes of the mainnet checkpoints, by height.
const MAINNET_HASHES: [&str; 5] = [
    "49f8eaf0be0429cbd76266b12a57d15b936a877a5d9218fafa814ba30dace97c",
    "a6c3ac85b9a70c86856c15c7fa6578114416061afc864ae6e7b0596f95aecfef",
    "747486994821660b8e2907388ac27fc3ba269e508984178facd7ef347cdc7f3f",
    "3abdf6f0ad65b8e2c661f8d24869f7ebd0c9eed7ce7bac7ca9b6daaeefcedfa7",
    "b1e34a46b3e93a10791969c4fe539f4d4f3c9e6bc3af3335da451208b305bf65",
];

/// Address of the single hard-coded mainnet seed node.
const MAINNET_SEED: Ipv4Addr = Ipv4Addr::new(45, 77, 108, 93);

/// Errors raised while assembling or validating a parameter set.
#[derive(Debug, Error)]
pub enum ChainParamsError {
    /// The genesis block could not be built or does not match its hashes.
    #[error(transparent)]
    Genesis(#[from] GenesisError),
    /// The checkpoint table is malformed.
    #[error("Invalid checkpoint table: {0}")]
    Checkpoint(#[from] CheckpointError),
    /// The Base58 prefix table is ambiguous or incomplete.
    #[error("Invalid base58 prefixes: {0}")]
    Base58(#[from] Base58Error),
    /// A hard-coded block hash is not valid hex.
    #[error("Invalid block hash literal: {0}")]
    InvalidHash(#[from] hex::FromHexError),
    /// The consensus genesis hash is not the hash of the genesis block.
    #[error("Consensus genesis hash {consensus} differs from genesis block hash {block}")]
    ConsensusGenesisMismatch {
        /// Hash recorded in the consensus parameters
        consensus: BlockHash,
        /// Hash of the genesis block header
        block: BlockHash,
    },
    /// The checkpoint at height 0 is not the genesis block.
    #[error("Checkpoint at height 0 is {actual}, expected genesis hash {expected}")]
    CheckpointGenesisMismatch {
        /// The genesis hash
        expected: BlockHash,
        /// The checkpointed hash
        actual: BlockHash,
    },
    /// The checkpoint table does not anchor the genesis block.
    #[error("Checkpoint table has no entry at height 0")]
    MissingGenesisCheckpoint,
    /// Two deployments signal on the same bit, or a bit is out of range.
    #[error("Deployments share a signalling bit or use a reserved bit")]
    DuplicateDeploymentBits,
    /// The genesis header's compact target is invalid.
    #[error("Genesis bits {bits:#010x} do not encode a valid target")]
    InvalidGenesisBits {
        /// The compact target of the genesis header
        bits: u32,
    },
    /// The genesis target is easier than the proof-of-work limit.
    #[error("Genesis target {target} exceeds the proof-of-work limit {limit}")]
    GenesisAboveLimit {
        /// Target encoded by the genesis bits
        target: Target,
        /// The network's proof-of-work limit
        limit: Target,
    },
}

/// Transaction statistics used to estimate initial sync progress.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainTxData {
    /// UNIX timestamp of the last known transaction count.
    pub timestamp: i64,
    /// Total number of transactions up to `timestamp`.
    pub tx_count: u64,
    /// Estimated transactions per second after `timestamp`.
    pub tx_rate: f64,
}

impl ChainTxData {
    /// Estimates the total number of transactions at time `now`.
    ///
    /// # Returns
    ///
    /// `tx_count` extended by `tx_rate` for every second since `timestamp`;
    /// just `tx_count` when `now` is not later than `timestamp`
    pub fn estimate_tx_count(&self, now: i64) -> u64 {
        let elapsed = now.saturating_sub(self.timestamp);
        if elapsed <= 0 || !self.tx_rate.is_finite() || self.tx_rate <= 0.0 {
            return self.tx_count;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "Float to int casts saturate and the product is non-negative"
        )]
        let extra = (elapsed as f64 * self.tx_rate) as u64;
        self.tx_count.saturating_add(extra)
    }
}

/// A DNS seed: a display name and the host queried for peer addresses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsSeed {
    /// Name shown in logs.
    pub name: String,
    /// Hostname queried for peer addresses.
    pub host: String,
}

impl DnsSeed {
    /// Creates a seed entry.
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
        }
    }
}

/// The complete parameter set of one network.
#[derive(Clone, Debug)]
pub struct NetworkParams {
    network: Network,
    consensus: ConsensusParams,
    magic: Magic,
    default_port: u16,
    prune_after_height: u64,
    genesis: Block,
    base58_prefixes: Base58Prefixes,
    checkpoints: Checkpoints,
    chain_tx_data: ChainTxData,
    fixed_seeds: Vec<SeedAddress>,
    dns_seeds: Vec<DnsSeed>,
    require_standard: bool,
    mining_requires_peers: bool,
    mine_blocks_on_demand: bool,
    default_consistency_checks: bool,
}

impl NetworkParams {
    /// Builds and validates the parameter set of `network`.
    pub fn for_network(network: Network) -> Result<Self, ChainParamsError> {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
            Network::Regtest => Self::regtest(),
        }
    }

    /// Parameters of the Vertoreum mainnet.
    pub fn mainnet() -> Result<Self, ChainParamsError> {
        let genesis = GenesisInfo::mainnet().build_verified()?;
        let mut checkpoints = vec![(0, genesis.block_hash())];
        for (height, hash) in std::iter::zip(MAINNET_HEIGHTS, MAINNET_HASHES) {
            checkpoints.push((height, blockhash_from_display(hash)?));
        }
        let checkpoints = Checkpoints::from_ordered(checkpoints)?;

        let params = Self {
            network: Network::Mainnet,
            consensus: ConsensusParams::mainnet(),
            magic: Magic::MAINNET,
            default_port: 16178,
            prune_after_height: 100_000,
            base58_prefixes: Base58Prefixes::new(
                132,
                123,
                70,
                203,
                [0x03, 0x0e, 0x1e, 0x94],
                [0x03, 0x0e, 0x1f, 0x19],
            ),
            checkpoints,
            chain_tx_data: ChainTxData {
                timestamp: 1_664_438_182,
                tx_count: 102,
                tx_rate: 1.0,
            },
            fixed_seeds: vec![SeedAddress::new(IpAddr::V4(MAINNET_SEED), 16178)],
            dns_seeds: vec![DnsSeed::new("45.77.108.93", "45.77.108.93")],
            require_standard: true,
            mining_requires_peers: true,
            mine_blocks_on_demand: false,
            default_consistency_checks: false,
            genesis,
        };
        params.finish()
    }

    /// Parameters of the Vertoreum testnet.
    pub fn testnet() -> Result<Self, ChainParamsError> {
        let genesis = GenesisInfo::testnet().build_verified()?;
        let params = Self {
            network: Network::Testnet,
            consensus: ConsensusParams::testnet(),
            magic: Magic::TESTNET,
            default_port: 26178,
            prune_after_height: 1000,
            base58_prefixes: Base58Prefixes::new(
                64,
                104,
                124,
                204,
                [0x03, 0x13, 0xda, 0xe0],
                [0x03, 0x13, 0xdb, 0x65],
            ),
            checkpoints: Checkpoints::from_ordered([(0, genesis.block_hash())])?,
            chain_tx_data: ChainTxData {
                timestamp: 1_664_416_112,
                tx_count: 0,
                tx_rate: 0.0,
            },
            fixed_seeds: Vec::new(),
            dns_seeds: Vec::new(),
            require_standard: false,
            mining_requires_peers: true,
            mine_blocks_on_demand: false,
            default_consistency_checks: false,
            genesis,
        };
        params.finish()
    }

    /// Parameters of the Vertoreum regression test network.
    pub fn regtest() -> Result<Self, ChainParamsError> {
        let genesis = GenesisInfo::regtest().build_verified()?;
        let params = Self {
            network: Network::Regtest,
            consensus: ConsensusParams::regtest(),
            magic: Magic::REGTEST,
            default_port: 36178,
            prune_after_height: 1000,
            base58_prefixes: Base58Prefixes::new(
                65,
                105,
                125,
                205,
                [0x03, 0x13, 0xda, 0xe0],
                [0x03, 0x13, 0xdb, 0x65],
            ),
            checkpoints: Checkpoints::from_ordered([(0, genesis.block_hash())])?,
            chain_tx_data: ChainTxData {
                timestamp: 1_664_416_113,
                tx_count: 0,
                tx_rate: 0.0,
            },
            fixed_seeds: Vec::new(),
            dns_seeds: Vec::new(),
            require_standard: false,
            mining_requires_peers: false,
            mine_blocks_on_demand: true,
            default_consistency_checks: true,
            genesis,
        };
        params.finish()
    }

    /// Binds the consensus genesis hash to the constructed block and runs
    /// [`NetworkParams::validate`].
    fn finish(mut self) -> Result<Self, ChainParamsError> {
        self.consensus.genesis_hash = self.genesis.block_hash();
        self.validate()?;
        debug!(
            network = %self.network,
            genesis = %self.consensus.genesis_hash,
            checkpoints = self.checkpoints.len(),
            "Built network parameters"
        );
        Ok(self)
    }

    /// Re-checks every internal invariant of the parameter set.
    ///
    /// # Returns
    ///
    /// An error describing the first violated invariant: genesis hash or
    /// Merkle root, consensus genesis hash, checkpoint at height 0,
    /// deployment bits, Base58 prefixes or the genesis target
    pub fn validate(&self) -> Result<(), ChainParamsError> {
        let info = GenesisInfo::for_network(self.network);
        info.verify(&self.genesis)?;

        let genesis_hash = self.genesis.block_hash();
        if self.consensus.genesis_hash != genesis_hash {
            return Err(ChainParamsError::ConsensusGenesisMismatch {
                consensus: self.consensus.genesis_hash,
                block: genesis_hash,
            });
        }

        match self.checkpoints.get(0) {
            Some(hash) if *hash == genesis_hash => {}
            Some(hash) => {
                return Err(ChainParamsError::CheckpointGenesisMismatch {
                    expected: genesis_hash,
                    actual: *hash,
                });
            }
            None => return Err(ChainParamsError::MissingGenesisCheckpoint),
        }

        if !self.consensus.deployments.bits_are_unique() {
            return Err(ChainParamsError::DuplicateDeploymentBits);
        }

        self.base58_prefixes.validate()?;

        let bits = self.genesis.header.bits.to_consensus();
        let target = Target::from_compact(bits)
            .ok_or(ChainParamsError::InvalidGenesisBits { bits })?;
        if target > self.consensus.pow_limit {
            return Err(ChainParamsError::GenesisAboveLimit {
                target,
                limit: self.consensus.pow_limit,
            });
        }

        Ok(())
    }

    /// Replaces the signalling window of one deployment.
    pub(crate) fn set_deployment_window(
        &mut self,
        id: DeploymentId,
        start_time: i64,
        timeout: i64,
    ) {
        let deployment = self.consensus.deployments.get_mut(id);
        deployment.start_time = start_time;
        deployment.timeout = timeout;
    }

    /// The network these parameters belong to.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Network identifier: `"main"`, `"test"` or `"regtest"`.
    pub fn network_id(&self) -> &'static str {
        self.network.as_str()
    }

    /// Consensus rules of the network.
    pub fn consensus(&self) -> &ConsensusParams {
        &self.consensus
    }

    /// The message start bytes that frame every peer-to-peer message.
    pub fn message_start(&self) -> Magic {
        self.magic
    }

    /// Default peer-to-peer listening port.
    pub fn default_port(&self) -> u16 {
        self.default_port
    }

    /// Height below which block files may be pruned.
    pub fn prune_after_height(&self) -> u64 {
        self.prune_after_height
    }

    /// The constructed genesis block.
    pub fn genesis_block(&self) -> &Block {
        &self.genesis
    }

    /// Hash of the genesis block header.
    pub fn genesis_hash(&self) -> BlockHash {
        self.consensus.genesis_hash
    }

    /// Returns the Base58 version prefix of `kind`.
    pub fn base58_prefix(&self, kind: Base58Type) -> &[u8] {
        self.base58_prefixes.get(kind)
    }

    /// The full Base58 version prefix table.
    pub fn base58_prefixes(&self) -> &Base58Prefixes {
        &self.base58_prefixes
    }

    /// Hard-coded checkpoints, starting at the genesis block.
    pub fn checkpoints(&self) -> &Checkpoints {
        &self.checkpoints
    }

    /// Transaction statistics for sync progress estimates.
    pub fn chain_tx_data(&self) -> &ChainTxData {
        &self.chain_tx_data
    }

    /// Bootstrap peers used when DNS seeds are unavailable.
    pub fn fixed_seeds(&self) -> &[SeedAddress] {
        &self.fixed_seeds
    }

    /// DNS seeds queried for bootstrap peers.
    pub fn dns_seeds(&self) -> &[DnsSeed] {
        &self.dns_seeds
    }

    /// Whether only standard transactions are relayed and mined by default.
    pub fn require_standard(&self) -> bool {
        self.require_standard
    }

    /// Whether mining waits until the node has peers.
    pub fn mining_requires_peers(&self) -> bool {
        self.mining_requires_peers
    }

    /// Whether blocks are only mined on explicit request.
    pub fn mine_blocks_on_demand(&self) -> bool {
        self.mine_blocks_on_demand
    }

    /// Whether expensive consistency checks run by default.
    pub fn default_consistency_checks(&self) -> bool {
        self.default_consistency_checks
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use bitcoin::hashes::Hash;

    use super::*;
    use crate::chain::consensus::Deployment;

    fn all() -> Vec<NetworkParams> {
        Network::ALL
            .into_iter()
            .map(|network| NetworkParams::for_network(network).unwrap())
            .collect()
    }

    #[test]
    fn test_all_networks_build() {
        for params in all() {
            params.validate().unwrap();
            assert_eq!(params.network_id(), params.network().as_str());
            assert_eq!(params.consensus().network, params.network());
            assert_eq!(params.message_start(), params.network().magic());
        }
    }

    #[test]
    fn test_golden_genesis_hashes() {
        let expected = [
            "8b587a7b91d2f397ff6af057b3b86950c3ecde9e13d0c30987d9d12691d0c46a",
            "0c3c625b2f209f286441227135050d4f6fa2fded9e3b39f3556e0cf43e240d04",
            "50a135afaf6d89f9e5459263a1a01cf26fb319e7f1b7d5b41c950a261eab5d00",
        ];
        for (params, hash) in all().iter().zip(expected) {
            assert_eq!(params.genesis_hash().to_string(), hash);
            assert_eq!(params.genesis_block().block_hash(), params.genesis_hash());
            assert_eq!(
                params.genesis_block().header.merkle_root.to_string(),
                "650c8f9ff7eb5b8baa0829f9f9f6170d69be2ad9a930d655a8d6373c1c971b2a"
            );
        }
    }

    #[test]
    fn test_distinct_network_identity() {
        let params = all();
        let magics: HashSet<_> = params.iter().map(|p| p.message_start()).collect();
        let ports: HashSet<_> = params.iter().map(|p| p.default_port()).collect();
        let pubkey: HashSet<_> = params
            .iter()
            .map(|p| p.base58_prefix(Base58Type::PubkeyAddress).to_vec())
            .collect();
        assert_eq!(magics.len(), 3);
        assert_eq!(ports.len(), 3);
        assert_eq!(pubkey.len(), 3);
    }

    #[test]
    fn test_checkpoints_start_at_genesis() {
        for params in all() {
            let mut heights = params.checkpoints().iter().map(|(height, _)| height);
            assert_eq!(heights.next(), Some(0));
            let mut previous = 0;
            for height in heights {
                assert!(height > previous);
                previous = height;
            }
            assert_eq!(params.checkpoints().get(0), Some(&params.genesis_hash()));
        }

        let mainnet = NetworkParams::mainnet().unwrap();
        assert_eq!(mainnet.checkpoints().len(), 6);
        let (height, hash) = mainnet.checkpoints().last().unwrap();
        assert_eq!(height, 101);
        assert_eq!(*hash, mainnet.consensus().default_assume_valid);
    }

    #[test]
    fn test_mainnet_values() {
        let params = NetworkParams::mainnet().unwrap();
        assert_eq!(params.default_port(), 16178);
        assert_eq!(params.prune_after_height(), 100_000);
        assert_eq!(params.message_start().to_bytes(), [0xf9; 4]);
        assert_eq!(params.base58_prefix(Base58Type::ScriptAddress), &[123]);
        assert_eq!(params.base58_prefix(Base58Type::SecretKey), &[203]);
        assert_eq!(
            params.base58_prefix(Base58Type::ExtPublicKey),
            &[0x03, 0x0e, 0x1e, 0x94]
        );
        assert_eq!(params.fixed_seeds().len(), 1);
        assert_eq!(params.fixed_seeds()[0].to_string(), "45.77.108.93:16178");
        assert_eq!(params.dns_seeds()[0].host, "45.77.108.93");
        assert!(params.require_standard());
        assert!(params.mining_requires_peers());
        assert!(!params.mine_blocks_on_demand());
        assert!(!params.default_consistency_checks());
    }

    #[test]
    fn test_regtest_values() {
        let params = NetworkParams::regtest().unwrap();
        assert_eq!(params.default_port(), 36178);
        assert_eq!(params.base58_prefix(Base58Type::PubkeyAddress), &[65]);
        assert!(params.fixed_seeds().is_empty());
        assert!(params.dns_seeds().is_empty());
        assert!(!params.require_standard());
        assert!(!params.mining_requires_peers());
        assert!(params.mine_blocks_on_demand());
        assert!(params.default_consistency_checks());
        assert!(params.consensus().no_pow_retargeting);
    }

    #[test]
    fn test_validate_detects_tampering() {
        let mut params = NetworkParams::testnet().unwrap();
        params.consensus.genesis_hash = BlockHash::all_zeros();
        assert!(matches!(
            params.validate(),
            Err(ChainParamsError::ConsensusGenesisMismatch { .. })
        ));

        let mut params = NetworkParams::testnet().unwrap();
        params.genesis.header.nonce = 0;
        assert!(matches!(
            params.validate(),
            Err(ChainParamsError::Genesis(GenesisError::HashMismatch { .. }))
        ));

        let mut params = NetworkParams::mainnet().unwrap();
        let zeros = [(0, BlockHash::all_zeros())];
        params.checkpoints = Checkpoints::from_ordered(zeros).unwrap();
        assert!(matches!(
            params.validate(),
            Err(ChainParamsError::CheckpointGenesisMismatch { .. })
        ));

        let mut params = NetworkParams::regtest().unwrap();
        *params.consensus.deployments.get_mut(DeploymentId::Csv) = Deployment::new(1, 0, 1);
        assert!(matches!(
            params.validate(),
            Err(ChainParamsError::DuplicateDeploymentBits)
        ));

        let mut params = NetworkParams::mainnet().unwrap();
        params.base58_prefixes = Base58Prefixes::new(1, 1, 2, 3, [4; 4], [5; 4]);
        let err = params.validate().unwrap_err();
        assert!(matches!(
            err,
            ChainParamsError::Base58(Base58Error::AmbiguousPrefix { .. })
        ));

        let mut params = NetworkParams::regtest().unwrap();
        params.consensus.pow_limit = Target::from_compact(0x1f0fffff).unwrap();
        assert!(matches!(
            params.validate(),
            Err(ChainParamsError::GenesisAboveLimit { .. })
        ));
    }

    #[test]
    fn test_set_deployment_window() {
        let mut params = NetworkParams::regtest().unwrap();
        params.set_deployment_window(DeploymentId::SegWit, 5, 10);
        let segwit = params.consensus().deployments[DeploymentId::SegWit];
        assert_eq!((segwit.start_time, segwit.timeout), (5, 10));
        assert_eq!(segwit.bit, 1);
    }

    #[test]
    fn test_estimate_tx_count() {
        let data = NetworkParams::mainnet().unwrap().chain_tx_data;
        assert_eq!(data.estimate_tx_count(1_664_438_182), 102);
        assert_eq!(data.estimate_tx_count(1_664_438_282), 202);
        assert_eq!(data.estimate_tx_count(0), 102);

        let idle = NetworkParams::testnet().unwrap().chain_tx_data;
        assert_eq!(idle.estimate_tx_count(i64::MAX), 0);
    }
}
