use bitcoin::{BlockHash, hashes::Hash};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::chain::{
    blockdata::genesis::GenesisInfo,
    consensus::deployment::{Deployment, Deployments},
    network::Network,
    pow::{Target, Work},
};

/// Start of the mainnet signalling windows (the mainnet genesis time).
const MAINNET_DEPLOYMENT_START: i64 = 1_664_416_111;
/// End of the mainnet signalling windows.
const MAINNET_DEPLOYMENT_TIMEOUT: i64 = 1_664_433_000;

/// Consensus parameters for different networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Network for which these parameters are defined.
    pub network: Network,
    /// Hash of the genesis block. Replaced by the hash of the constructed
    /// genesis header when the network parameter set is built.
    pub genesis_hash: BlockHash,
    /// Number of blocks between block reward halvings.
    pub subsidy_halving_interval: u32,
    /// The block height which BIP34 becomes active.
    pub bip34_height: u32,
    /// The hash of the block at `bip34_height`, if it is known.
    pub bip34_hash: Option<BlockHash>,
    /// The block height which BIP65 becomes active.
    pub bip65_height: u32,
    /// The block height which BIP66 becomes active.
    pub bip66_height: u32,
    /// The maximum attainable (easiest) target for these params.
    pub pow_limit: Target,
    /// Difficulty recalculation window, in seconds.
    pub pow_target_timespan: u64,
    /// Expected amount of time to mine one block, in seconds.
    pub pow_target_spacing: u64,
    /// Determines whether minimal difficulty may be used for blocks or not.
    pub allow_min_difficulty_blocks: bool,
    /// Determines whether retargeting is disabled for this network or not.
    pub no_pow_retargeting: bool,
    /// Minimum blocks including miner confirmation of the total of
    /// `miner_confirmation_window` blocks, used for version-bits deployments.
    pub rule_change_activation_threshold: u32,
    /// Number of blocks with the same set of rules.
    pub miner_confirmation_window: u32,
    /// Version-bits soft-fork deployments.
    pub deployments: Deployments,
    /// The best chain should have at least this much work.
    pub minimum_chain_work: Work,
    /// By default assume that the signatures in ancestors of this block are
    /// valid.
    pub default_assume_valid: BlockHash,
}

impl ConsensusParams {
    /// Returns the consensus parameters for the specified network.
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
            Network::Regtest => Self::regtest(),
        }
    }

    /// Consensus parameters for the Vertoreum mainnet network.
    pub fn mainnet() -> Self {
        let genesis = GenesisInfo::mainnet();
        Self {
            network: Network::Mainnet,
            genesis_hash: genesis.hash,
            subsidy_halving_interval: 105_000,
            bip34_height: 0,
            bip34_hash: Some(genesis.hash),
            bip65_height: 0,
            bip66_height: 0,
            // 000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff
            pow_limit: Target::new(U256([u64::MAX, u64::MAX, u64::MAX, 0x000f_ffff_ffff_ffff])),
            pow_target_timespan: 2 * 24 * 60 * 60, // two days
            pow_target_spacing: 5 * 60,            // 5 minutes
            allow_min_difficulty_blocks: false,
            no_pow_retargeting: false,
            rule_change_activation_threshold: 18, // 75% of 24
            miner_confirmation_window: 24,
            deployments: Deployments::new(
                Deployment::new(28, MAINNET_DEPLOYMENT_START, MAINNET_DEPLOYMENT_TIMEOUT),
                Deployment::new(0, MAINNET_DEPLOYMENT_START, MAINNET_DEPLOYMENT_TIMEOUT),
                Deployment::new(1, MAINNET_DEPLOYMENT_START, MAINNET_DEPLOYMENT_TIMEOUT),
            ),
            minimum_chain_work: Work::new(U256([0x01ab_acf1, 0, 0, 0])),
            // b1e34a46b3e93a10791969c4fe539f4d4f3c9e6bc3af3335da451208b305bf65 (height 101)
            default_assume_valid: BlockHash::from_byte_array([
                0x65, 0xbf, 0x05, 0xb3, 0x08, 0x12, 0x45, 0xda, 0x35, 0x33, 0xaf, 0xc3, 0x6b, 0x9e,
                0x3c, 0x4f, 0x4d, 0x9f, 0x53, 0xfe, 0xc4, 0x69, 0x19, 0x79, 0x10, 0x3a, 0xe9, 0xb3,
                0x46, 0x4a, 0xe3, 0xb1,
            ]),
        }
    }

    /// Consensus parameters for the Vertoreum testnet network.
    pub fn testnet() -> Self {
        let genesis = GenesisInfo::testnet();
        Self {
            network: Network::Testnet,
            genesis_hash: genesis.hash,
            subsidy_halving_interval: 105_000,
            bip34_height: 0,
            bip34_hash: Some(genesis.hash),
            bip65_height: 0,
            bip66_height: 0,
            pow_limit: Target::new(U256([u64::MAX, u64::MAX, u64::MAX, 0x000f_ffff_ffff_ffff])),
            pow_target_timespan: 7 * 24 * 60 * 60 / 2, // 3.5 days
            pow_target_spacing: 30,
            allow_min_difficulty_blocks: true,
            no_pow_retargeting: false,
            rule_change_activation_threshold: 180, // 75% of 240
            miner_confirmation_window: 240,
            deployments: Deployments::new(
                Deployment::new(28, 0, Deployment::NO_TIMEOUT),
                Deployment::new(0, 0, Deployment::NO_TIMEOUT),
                Deployment::new(1, 0, Deployment::NO_TIMEOUT),
            ),
            minimum_chain_work: Work::new(U256([0x0010_0010, 0, 0, 0])),
            default_assume_valid: genesis.hash,
        }
    }

    /// Consensus parameters for the Vertoreum regtest network.
    pub fn regtest() -> Self {
        let genesis = GenesisInfo::regtest();
        Self {
            network: Network::Regtest,
            genesis_hash: genesis.hash,
            subsidy_halving_interval: 150,
            bip34_height: 100_000_000, // Far in the future so version 1 blocks are accepted
            bip34_hash: None,
            bip65_height: 1351,
            bip66_height: 1251,
            // 7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff
            pow_limit: Target::new(U256([u64::MAX, u64::MAX, u64::MAX, 0x7fff_ffff_ffff_ffff])),
            pow_target_timespan: 7 * 24 * 60 * 60 / 2, // 3.5 days
            pow_target_spacing: 30,
            allow_min_difficulty_blocks: true,
            no_pow_retargeting: true,
            rule_change_activation_threshold: 108, // 75% of 144
            miner_confirmation_window: 144,
            deployments: Deployments::new(
                Deployment::new(28, 0, Deployment::NO_TIMEOUT),
                Deployment::new(0, 0, Deployment::NO_TIMEOUT),
                Deployment::new(1, 0, Deployment::NO_TIMEOUT),
            ),
            minimum_chain_work: Work::new(U256([0x0010_0010, 0, 0, 0])),
            default_assume_valid: genesis.hash,
        }
    }

    /// Number of blocks between difficulty retargets.
    pub fn difficulty_adjustment_interval(&self) -> u64 {
        self.pow_target_timespan
            .checked_div(self.pow_target_spacing)
            .unwrap_or(0)
    }

    /// Compact encoding of `pow_limit`, the easiest `bits` a header may carry.
    pub fn pow_limit_bits(&self) -> Option<u32> {
        self.pow_limit.to_compact()
    }

    /// Returns true if BIP34 rules apply at `height`.
    pub fn is_bip34_active(&self, height: u32) -> bool {
        height >= self.bip34_height
    }

    /// Returns true if BIP65 rules apply at `height`.
    pub fn is_bip65_active(&self, height: u32) -> bool {
        height >= self.bip65_height
    }

    /// Returns true if BIP66 rules apply at `height`.
    pub fn is_bip66_active(&self, height: u32) -> bool {
        height >= self.bip66_height
    }
}
