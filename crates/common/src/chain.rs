/// Base58 address version bytes.
pub mod base58;
/// Block data structures, including the genesis block constructor.
pub mod blockdata;
/// Per-network parameter sets.
pub mod chainparams;
/// Hard-coded checkpoint anchors.
pub mod checkpoints;
/// Consensus rule sets and soft-fork deployments.
pub mod consensus;
/// Network types and constants.
pub mod network;
/// Peer-to-peer framing and address records.
pub mod p2p;
/// Proof of Work related functionality.
pub mod pow;
/// Process-wide parameter selection.
pub mod registry;
/// DNS seed resolution.
pub mod seeds;
/// Various utility functions and types.
pub mod util;

pub use chainparams::{ChainParamsError, NetworkParams};
pub use network::Network;
pub use registry::{ChainRegistry, RegistryError};
