//! Network parameter registry for the Vertoreum chain.
//!
//! This library declares, builds and validates the per-network parameter sets
//! (mainnet, testnet, regtest) that every other node subsystem consults:
//! consensus rules, the genesis block, address version bytes, checkpoints,
//! soft-fork deployment windows and bootstrap seeds.

#![cfg_attr(test, allow(clippy::arithmetic_side_effects))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::cast_sign_loss))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::cast_possible_truncation))]

/// Types and functions describing the Vertoreum networks.
pub mod chain;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
