mod address;

pub use address::SeedAddress;
use bitcoin::{
    consensus::{Decodable, Encodable, encode::Error as EncodeDecodeError},
    io::{Error as IoError, Read, Write},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::network::Network;

/// Network magic bytes to identify the network a message was intended for.
///
/// Every peer-to-peer message on a network is framed with these four bytes,
/// so they must differ between networks and be unlikely to occur in ordinary
/// data: they are rarely used upper ASCII, not valid UTF-8, and form a large
/// 32-bit integer with any alignment.
#[derive(Debug, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Serialize, Deserialize)]
pub struct Magic([u8; 4]);

impl Magic {
    /// Vertoreum main network magic bytes.
    pub const MAINNET: Self = Self([0xf9, 0xf9, 0xf9, 0xf9]);
    /// Vertoreum regression test network magic bytes.
    pub const REGTEST: Self = Self([0xf3, 0xf3, 0xf3, 0xf3]);
    /// Vertoreum test network magic bytes.
    pub const TESTNET: Self = Self([0xf5, 0xf5, 0xf5, 0xf5]);

    /// Creates a Magic from raw bytes, whether or not they name a known
    /// network.
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Returns the magic bytes as a 4-byte array, in wire order.
    pub fn to_bytes(&self) -> [u8; 4] {
        self.0
    }
}

impl From<Network> for Magic {
    fn from(network: Network) -> Self {
        match network {
            Network::Mainnet => Magic::MAINNET,
            Network::Testnet => Magic::TESTNET,
            Network::Regtest => Magic::REGTEST,
        }
    }
}

impl std::fmt::Display for Magic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Encodable for Magic {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, IoError> {
        self.0.consensus_encode(writer)
    }
}

impl Decodable for Magic {
    fn consensus_decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self, EncodeDecodeError> {
        Ok(Magic(Decodable::consensus_decode(reader)?))
    }
}

/// Errors that can occur when working with magic bytes.
#[derive(Debug, PartialEq, Clone, Copy, Error)]
pub enum MagicError {
    /// The magic bytes don't correspond to any known network.
    #[error("unknown network magic: {0}")]
    UnknownMagic(Magic),
}

impl TryFrom<Magic> for Network {
    type Error = MagicError;

    fn try_from(magic: Magic) -> Result<Self, Self::Error> {
        match magic {
            Magic::MAINNET => Ok(Network::Mainnet),
            Magic::TESTNET => Ok(Network::Testnet),
            Magic::REGTEST => Ok(Network::Regtest),
            _ => Err(MagicError::UnknownMagic(magic)),
        }
    }
}
