use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::p2p::Magic;

/// Error returned when a network name does not match any known network.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Unknown network: {0}")]
pub struct UnknownNetworkError(pub String);

/// The Vertoreum network variants.
///
/// The set is closed: every parameter set in the registry is tagged with
/// exactly one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Network {
    /// Mainnet Vertoreum network.
    #[serde(rename = "main")]
    Mainnet,
    /// Testnet Vertoreum network.
    #[serde(rename = "test")]
    Testnet,
    /// Regtest Vertoreum network.
    #[serde(rename = "regtest")]
    Regtest,
}

impl Network {
    /// Every network, in registry order.
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Testnet, Network::Regtest];

    /// Converts a magic value to the corresponding Network variant.
    ///
    /// # Arguments
    ///
    /// * `magic` - The magic bytes to convert
    ///
    /// # Returns
    ///
    /// * `Some(Network)` - The corresponding network if the magic is recognized
    /// * `None` - If the magic bytes don't match any known network
    pub fn from_magic(magic: Magic) -> Option<Network> {
        Network::try_from(magic).ok()
    }

    /// Returns the magic bytes for this network.
    pub fn magic(self) -> Magic {
        Magic::from(self)
    }

    /// Returns the network identifier used in configuration and logs.
    ///
    /// # Returns
    ///
    /// One of `"main"`, `"test"` or `"regtest"`
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "main",
            Network::Testnet => "test",
            Network::Regtest => "regtest",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = UnknownNetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::try_from(s)
    }
}

impl TryFrom<&str> for Network {
    type Error = UnknownNetworkError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "main" | "mainnet" => Ok(Network::Mainnet),
            "test" | "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            other => Err(UnknownNetworkError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Network {
    type Error = UnknownNetworkError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Network::try_from(s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_names_round_trip() {
        for network in Network::ALL {
            assert_eq!(network.as_str().parse::<Network>().unwrap(), network);
            assert_eq!(network.to_string(), network.as_str());
        }
    }

    #[test]
    fn test_network_aliases() {
        assert_eq!(Network::try_from("mainnet").unwrap(), Network::Mainnet);
        assert_eq!(Network::try_from("testnet").unwrap(), Network::Testnet);
    }

    #[test]
    fn test_unknown_network_names_offending_string() {
        let err = "bogus".parse::<Network>().unwrap_err();
        assert_eq!(err, UnknownNetworkError("bogus".to_string()));
        assert_eq!(err.to_string(), "Unknown network: bogus");
    }

    #[test]
    fn test_network_serde_uses_identifier() {
        let json = serde_json::to_string(&Network::Regtest).unwrap();
        assert_eq!(json, "\"regtest\"");
        let network: Network = serde_json::from_str("\"test\"").unwrap();
        assert_eq!(network, Network::Testnet);
    }
}
