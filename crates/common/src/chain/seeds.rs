//! Resolution of seed hostnames into [`SeedAddress`] records.
//!
//! Each call is independent and holds no shared state. Neither resolver
//! applies a timeout or retries; callers own that policy.

use std::net::{SocketAddr, ToSocketAddrs};

use thiserror::Error;
use tracing::{debug, info};

use crate::chain::p2p::SeedAddress;

/// Errors from resolving a seed hostname.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The system resolver failed for this host.
    #[error("Failed to resolve seed {host}: {source}")]
    Resolution {
        /// The hostname that was looked up
        host: String,
        /// The resolver error
        #[source]
        source: std::io::Error,
    },
    /// The lookup succeeded but returned no addresses.
    #[error("Seed {host} resolved to no addresses")]
    NoAddress {
        /// The hostname that was looked up
        host: String,
    },
}

/// Picks the first IPv4 result, else the first result.
fn pick(host: &str, addrs: impl Iterator<Item = SocketAddr>) -> Result<SeedAddress, SeedError> {
    let addrs: Vec<SocketAddr> = addrs.collect();
    debug!(host, count = addrs.len(), "Seed lookup returned addresses");
    let chosen = addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .ok_or_else(|| SeedError::NoAddress {
            host: host.to_string(),
        })?;
    let seed = SeedAddress::from(*chosen);
    info!(host, seed = %seed, "Resolved seed");
    Ok(seed)
}

/// Resolves `host` and returns a seed record carrying `port`.
///
/// Blocks the calling thread on the system resolver; run it from a bootstrap
/// thread, or use [`resolve_seed_async`] inside a Tokio runtime.
///
/// # Arguments
///
/// * `host` - A hostname or IP literal
/// * `port` - The port attached to the resulting record
pub fn resolve_seed(host: &str, port: u16) -> Result<SeedAddress, SeedError> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| SeedError::Resolution {
            host: host.to_string(),
            source,
        })?;
    pick(host, addrs)
}

/// Resolves `host` on the Tokio runtime and returns a seed record carrying
/// `port`. Same address preference as [`resolve_seed`].
pub async fn resolve_seed_async(host: &str, port: u16) -> Result<SeedAddress, SeedError> {
    let addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|source| SeedError::Resolution {
            host: host.to_string(),
            source,
        })?;
    pick(host, addrs)
}
