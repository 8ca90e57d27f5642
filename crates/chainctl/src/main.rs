//! Command line tool for inspecting the Vertoreum network parameters.
//!
//! Selects a network through the process-wide registry, then prints its
//! parameters, rebuilds and checks its genesis block, lists its checkpoints or
//! resolves its DNS seeds.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]

use std::time::Duration;

use bitcoin::consensus;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Registry, fmt::time::ChronoUtc, layer::SubscriberExt, util::SubscriberInitExt,
};
use vertoreum_common::chain::{
    Network, NetworkParams,
    base58::Base58Prefixes,
    blockdata::GenesisInfo,
    chainparams::{ChainTxData, DnsSeed},
    consensus::ConsensusParams,
    p2p::Magic,
    registry::global,
    seeds::resolve_seed_async,
};

#[derive(Parser, Debug)]
#[command(name = "chainctl")]
#[command(author, version, long_about = None)]
#[command(about = "Inspect and verify Vertoreum network parameters.")]
struct Args {
    /// Network to use (main, test, regtest).
    #[arg(short, long, default_value = "main")]
    network: Network,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, default_value_t = false)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the selected network's parameters as JSON.
    Show,
    /// Rebuild the genesis block and check it against the expected hashes.
    Genesis,
    /// List the checkpoint table.
    Checkpoints,
    /// Resolve every DNS seed of the network.
    Resolve {
        /// Per-seed lookup timeout in seconds.
        #[arg(long, default_value_t = 10)]
        timeout: u64,
    },
}

/// JSON view of a parameter set.
#[derive(Serialize)]
struct ParamsSummary<'a> {
    network: Network,
    message_start: Magic,
    default_port: u16,
    prune_after_height: u64,
    genesis_hash: String,
    consensus: &'a ConsensusParams,
    base58_prefixes: &'a Base58Prefixes,
    checkpoints: Vec<(u32, String)>,
    chain_tx_data: &'a ChainTxData,
    fixed_seeds: Vec<String>,
    dns_seeds: &'a [DnsSeed],
    require_standard: bool,
    mining_requires_peers: bool,
    mine_blocks_on_demand: bool,
    default_consistency_checks: bool,
}

impl<'a> From<&'a NetworkParams> for ParamsSummary<'a> {
    fn from(params: &'a NetworkParams) -> Self {
        Self {
            network: params.network(),
            message_start: params.message_start(),
            default_port: params.default_port(),
            prune_after_height: params.prune_after_height(),
            genesis_hash: params.genesis_hash().to_string(),
            consensus: params.consensus(),
            base58_prefixes: params.base58_prefixes(),
            checkpoints: params
                .checkpoints()
                .iter()
                .map(|(height, hash)| (height, hash.to_string()))
                .collect(),
            chain_tx_data: params.chain_tx_data(),
            fixed_seeds: params
                .fixed_seeds()
                .iter()
                .map(ToString::to_string)
                .collect(),
            dns_seeds: params.dns_seeds(),
            require_standard: params.require_standard(),
            mining_requires_peers: params.mining_requires_peers(),
            mine_blocks_on_demand: params.mine_blocks_on_demand(),
            default_consistency_checks: params.default_consistency_checks(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_tracing(&args)?;

    let params = global::select_network(args.network.as_str())?;
    info!(network = %params.network(), "Using network parameters");

    match args.command {
        Command::Show => show(params)?,
        Command::Genesis => genesis(params)?,
        Command::Checkpoints => checkpoints(params),
        Command::Resolve { timeout } => resolve(params, Duration::from_secs(timeout)).await,
    }

    Ok(())
}

fn show(params: &NetworkParams) -> Result<(), Box<dyn std::error::Error>> {
    let summary = ParamsSummary::from(params);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn genesis(params: &NetworkParams) -> Result<(), Box<dyn std::error::Error>> {
    let info = GenesisInfo::for_network(params.network());
    let block = info.build_verified()?;
    if block != *params.genesis_block() {
        let message = "rebuilt genesis block differs from the registered one";
        return Err(message.into());
    }

    println!("hash:        {}", block.block_hash());
    println!("merkle root: {}", block.header.merkle_root);
    println!("time:        {}", block.header.time);
    println!("nonce:       {}", block.header.nonce);
    println!("bits:        {:#010x}", block.header.bits.to_consensus());
    println!("raw:         {}", hex::encode(consensus::serialize(&block)));
    Ok(())
}

fn checkpoints(params: &NetworkParams) {
    for (height, hash) in params.checkpoints().iter() {
        println!("{height:>8} {hash}");
    }
}

async fn resolve(params: &NetworkParams, timeout: Duration) {
    for seed in params.fixed_seeds() {
        println!("fixed {seed}");
    }

    if params.dns_seeds().is_empty() {
        info!(network = %params.network(), "No DNS seeds configured");
        return;
    }

    for seed in params.dns_seeds() {
        let lookup = resolve_seed_async(&seed.host, params.default_port());
        match tokio::time::timeout(timeout, lookup).await {
            Ok(Ok(address)) => println!("{} {address}", seed.name),
            Ok(Err(err)) => warn!(seed = %seed.name, "{err}"),
            Err(_) => warn!(seed = %seed.name, ?timeout, "Seed lookup timed out"),
        }
    }
}

fn init_tracing(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let level = match args.log_level.as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "info" => tracing::Level::INFO,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => {
            eprintln!(
                "Invalid log level: {}. Using 'info' as default.",
                args.log_level
            );
            tracing::Level::INFO
        }
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
        .add_directive("tokio=warn".parse()?);

    let use_ansi = std::io::IsTerminal::is_terminal(&std::io::stderr()) && !args.no_color;

    let subscriber = Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_level(true)
            .with_target(true)
            .with_thread_ids(args.verbose)
            .with_thread_names(args.verbose)
            .with_ansi(use_ansi)
            .with_file(args.verbose)
            .with_line_number(args.verbose)
            .with_timer(ChronoUtc::rfc_3339()),
    );

    subscriber.try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_network_aliases() {
        let args = Args::try_parse_from(["chainctl", "--network", "testnet", "show"]).unwrap();
        assert_eq!(args.network, Network::Testnet);
        let args = Args::try_parse_from(["chainctl", "genesis"]).unwrap();
        assert_eq!(args.network, Network::Mainnet);
        let parsed = Args::try_parse_from(["chainctl", "--network", "bogus", "show"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_resolve_timeout() {
        let args = Args::try_parse_from(["chainctl", "resolve", "--timeout", "3"]).unwrap();
        assert!(matches!(args.command, Command::Resolve { timeout: 3 }));
    }

    #[test]
    fn test_summary_serializes() {
        let params = NetworkParams::regtest().unwrap();
        let json = serde_json::to_value(ParamsSummary::from(&params)).unwrap();
        assert_eq!(json["network"], "regtest");
        assert_eq!(json["default_port"], 36178);
        assert_eq!(
            json["genesis_hash"],
            "50a135afaf6d89f9e5459263a1a01cf26fb319e7f1b7d5b41c950a261eab5d00"
        );
        assert_eq!(json["checkpoints"].as_array().unwrap().len(), 1);
    }
}
