//! Command-line arguments

use clap::{Parser, Subcommand};
use polygon_sdk::{BlockNumberOrTag, ClientConfig, Network};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "polygon", version, about = "Query and transact on a Polygon node")]
pub struct Cli {
    /// JSON-RPC endpoint (overrides POLYGON_PROVIDER_URL and --config)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Start from the Amoy testnet defaults instead of mainnet
    #[arg(long, global = true, conflicts_with = "config")]
    pub amoy: bool,

    /// Log at DEBUG instead of INFO (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a block as JSON
    Block {
        /// Block number (decimal or 0x hex) or tag (latest, pending, earliest, safe, finalized)
        #[arg(default_value = "latest", value_parser = parse_block_id)]
        id: BlockNumberOrTag,
    },
    /// Print a transaction as JSON
    Tx { hash: String },
    /// Print the POL balance of an address
    Balance { address: String },
    /// Send POL signed with PRIVATE_KEY
    Send {
        to: String,
        /// Amount in POL, e.g. 0.1
        amount: String,
        #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },
    /// Call a read-only contract function
    Call {
        contract: String,
        /// Path to the contract's JSON ABI
        abi: PathBuf,
        function: String,
        args: Vec<String>,
    },
    /// Invoke a state-mutating contract function signed with PRIVATE_KEY
    Invoke {
        contract: String,
        /// Path to the contract's JSON ABI
        abi: PathBuf,
        function: String,
        args: Vec<String>,
        #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
    },
    /// Print the raw ERC-20 balance of a wallet (decimals not applied)
    Erc20Balance { token: String, wallet: String },
}

impl Cli {
    /// Resolves the client configuration from the process environment.
    pub fn client_config(&self) -> polygon_sdk::Result<ClientConfig> {
        self.client_config_with(|key| std::env::var(key).ok())
    }

    /// A `--config` file is taken as is. Otherwise the network preset is
    /// overlaid with `POLYGON_*` variables from `lookup`. `--rpc-url` wins
    /// over both.
    pub fn client_config_with<F>(&self, lookup: F) -> polygon_sdk::Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None if self.amoy => ClientConfig::for_network(Network::Amoy).with_lookup(lookup)?,
            None => ClientConfig::from_lookup(lookup)?,
        };
        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
        }
        Ok(config)
    }
}

fn parse_block_id(raw: &str) -> Result<BlockNumberOrTag, String> {
    if let Ok(number) = raw.parse::<u64>() {
        return Ok(BlockNumberOrTag::Number(number));
    }
    BlockNumberOrTag::from_str(raw).map_err(|e| format!("invalid block identifier '{raw}': {e}"))
}
