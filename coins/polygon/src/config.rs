use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PolygonError, Result};

// Chain IDs
pub const POLYGON_MAINNET_CHAIN_ID: u64 = 137;
pub const POLYGON_AMOY_CHAIN_ID: u64 = 80002; // New testnet (Mumbai deprecated)

/// Gas limit applied to every outbound transaction unless overridden
pub const DEFAULT_GAS_LIMIT: u64 = 2_000_000;

/// 20 gwei, in wei
pub const DEFAULT_GAS_PRICE_WEI: u128 = 20_000_000_000;

/// Environment variable holding the JSON-RPC endpoint
pub const ENV_PROVIDER_URL: &str = "POLYGON_PROVIDER_URL";
/// Environment variable overriding the chain id
pub const ENV_CHAIN_ID: &str = "POLYGON_CHAIN_ID";
/// Environment variable overriding the gas limit
pub const ENV_GAS_LIMIT: &str = "POLYGON_GAS_LIMIT";
/// Environment variable overriding the gas price, in gwei
pub const ENV_GAS_PRICE_GWEI: &str = "POLYGON_GAS_PRICE_GWEI";

/// Known Polygon networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Amoy,
}

impl Network {
    /// Resolve a network from its chain id
    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        match chain_id {
            POLYGON_MAINNET_CHAIN_ID => Some(Self::Mainnet),
            POLYGON_AMOY_CHAIN_ID => Some(Self::Amoy),
            _ => None,
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Mainnet => POLYGON_MAINNET_CHAIN_ID,
            Self::Amoy => POLYGON_AMOY_CHAIN_ID,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => "Polygon Mainnet",
            Self::Amoy => "Polygon Amoy Testnet",
        }
    }

    /// Native currency symbol (rebranded from MATIC)
    pub fn currency_symbol(&self) -> &'static str {
        "POL"
    }

    /// Public endpoint used when no URL is configured
    pub fn default_rpc(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://polygon-rpc.com",
            Self::Amoy => "https://rpc-amoy.polygon.technology",
        }
    }

    pub fn explorer(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://polygonscan.com",
            Self::Amoy => "https://amoy.polygonscan.com",
        }
    }
}

/// Client configuration.
///
/// Gas economics are plain fields with defaults so they can be tuned as
/// network conditions change instead of being baked into the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub rpc_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default = "default_gas_price_wei")]
    pub gas_price_wei: u128,
}

fn default_chain_id() -> u64 {
    POLYGON_MAINNET_CHAIN_ID
}

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

fn default_gas_price_wei() -> u128 {
    DEFAULT_GAS_PRICE_WEI
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_network(Network::Mainnet)
    }
}

impl ClientConfig {
    /// Config for `rpc_url` with mainnet defaults for everything else
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id: POLYGON_MAINNET_CHAIN_ID,
            gas_limit: DEFAULT_GAS_LIMIT,
            gas_price_wei: DEFAULT_GAS_PRICE_WEI,
        }
    }

    /// Config pointing at the public endpoint of `network`
    pub fn for_network(network: Network) -> Self {
        Self {
            chain_id: network.chain_id(),
            ..Self::new(network.default_rpc())
        }
    }

    /// Polygon Mainnet configuration
    pub fn mainnet() -> Self {
        Self::for_network(Network::Mainnet)
    }

    /// Polygon Amoy Testnet configuration (replaced Mumbai)
    pub fn amoy() -> Self {
        Self::for_network(Network::Amoy)
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_gas_price_wei(mut self, gas_price_wei: u128) -> Self {
        self.gas_price_wei = gas_price_wei;
        self
    }

    /// The known network matching `chain_id`, if any
    pub fn network(&self) -> Option<Network> {
        Network::from_chain_id(self.chain_id)
    }

    /// Reads the configuration from the process environment.
    ///
    /// `POLYGON_PROVIDER_URL` falls back to the public mainnet endpoint.
    /// The signing key is deliberately not part of the configuration.
    pub fn from_env() -> Result<Self> {
        Self::mainnet().with_env()
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::mainnet().with_lookup(lookup)
    }

    /// Applies any `POLYGON_*` variables set in the process environment on
    /// top of this configuration.
    pub fn with_env(self) -> Result<Self> {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`with_env`](Self::with_env) with an arbitrary variable source.
    pub fn with_lookup<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_PROVIDER_URL) {
            self.rpc_url = url;
        }
        if let Some(raw) = lookup(ENV_CHAIN_ID) {
            self.chain_id = parse_var(ENV_CHAIN_ID, &raw)?;
        }
        if let Some(raw) = lookup(ENV_GAS_LIMIT) {
            self.gas_limit = parse_var(ENV_GAS_LIMIT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_GAS_PRICE_GWEI) {
            let gwei: u128 = parse_var(ENV_GAS_PRICE_GWEI, &raw)?;
            self.gas_price_wei = gwei.checked_mul(1_000_000_000).ok_or_else(|| {
                PolygonError::Config(format!("{ENV_GAS_PRICE_GWEI} overflows: {raw}"))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Loads a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PolygonError::Config(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| PolygonError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PolygonError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), json)
            .map_err(|e| PolygonError::Config(format!("{}: {e}", path.as_ref().display())))
    }

    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.trim().is_empty() {
            return Err(PolygonError::Config("rpc_url is empty".to_string()));
        }
        if self.gas_limit == 0 {
            return Err(PolygonError::Config("gas_limit must be non-zero".to_string()));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| PolygonError::Config(format!("{key}={raw}: {e}")))
}
