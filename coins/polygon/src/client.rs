use alloy::dyn_abi::DynSolValue;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{Block, BlockNumberOrTag, Transaction, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use alloy::transports::TransportError;
use std::future::Future;
use tracing::instrument::WithSubscriber;
use tracing::Dispatch;

use crate::account::{parse_address, parse_tx_hash, signer_from_private_key};
use crate::config::ClientConfig;
use crate::contract::{ContractFunction, ERC20_BALANCE_OF_ABI};
use crate::error::{PolygonError, Result};
use crate::transaction::OutboundTransaction;

/// JSON-RPC client for a Polygon node.
///
/// Every operation is a single request/response exchange (two for the
/// send paths, which read the nonce first). Failures are logged at ERROR
/// through the client's log dispatch and returned as [`PolygonError`].
///
/// # Nonce hazard
///
/// [`send_transaction`](Self::send_transaction) and
/// [`send_contract_transaction`](Self::send_contract_transaction) fetch the
/// sender's nonce from the node on every call and keep no local counter.
/// Two concurrent sends from the same key can therefore read the same
/// nonce; the node will reject or replace one of them. Callers that send
/// concurrently from one account must serialize those sends themselves,
/// for example with a per-sender mutex around the call.
pub struct PolygonClient {
    endpoint: String,
    config: ClientConfig,
    node_chain_id: u64,
    provider: DynProvider,
    dispatch: Dispatch,
}

/// Builder for [`PolygonClient`]
#[derive(Debug, Clone)]
pub struct PolygonClientBuilder {
    config: ClientConfig,
    dispatch: Option<Dispatch>,
}

impl PolygonClientBuilder {
    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.config.chain_id = chain_id;
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.config.gas_limit = gas_limit;
        self
    }

    pub fn gas_price_wei(mut self, gas_price_wei: u128) -> Self {
        self.config.gas_price_wei = gas_price_wei;
        self
    }

    /// Routes every log event of the client to `dispatch`.
    ///
    /// Without this the dispatcher that is the default when
    /// [`connect`](Self::connect) runs is captured instead.
    pub fn log_dispatch(mut self, dispatch: impl Into<Dispatch>) -> Self {
        self.dispatch = Some(dispatch.into());
        self
    }

    /// Opens the connection and checks that the endpoint answers
    /// `eth_chainId`.
    pub async fn connect(self) -> Result<PolygonClient> {
        let dispatch = self
            .dispatch
            .unwrap_or_else(|| tracing::dispatcher::get_default(Dispatch::clone));
        let config = self.config;
        let endpoint = config.rpc_url.as_str();

        let (provider, node_chain_id) = async {
            match open(&config).await {
                Ok((provider, node_chain_id)) => {
                    tracing::info!(endpoint, chain_id = node_chain_id, "Connected to Polygon provider");
                    if node_chain_id != config.chain_id {
                        tracing::warn!(
                            endpoint,
                            node_chain_id,
                            configured_chain_id = config.chain_id,
                            "Node chain id differs from configured chain id"
                        );
                    }
                    Ok((provider, node_chain_id))
                }
                Err(e) => {
                    tracing::error!(endpoint, error = %e, "Failed to connect to Polygon provider");
                    Err(e)
                }
            }
        }
        .with_subscriber(dispatch.clone())
        .await?;

        Ok(PolygonClient {
            endpoint: config.rpc_url.clone(),
            config,
            node_chain_id,
            provider,
            dispatch,
        })
    }
}

async fn open(config: &ClientConfig) -> Result<(DynProvider, u64)> {
    config.validate()?;
    let connection_error = |reason: String| PolygonError::Connection {
        endpoint: config.rpc_url.clone(),
        reason,
    };

    let url: Url = config
        .rpc_url
        .parse()
        .map_err(|e| connection_error(format!("Invalid URL: {e}")))?;
    let provider = ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_http(url)
        .erased();
    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| connection_error(e.to_string()))?;
    Ok((provider, chain_id))
}

impl PolygonClient {
    /// Connects to `rpc_url` with mainnet defaults.
    pub async fn connect(rpc_url: impl Into<String>) -> Result<Self> {
        Self::builder(rpc_url).connect().await
    }

    /// Connects with an explicit configuration.
    pub async fn connect_with_config(config: ClientConfig) -> Result<Self> {
        Self::from_config(config).connect().await
    }

    pub fn builder(rpc_url: impl Into<String>) -> PolygonClientBuilder {
        Self::from_config(ClientConfig::new(rpc_url))
    }

    pub fn from_config(config: ClientConfig) -> PolygonClientBuilder {
        PolygonClientBuilder {
            config,
            dispatch: None,
        }
    }

    /// The endpoint this client is connected to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Chain id reported by the node at connection time
    pub fn chain_id(&self) -> u64 {
        self.node_chain_id
    }

    /// Runs `fut` with this client's log dispatch as the default.
    fn logged<F: Future>(&self, fut: F) -> tracing::instrument::WithDispatch<F> {
        fut.with_subscriber(self.dispatch.clone())
    }

    /// Current head block number.
    pub async fn get_block_number(&self) -> Result<u64> {
        self.logged(async {
            self.provider.get_block_number().await.map_err(|e| {
                tracing::error!(endpoint = %self.endpoint, error = %e, "Failed to get block number");
                rpc_error(e)
            })
        })
        .await
    }

    /// Fetches the head block. Same as `get_block(BlockNumberOrTag::Latest)`.
    pub async fn get_latest_block(&self) -> Result<Block> {
        self.get_block(BlockNumberOrTag::Latest).await
    }

    /// Fetches a block by number or tag, with transaction hashes only.
    ///
    /// A block the node does not have yields [`PolygonError::BlockNotFound`].
    pub async fn get_block(&self, id: impl Into<BlockNumberOrTag>) -> Result<Block> {
        let id = id.into();
        self.logged(async {
            match self.provider.get_block_by_number(id).await {
                Ok(Some(block)) => Ok(block),
                Ok(None) => {
                    tracing::error!(block = %id, "Block not found");
                    Err(PolygonError::BlockNotFound(id.to_string()))
                }
                Err(e) => {
                    tracing::error!(block = %id, error = %e, "Failed to get block");
                    Err(rpc_error(e))
                }
            }
        })
        .await
    }

    /// Fetches a transaction by its 0x-prefixed hash.
    pub async fn get_transaction(&self, hash: &str) -> Result<Transaction> {
        self.logged(async {
            let tx_hash = parse_tx_hash(hash).inspect_err(|e| {
                tracing::error!(hash, error = %e, "Invalid transaction hash");
            })?;
            match self.provider.get_transaction_by_hash(tx_hash).await {
                Ok(Some(tx)) => Ok(tx),
                Ok(None) => {
                    tracing::error!(hash, "Transaction not found");
                    Err(PolygonError::TransactionNotFound(hash.to_string()))
                }
                Err(e) => {
                    tracing::error!(hash, error = %e, "Failed to get transaction");
                    Err(rpc_error(e))
                }
            }
        })
        .await
    }

    /// Balance of `address` in wei at the latest block.
    pub async fn get_balance(&self, address: &str) -> Result<U256> {
        self.logged(async {
            let account = parse_address(address).inspect_err(|e| {
                tracing::error!(address, error = %e, "Error getting balance");
            })?;
            self.provider.get_balance(account).await.map_err(|e| {
                tracing::error!(address, error = %e, "Error getting balance");
                rpc_error(e)
            })
        })
        .await
    }

    /// Transaction count of `address`, i.e. the nonce its next
    /// transaction must use.
    pub async fn get_nonce(&self, address: Address) -> Result<u64> {
        self.logged(self.fetch_nonce(address)).await
    }

    async fn fetch_nonce(&self, address: Address) -> Result<u64> {
        let nonce = self.provider.get_transaction_count(address).await.map_err(|e| {
            tracing::error!(address = %address, error = %e, "Failed to get transaction count");
            rpc_error(e)
        })?;
        tracing::debug!(address = %address, nonce, "Fetched nonce");
        Ok(nonce)
    }

    /// Sends `amount_wei` of POL from the account of `private_key` to
    /// `to_address` and returns the transaction hash as 0x hex.
    ///
    /// Uses the configured gas limit, gas price and chain id, and a nonce
    /// read from the node during this call. See the type-level docs for
    /// the concurrency hazard this implies.
    pub async fn send_transaction(
        &self,
        private_key: &str,
        to_address: &str,
        amount_wei: U256,
    ) -> Result<String> {
        self.logged(async {
            let result = async {
                let signer = signer_from_private_key(private_key)?;
                let to = parse_address(to_address)?;
                let tx = OutboundTransaction::transfer(to, amount_wei, &self.config);
                self.sign_and_broadcast(&signer, tx).await
            }
            .await;

            match &result {
                Ok(hash) => tracing::info!(tx_hash = %hash, to = to_address, value = %amount_wei, "Transaction sent"),
                Err(e) => tracing::error!(to = to_address, error = %e, "Transaction error"),
            }
            result
        })
        .await
    }

    /// Calls a read-only contract function and returns its decoded outputs.
    ///
    /// `args` are given as strings and coerced to the parameter types
    /// declared in `abi_json` (`"0x…"` for addresses, decimal or hex for
    /// integers, `"[a,b]"` for arrays, `"(a,b)"` for tuples).
    pub async fn call_contract_function<S: AsRef<str>>(
        &self,
        contract_address: &str,
        abi_json: &str,
        function_name: &str,
        args: &[S],
    ) -> Result<Vec<DynSolValue>> {
        self.logged(async {
            let result = async {
                let contract = parse_address(contract_address)?;
                let function = ContractFunction::resolve(abi_json, function_name, args)?;
                let request = TransactionRequest::default()
                    .with_to(contract)
                    .with_input(function.calldata()?);
                let output: Bytes = self.provider.call(request).await.map_err(|e| {
                    PolygonError::ContractCall {
                        function: function_name.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                function.decode_output(&output)
            }
            .await;

            if let Err(e) = &result {
                tracing::error!(
                    contract = contract_address,
                    function = function_name,
                    error = %e,
                    "Error calling contract function"
                );
            }
            result
        })
        .await
    }

    /// Signs and broadcasts a state-mutating contract call and returns
    /// the transaction hash as 0x hex.
    ///
    /// Resolution of `function_name` and `args` follows
    /// [`call_contract_function`](Self::call_contract_function); gas,
    /// chain id and nonce follow [`send_transaction`](Self::send_transaction).
    pub async fn send_contract_transaction<S: AsRef<str>>(
        &self,
        private_key: &str,
        contract_address: &str,
        abi_json: &str,
        function_name: &str,
        args: &[S],
    ) -> Result<String> {
        self.logged(async {
            let result = async {
                let contract = parse_address(contract_address)?;
                let function = ContractFunction::resolve(abi_json, function_name, args)?;
                let signer = signer_from_private_key(private_key)?;
                let tx = OutboundTransaction::contract_call(contract, function.calldata()?, &self.config);
                self.sign_and_broadcast(&signer, tx).await
            }
            .await;

            match &result {
                Ok(hash) => tracing::info!(
                    tx_hash = %hash,
                    contract = contract_address,
                    function = function_name,
                    "Contract transaction sent"
                ),
                Err(e) => tracing::error!(
                    contract = contract_address,
                    function = function_name,
                    error = %e,
                    "Error sending contract transaction"
                ),
            }
            result
        })
        .await
    }

    /// Raw ERC-20 balance of `wallet_address` in the token's smallest unit.
    ///
    /// Token decimals are not applied.
    pub async fn get_erc20_balance(&self, token_address: &str, wallet_address: &str) -> Result<U256> {
        let values = self
            .call_contract_function(token_address, ERC20_BALANCE_OF_ABI, "balanceOf", &[wallet_address])
            .await?;
        self.logged(async {
            match values.first().and_then(DynSolValue::as_uint) {
                Some((balance, _)) => Ok(balance),
                None => {
                    let e = PolygonError::Decode {
                        function: "balanceOf".to_string(),
                        reason: format!("expected a single uint256, got {values:?}"),
                    };
                    tracing::error!(token = token_address, error = %e, "Error getting ERC20 token balance");
                    Err(e)
                }
            }
        })
        .await
    }

    async fn sign_and_broadcast(
        &self,
        signer: &PrivateKeySigner,
        tx: OutboundTransaction,
    ) -> Result<String> {
        let nonce = self.fetch_nonce(signer.address()).await?;
        let raw = tx.with_nonce(nonce).sign(signer).await?;
        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| PolygonError::Broadcast(e.to_string()))?;
        Ok(format!("{:?}", pending.tx_hash()))
    }
}

impl std::fmt::Debug for PolygonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolygonClient")
            .field("endpoint", &self.endpoint)
            .field("chain_id", &self.node_chain_id)
            .field("config", &self.config)
            .finish()
    }
}

fn rpc_error(e: TransportError) -> PolygonError {
    PolygonError::Rpc(e.to_string())
}
