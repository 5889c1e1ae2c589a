//! # Polygon SDK
//!
//! A thin JSON-RPC client for Polygon (POL) nodes, built on
//! [alloy](https://github.com/alloy-rs/alloy).
//!
//! ## Features
//!
//! - Read blocks, transactions and balances
//! - Send POL transfers signed locally with a private key
//! - Call and invoke contract functions from a JSON ABI at runtime
//! - ERC-20 `balanceOf` helper
//! - Gas limit, gas price and chain id taken from [`ClientConfig`]
//! - Log events routed to an injected `tracing` dispatcher
//!
//! ## Example
//!
//! ```rust,no_run
//! use polygon_sdk::{PolygonClient, PolAmount};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), polygon_sdk::PolygonError> {
//!     let client = PolygonClient::connect("https://polygon-rpc.com").await?;
//!
//!     let block = client.get_latest_block().await?;
//!     println!("Head: {}", block.header.number);
//!
//!     let balance = client
//!         .get_balance("0x70997970C51812dc3A010C7d01b50e0d17dc79C8")
//!         .await?;
//!     println!("Balance: {}", PolAmount::from_wei(balance));
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Every operation returns [`PolygonError`]. Use [`PolygonError::kind`] to
//! tell a missing block or transaction apart from rejected input or a
//! node-side failure. Each failure is also logged at ERROR.

#![forbid(unsafe_code)]

pub mod account;
pub mod amount;
pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod transaction;

pub use amount::PolAmount;
pub use client::{PolygonClient, PolygonClientBuilder};
pub use config::{
    ClientConfig, Network, DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE_WEI, POLYGON_AMOY_CHAIN_ID,
    POLYGON_MAINNET_CHAIN_ID,
};
pub use contract::{ContractFunction, ERC20_BALANCE_OF_ABI};
pub use error::{ErrorKind, PolygonError, Result};
pub use transaction::OutboundTransaction;

// Re-export alloy types that appear in the public API
pub use alloy::dyn_abi::DynSolValue;
pub use alloy::primitives::{Address, B256, U256};
pub use alloy::rpc::types::{Block, BlockNumberOrTag, Transaction};
