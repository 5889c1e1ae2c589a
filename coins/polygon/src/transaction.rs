use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;

use crate::config::ClientConfig;
use crate::error::{PolygonError, Result};

/// An outbound Polygon transaction, built fresh for every send.
///
/// Gas is priced with a single legacy `gasPrice` and the chain id is always
/// set, so the signed payload is an EIP-155 legacy transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundTransaction {
    pub from: Option<Address>,
    pub to: Address,
    pub value: U256,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub nonce: Option<u64>,
    pub chain_id: u64,
    pub input: Bytes,
}

impl OutboundTransaction {
    /// A plain POL transfer using the gas settings of `config`
    pub fn transfer(to: Address, value: U256, config: &ClientConfig) -> Self {
        Self {
            from: None,
            to,
            value,
            gas_limit: config.gas_limit,
            gas_price: config.gas_price_wei,
            nonce: None,
            chain_id: config.chain_id,
            input: Bytes::new(),
        }
    }

    /// A state-mutating contract invocation carrying ABI-encoded `input`
    pub fn contract_call(contract: Address, input: impl Into<Bytes>, config: &ClientConfig) -> Self {
        Self {
            input: input.into(),
            ..Self::transfer(contract, U256::ZERO, config)
        }
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// True when this transaction carries call data
    pub fn is_contract_call(&self) -> bool {
        !self.input.is_empty()
    }

    /// Converts into an alloy request
    pub fn into_request(self) -> TransactionRequest {
        let mut request = TransactionRequest::default()
            .with_to(self.to)
            .with_value(self.value)
            .with_gas_limit(self.gas_limit)
            .with_gas_price(self.gas_price)
            .with_chain_id(self.chain_id);
        if let Some(from) = self.from {
            request = request.with_from(from);
        }
        if let Some(nonce) = self.nonce {
            request = request.with_nonce(nonce);
        }
        if !self.input.is_empty() {
            request = request.with_input(self.input);
        }
        request
    }

    /// Signs the transaction with `signer` and returns the EIP-2718 bytes
    /// ready for `eth_sendRawTransaction`.
    pub async fn sign(self, signer: &PrivateKeySigner) -> Result<Bytes> {
        if self.nonce.is_none() {
            return Err(PolygonError::Signing("nonce is not set".to_string()));
        }
        let wallet = EthereumWallet::from(signer.clone());
        let request = self.with_from(signer.address()).into_request();
        let envelope = request
            .build(&wallet)
            .await
            .map_err(|e| PolygonError::Signing(e.to_string()))?;
        Ok(envelope.encoded_2718().into())
    }
}
