//! Ethereum blockchain integration for the faucet server.
//!
//! [`AlloyChainClient`] is the one concrete implementation of the engine's
//! chain boundary: it signs and submits the fixed-value, fixed-gas transfer
//! with the nonce the engine allocated, and answers authoritative account
//! transaction counts.

use crate::config::EthereumConfig;
use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, TxHash, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use faucet_engine::{ChainClient, ChainError};
use std::str::FromStr;
use tracing::{debug, info};

/// Chain client backed by an alloy HTTP provider and a local signer.
pub struct AlloyChainClient {
    source_account: Address,
    chain_id: u64,
    transfer_amount: U256,
    gas_limit: u64,
    gas_price: u128,
    provider: Box<dyn Provider>,
}

impl std::fmt::Debug for AlloyChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlloyChainClient")
            .field("source_account", &self.source_account)
            .field("chain_id", &self.chain_id)
            .field("transfer_amount", &self.transfer_amount)
            .field("gas_limit", &self.gas_limit)
            .field("gas_price", &self.gas_price)
            .finish()
    }
}

impl AlloyChainClient {
    /// Create a new chain client from configuration
    pub fn new(config: &EthereumConfig) -> anyhow::Result<Self> {
        let private_key = config.private_key.strip_prefix("0x").unwrap_or(&config.private_key);
        let signer = PrivateKeySigner::from_str(private_key)
            .map_err(|e| anyhow::anyhow!("Invalid private key: {}", e))?;

        let source_account = signer.address();

        let url = url::Url::parse(&config.rpc_url)
            .map_err(|e| anyhow::anyhow!("Invalid RPC URL: {}", e))?;
        let wallet = EthereumWallet::from(signer);
        let provider = Box::new(
            alloy::providers::ProviderBuilder::new()
                .wallet(wallet)
                .connect_http(url),
        );

        info!(account = %source_account, chain_id = config.chain_id, "chain client ready");

        Ok(Self {
            source_account,
            chain_id: config.chain_id,
            transfer_amount: Self::eth_to_wei(config.transfer_amount_eth),
            gas_limit: config.gas_limit,
            gas_price: Self::gwei_to_wei(config.gas_price_gwei),
            provider,
        })
    }

    /// Convert ETH to Wei
    fn eth_to_wei(eth_amount: f64) -> U256 {
        let wei_scaled = (eth_amount * 1e18) as u64;
        U256::from(wei_scaled)
    }

    /// Convert gwei to Wei
    fn gwei_to_wei(gwei: u64) -> u128 {
        gwei as u128 * 1_000_000_000
    }

    /// The address the faucet signs and pays from.
    pub fn source_account(&self) -> Address {
        self.source_account
    }

    /// Fixed payout per dispense, in wei.
    pub fn transfer_amount(&self) -> U256 {
        self.transfer_amount
    }

    /// Validate Ethereum address format
    pub fn validate_address(address: &str) -> Result<Address, String> {
        Address::from_str(address).map_err(|_| format!("Invalid Ethereum address: {}", address))
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    async fn account_nonce(&self, account: Address) -> Result<u64, ChainError> {
        let count = self
            .provider
            .get_transaction_count(account)
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;
        debug!(account = %account, count, "fetched account transaction count");
        Ok(count)
    }

    async fn broadcast_transfer(&self, to: Address, nonce: u64) -> Result<TxHash, ChainError> {
        let tx = TransactionRequest::default()
            .with_from(self.source_account)
            .with_to(to)
            .with_value(self.transfer_amount)
            .with_nonce(nonce)
            .with_chain_id(self.chain_id)
            .with_gas_limit(self.gas_limit)
            .with_gas_price(self.gas_price);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ChainError::Rejected(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        info!(to = %to, nonce, tx = %tx_hash, "transfer broadcast");
        Ok(tx_hash)
    }
}
