//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint
//! - Query chain state (block number, balances, transactions, receipts)
//! - Broadcast pre-signed transactions
//! - Map timeouts and transport failures onto `RelayError`
//! - Keep the `relay_rpc_healthy` gauge in step with the last call

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Transaction, TransactionReceipt, TransactionRequest};
use alloy::transports::TransportResult;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainConfig, ChainId, RelayError, RelayResult};
use crate::observability::metrics;

/// Blockchain RPC client wrapper.
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Clone)]
pub struct BlockchainClient {
    provider: Arc<dyn Provider + Send + Sync>,
    config: BlockchainConfig,
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// Fails only if the RPC URL cannot be parsed. A chain ID mismatch or an
    /// unreachable endpoint is logged and reflected in the health gauge,
    /// not returned, so a flaky endpoint does not block startup.
    pub async fn new(config: BlockchainConfig) -> RelayResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            RelayError::Network(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let provider: Arc<dyn Provider + Send + Sync> =
            Arc::new(ProviderBuilder::new().connect_http(url));

        let client = Self {
            provider,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
        };

        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %client.config.rpc_url,
                    chain_id = client.config.chain_id,
                    "Blockchain client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Blockchain client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Run one RPC call under the configured timeout.
    async fn call<T, F>(&self, method: &'static str, fut: F) -> RelayResult<T>
    where
        F: IntoFuture<Output = TransportResult<T>>,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => {
                metrics::record_rpc_health(true);
                Ok(result)
            }
            Ok(Err(e)) => {
                metrics::record_rpc_health(false);
                tracing::warn!(method, error = %e, "RPC error");
                Err(RelayError::Network(format!("{} failed: {}", method, e)))
            }
            Err(_) => {
                metrics::record_rpc_health(false);
                tracing::warn!(method, "RPC timeout");
                Err(RelayError::Timeout(self.config.rpc_timeout_secs))
            }
        }
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> RelayResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(RelayError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> RelayResult<ChainId> {
        self.call("eth_chainId", self.provider.get_chain_id())
            .await
            .map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> RelayResult<u64> {
        self.call("eth_blockNumber", self.provider.get_block_number()).await
    }

    /// Get the balance of an address in wei.
    pub async fn get_balance(&self, address: Address) -> RelayResult<U256> {
        self.call("eth_getBalance", self.provider.get_balance(address)).await
    }

    /// Get a transaction by hash. Unknown hashes yield `None`.
    pub async fn get_transaction(&self, tx_hash: TxHash) -> RelayResult<Option<Transaction>> {
        self.call(
            "eth_getTransactionByHash",
            self.provider.get_transaction_by_hash(tx_hash),
        )
        .await
    }

    /// Get the pending transaction count (next nonce) for an address.
    pub async fn get_transaction_count(&self, address: Address) -> RelayResult<u64> {
        self.call(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address).pending(),
        )
        .await
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> RelayResult<Option<TransactionReceipt>> {
        self.call(
            "eth_getTransactionReceipt",
            self.provider.get_transaction_receipt(tx_hash),
        )
        .await
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> RelayResult<u128> {
        self.call("eth_gasPrice", self.provider.get_gas_price()).await
    }

    /// Estimate the gas limit for a transaction.
    pub async fn estimate_gas(&self, tx: TransactionRequest) -> RelayResult<u64> {
        self.call("eth_estimateGas", self.provider.estimate_gas(tx)).await
    }

    /// Broadcast a signed, EIP-2718 encoded transaction.
    ///
    /// Failures here are submission failures (nonce conflicts, insufficient
    /// funds, rejected by the node), not network errors.
    pub async fn send_raw_transaction(&self, encoded: Bytes) -> RelayResult<TxHash> {
        let fut = self.provider.send_raw_transaction(&encoded);
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(pending)) => {
                metrics::record_rpc_health(true);
                Ok(*pending.tx_hash())
            }
            Ok(Err(e)) => Err(RelayError::Submission(format!("broadcast rejected: {}", e))),
            Err(_) => {
                metrics::record_rpc_health(false);
                Err(RelayError::Submission(format!(
                    "broadcast timed out after {} seconds",
                    self.config.rpc_timeout_secs
                )))
            }
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }

    /// Get the number of confirmation blocks required.
    pub fn confirmation_blocks(&self) -> u32 {
        self.config.confirmation_blocks
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
