//! The four wallet operations: balance, transaction lookup, swap, stake.
//!
//! Every operation runs in its own span tagged with a fresh `op_id` and
//! records one `relay_operations_total` sample on completion.

use std::future::Future;
use std::time::Duration;

use alloy::primitives::utils::{format_ether, parse_ether};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::{Transaction, TransactionReceipt};
use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::{BlockchainClient, RelayError, RelayResult, TxCall, TxSubmitter, Wallet};
use crate::config::RelayConfig;
use crate::observability::metrics;
use crate::quoting::{AggregatorClient, SwapRequest};

/// Entry point for wallet automation against one chain.
///
/// Built from explicitly passed-in parts so tests can point each at a mock.
#[derive(Debug, Clone)]
pub struct TransactionRelay {
    client: BlockchainClient,
    submitter: TxSubmitter,
    aggregator: AggregatorClient,
    staking_contract: Address,
    confirmation_timeout: Duration,
}

impl TransactionRelay {
    /// Assemble a relay from already constructed parts.
    pub fn new(
        client: BlockchainClient,
        wallet: Wallet,
        aggregator: AggregatorClient,
        staking_contract: Address,
        confirmation_timeout: Duration,
    ) -> Self {
        Self {
            submitter: TxSubmitter::new(client.clone(), wallet),
            client,
            aggregator,
            staking_contract,
            confirmation_timeout,
        }
    }

    /// Build every part from configuration.
    pub async fn from_config(config: &RelayConfig) -> RelayResult<Self> {
        let chain_id = config.blockchain.chain_id;
        let client = BlockchainClient::new(config.blockchain.clone()).await?;
        let wallet = Wallet::from_config(&config.wallet, chain_id)?;
        let aggregator = AggregatorClient::new(&config.aggregator, chain_id)?;
        let staking_contract = config
            .staking
            .contract_address
            .parse::<Address>()
            .map_err(|e| RelayError::Config(format!("Invalid staking contract address: {}", e)))?;

        Ok(Self::new(
            client,
            wallet,
            aggregator,
            staking_contract,
            Duration::from_secs(config.blockchain.confirmation_timeout_secs),
        ))
    }

    /// Address of the signer used for every submission.
    pub fn address(&self) -> Address {
        self.submitter.address()
    }

    /// Staking contract receiving `stake_eth_with_lido` transfers.
    pub fn staking_contract(&self) -> Address {
        self.staking_contract
    }

    /// Balance of `address` in ether, with all 18 fractional digits.
    pub async fn get_balance(&self, address: Address) -> RelayResult<String> {
        traced("get_balance", async {
            let wei = self.client.get_balance(address).await?;
            Ok(format_balance(wei))
        })
        .await
    }

    /// Look up a transaction. Unknown hashes yield `Ok(None)`.
    pub async fn get_transaction(&self, tx_hash: TxHash) -> RelayResult<Option<Transaction>> {
        traced("get_transaction", self.client.get_transaction(tx_hash)).await
    }

    /// Swap `amount` of `from_token` into `to_token` through the aggregator.
    ///
    /// `amount` is in the from-token's smallest unit; `slippage` in percent.
    pub async fn swap_token(
        &self,
        from_token: Address,
        to_token: Address,
        amount: U256,
        slippage: f64,
    ) -> RelayResult<TransactionReceipt> {
        let request = SwapRequest {
            from_token,
            to_token,
            amount,
            slippage,
        };

        traced("swap_token", async {
            let quote = self
                .aggregator
                .fetch_swap_quote(&request, self.address())
                .await?;

            let call = TxCall {
                to: quote.to,
                value: quote.value,
                data: quote.data,
                gas_limit: Some(quote.gas),
                gas_price: Some(quote.gas_price),
            };
            self.submitter
                .submit_and_confirm(call, self.confirmation_timeout)
                .await
        })
        .await
    }

    /// Stake `amount` ether (decimal string, e.g. `"0.1"`) by sending it to
    /// the staking contract.
    pub async fn stake_eth_with_lido(&self, amount: &str) -> RelayResult<TransactionReceipt> {
        traced("stake_eth_with_lido", async {
            let value = parse_ether_amount(amount)?;
            let call = TxCall {
                to: self.staking_contract,
                value,
                data: Bytes::new(),
                gas_limit: None,
                gas_price: None,
            };
            self.submitter
                .submit_and_confirm(call, self.confirmation_timeout)
                .await
        })
        .await
    }

    /// Signer address and its balance, as printed by the CLI.
    pub async fn wallet_summary(&self) -> RelayResult<(Address, String)> {
        let address = self.address();
        let balance = self.get_balance(address).await?;
        Ok((address, balance))
    }
}

/// Format wei as an ether decimal string.
pub fn format_balance(wei: U256) -> String {
    format_ether(wei)
}

/// Parse a positive decimal ether amount into wei.
pub fn parse_ether_amount(amount: &str) -> RelayResult<U256> {
    let amount = amount.trim();
    if amount.starts_with('-') {
        return Err(RelayError::InvalidAmount(format!("'{}': must be positive", amount)));
    }
    let value = parse_ether(amount)
        .map_err(|e| RelayError::InvalidAmount(format!("'{}': {}", amount, e)))?;
    if value.is_zero() {
        return Err(RelayError::InvalidAmount(format!("'{}': must be greater than 0", amount)));
    }
    Ok(value)
}

async fn traced<T, F>(operation: &'static str, fut: F) -> RelayResult<T>
where
    F: Future<Output = RelayResult<T>>,
{
    let span = tracing::info_span!("relay", operation, op_id = %Uuid::new_v4());
    async move {
        let result = fut.await;
        match &result {
            Ok(_) => {
                metrics::record_operation(operation, "ok");
                tracing::debug!("Operation succeeded");
            }
            Err(e) => {
                metrics::record_operation(operation, e.kind());
                tracing::warn!(error = %e, "Operation failed");
            }
        }
        result
    }
    .instrument(span)
    .await
}
