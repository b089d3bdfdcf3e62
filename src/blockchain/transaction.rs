//! Transaction building, signing, and confirmation monitoring.
//!
//! # Responsibilities
//! - Fill gas and nonce fields for a transaction
//! - Sign and broadcast, one submission at a time per wallet
//! - Wait for confirmations with an explicit upper bound

use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use tokio::sync::Mutex;
use tokio::time::error::Elapsed;
use tokio::time::{interval, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{RelayError, RelayResult};
use crate::blockchain::wallet::Wallet;
use crate::observability::metrics;

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// What to send. Unset gas fields are filled from the node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TxCall {
    /// Destination address.
    pub to: Address,
    /// Amount of native token to send.
    pub value: U256,
    /// Call data (empty for plain transfers).
    pub data: Bytes,
    /// Gas limit; estimated when `None`.
    pub gas_limit: Option<u64>,
    /// Legacy gas price in wei; taken from the node when `None`.
    pub gas_price: Option<u128>,
}

/// Signs, submits and confirms transactions for one wallet.
#[derive(Debug, Clone)]
pub struct TxSubmitter {
    client: BlockchainClient,
    wallet: Wallet,
    /// Held from nonce reservation until the node accepts the transaction.
    submit_lock: Arc<Mutex<()>>,
}

impl TxSubmitter {
    /// Create a new submitter.
    pub fn new(client: BlockchainClient, wallet: Wallet) -> Self {
        Self {
            client,
            wallet,
            submit_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get the wallet address.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Pick the gas price for a transaction and enforce the configured cap.
    async fn resolve_gas_price(&self, quoted: Option<u128>) -> RelayResult<u128> {
        let config = self.client.config();
        let gas_price = match quoted {
            Some(price) => price,
            None => apply_multiplier(self.client.get_gas_price().await?, config.gas_price_multiplier),
        };
        check_gas_price(gas_price, config.max_gas_price_gwei)?;
        Ok(gas_price)
    }

    /// Sign and broadcast a transaction, returning its hash.
    pub async fn submit(&self, call: TxCall) -> RelayResult<TxHash> {
        let from = self.wallet.address();
        let gas_price = self.resolve_gas_price(call.gas_price).await?;

        let gas_limit = match call.gas_limit {
            Some(limit) => limit,
            None => {
                let estimate = TransactionRequest::default()
                    .with_from(from)
                    .with_to(call.to)
                    .with_value(call.value)
                    .with_input(call.data.clone());
                self.client.estimate_gas(estimate).await.map_err(|e| match e {
                    RelayError::Network(msg) => {
                        RelayError::Submission(format!("gas estimation failed: {}", msg))
                    }
                    other => other,
                })?
            }
        };

        let _guard = self.submit_lock.lock().await;

        let chain_nonce = self.client.get_transaction_count(from).await?;
        let nonce = self.wallet.reserve_nonce(chain_nonce);

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(call.to)
            .with_value(call.value)
            .with_input(call.data)
            .with_nonce(nonce)
            .with_gas_limit(gas_limit)
            .with_gas_price(gas_price)
            .with_chain_id(self.wallet.chain_id());

        let signed = match self.wallet.sign_transaction(tx).await {
            Ok(signed) => signed,
            Err(e) => {
                self.wallet.release_nonce(nonce);
                return Err(e);
            }
        };

        match self.client.send_raw_transaction(signed.raw).await {
            Ok(tx_hash) => {
                tracing::info!(
                    tx_hash = %tx_hash,
                    nonce = nonce,
                    to = %call.to,
                    gas_limit = gas_limit,
                    gas_price = gas_price,
                    "Transaction broadcast"
                );
                Ok(tx_hash)
            }
            Err(e) => {
                self.wallet.release_nonce(nonce);
                tracing::warn!(tx_hash = %signed.hash, nonce = nonce, error = %e, "Broadcast failed");
                Err(e)
            }
        }
    }

    /// Wait for a transaction to be confirmed.
    ///
    /// A mined receipt counts as one confirmation. Gives up with
    /// `ConfirmationTimeout` once `max_wait` has elapsed.
    pub async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        max_wait: Duration,
    ) -> RelayResult<TransactionReceipt> {
        let required_confirmations = self.client.confirmation_blocks().max(1);
        let poll_interval = Duration::from_millis(self.client.config().poll_interval_ms);
        let started = Instant::now();

        let result: Result<RelayResult<TransactionReceipt>, Elapsed> = timeout(max_wait, async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                let receipt = match self.client.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Err(RelayError::Reverted(tx_hash));
                }

                if required_confirmations == 1 {
                    return Ok(receipt);
                }

                let current_block = self.client.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);
                let confirmations = current_block.saturating_sub(tx_block) + 1;

                if confirmations >= u64::from(required_confirmations) {
                    return Ok(receipt);
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = confirmations,
                    required = required_confirmations,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(outcome) => {
                if outcome.is_ok() {
                    metrics::record_confirmation(started.elapsed());
                }
                outcome
            }
            Err(_) => Err(RelayError::ConfirmationTimeout {
                tx_hash,
                waited_secs: max_wait.as_secs(),
            }),
        }
    }

    /// Submit a transaction and wait for its receipt.
    ///
    /// On a confirmation timeout the local nonce watermark is dropped, so a
    /// transaction the node has since evicted does not leave a nonce gap.
    pub async fn submit_and_confirm(
        &self,
        call: TxCall,
        max_wait: Duration,
    ) -> RelayResult<TransactionReceipt> {
        let tx_hash = self.submit(call).await?;
        let receipt = match self.wait_for_confirmation(tx_hash, max_wait).await {
            Ok(receipt) => receipt,
            Err(e @ RelayError::ConfirmationTimeout { .. }) => {
                let _guard = self.submit_lock.lock().await;
                self.wallet.resync_nonce();
                tracing::warn!(
                    tx_hash = %tx_hash,
                    "Confirmation timed out, nonce resynced from chain"
                );
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        tracing::info!(
            tx_hash = %tx_hash,
            block_number = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "Transaction confirmed"
        );
        Ok(receipt)
    }
}

/// Scale a node-reported gas price by the configured safety margin.
pub fn apply_multiplier(gas_price: u128, multiplier: f64) -> u128 {
    (gas_price as f64 * multiplier) as u128
}

/// Reject gas prices above the configured ceiling, compared in wei.
pub fn check_gas_price(gas_price: u128, max_gwei: u64) -> RelayResult<()> {
    if gas_price > u128::from(max_gwei) * WEI_PER_GWEI {
        return Err(RelayError::GasPriceTooHigh {
            current_gwei: u64::try_from(gas_price.div_ceil(WEI_PER_GWEI)).unwrap_or(u64::MAX),
            max_gwei,
        });
    }
    Ok(())
}
