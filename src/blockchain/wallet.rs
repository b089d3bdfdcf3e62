//! Wallet derivation and transaction signing.
//!
//! # Security
//! - Key material comes from configuration (populated from the environment)
//! - Keys are never logged or serialized

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::coins_bip39::English;
use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner};

use crate::blockchain::types::{RelayError, RelayResult};
use crate::config::WalletConfig;

/// A signed transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    /// Hash the network will know the transaction by.
    pub hash: TxHash,
    /// EIP-2718 encoded envelope.
    pub raw: Bytes,
}

/// Wallet for transaction signing with nonce tracking.
///
/// Clones share the nonce watermark.
#[derive(Clone)]
pub struct Wallet {
    address: Address,
    signer: EthereumWallet,
    /// Lowest nonce not yet handed out by this process.
    nonce: Arc<AtomicU64>,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Derive a wallet from a BIP-39 phrase on `m/44'/60'/0'/0/{index}`.
    pub fn from_mnemonic(phrase: &str, index: u32, chain_id: u64) -> RelayResult<Self> {
        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase.trim())
            .index(index)
            .map_err(|e| RelayError::Wallet(format!("Invalid derivation index: {}", e)))?
            .build()
            .map_err(|e| RelayError::Wallet(format!("Invalid seed phrase: {}", e)))?;

        Ok(Self::from_signer(signer, chain_id))
    }

    /// Create a wallet from a hex-encoded private key string.
    ///
    /// Accepts the key with or without a `0x` prefix.
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> RelayResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| RelayError::Wallet(format!("Invalid private key format: {}", e)))?;

        Ok(Self::from_signer(signer, chain_id))
    }

    /// Build the wallet described by config. The seed phrase wins over a raw key.
    pub fn from_config(config: &WalletConfig, chain_id: u64) -> RelayResult<Self> {
        if !config.seed_phrase.trim().is_empty() {
            Self::from_mnemonic(&config.seed_phrase, config.derivation_index, chain_id)
        } else if !config.private_key.trim().is_empty() {
            Self::from_private_key(config.private_key.trim(), chain_id)
        } else {
            Err(RelayError::Wallet(
                "No seed phrase or private key configured".to_string(),
            ))
        }
    }

    fn from_signer(signer: PrivateKeySigner, chain_id: u64) -> Self {
        let address = signer.address();
        tracing::info!(address = %address, chain_id = chain_id, "Wallet initialized");

        Self {
            address,
            signer: EthereumWallet::from(signer),
            nonce: Arc::new(AtomicU64::new(0)),
            chain_id,
        }
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Hand out the next nonce, never lower than what the chain reports.
    ///
    /// Callers must hold the submission lock between reserving a nonce and
    /// broadcasting it.
    pub fn reserve_nonce(&self, chain_nonce: u64) -> u64 {
        let nonce = self.nonce.load(Ordering::SeqCst).max(chain_nonce);
        self.nonce.store(nonce + 1, Ordering::SeqCst);
        nonce
    }

    /// Give back a nonce whose transaction never reached the network.
    pub fn release_nonce(&self, nonce: u64) {
        let _ = self
            .nonce
            .compare_exchange(nonce + 1, nonce, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// Forget the local watermark so the next reservation follows the chain.
    ///
    /// Used when a broadcast transaction may have been dropped by the node.
    pub fn resync_nonce(&self) {
        self.nonce.store(0, Ordering::SeqCst);
    }

    /// Get current nonce watermark without reserving.
    pub fn current_nonce(&self) -> u64 {
        self.nonce.load(Ordering::SeqCst)
    }

    /// Sign a fully populated transaction request.
    pub async fn sign_transaction(&self, tx: TransactionRequest) -> RelayResult<SignedTransaction> {
        let envelope = tx
            .build(&self.signer)
            .await
            .map_err(|e| RelayError::Submission(format!("Signing failed: {}", e)))?;

        Ok(SignedTransaction {
            hash: *envelope.tx_hash(),
            raw: envelope.encoded_2718().into(),
        })
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("nonce", &self.current_nonce())
            .finish()
    }
}
