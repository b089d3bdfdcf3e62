//! Chain-specific types and error definitions.

use alloy::primitives::TxHash;
use thiserror::Error;

pub use crate::config::schema::BlockchainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

/// Errors that can occur during relay operations.
///
/// Nothing here is retried; every variant propagates straight to the caller.
#[derive(Debug, Error)]
pub enum RelayError {
    /// RPC endpoint unreachable or returned malformed data.
    #[error("Network error: {0}")]
    Network(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Aggregator call failed or returned an unexpected shape.
    #[error("Quote error: {0}")]
    Quote(String),

    /// Aggregator rejected the API credential.
    #[error("Auth error: {0}")]
    Auth(String),

    /// Signing or broadcast failed.
    #[error("Submission error: {0}")]
    Submission(String),

    /// Transaction was not confirmed within the allowed wait.
    #[error("Transaction {tx_hash} not confirmed after {waited_secs} seconds")]
    ConfirmationTimeout { tx_hash: TxHash, waited_secs: u64 },

    /// Transaction was mined but reverted.
    #[error("Transaction reverted: {0}")]
    Reverted(TxHash),

    /// Invalid key material or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Amount could not be parsed.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// A configured value cannot be used.
    #[error("Config error: {0}")]
    Config(String),
}

impl RelayError {
    /// Whether this error came from talking to the RPC endpoint.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) | Self::Timeout(_) => "network",
            Self::Quote(_) => "quote",
            Self::Auth(_) => "auth",
            Self::Submission(_) => "submission",
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
            Self::Reverted(_) => "reverted",
            Self::Wallet(_) => "wallet",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::GasPriceTooHigh { .. } => "gas_price",
            Self::ChainMismatch { .. } => "chain_mismatch",
            Self::Config(_) => "config",
        }
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
