//! Wallet automation over Ethereum JSON-RPC.
//!
//! Derives a signer from a seed phrase and exposes four operations through
//! [`TransactionRelay`]: balance lookup, transaction lookup, token swaps via
//! a 1inch-compatible aggregator, and ETH staking with Lido.

pub mod blockchain;
pub mod config;
pub mod observability;
pub mod quoting;
pub mod relay;

pub use blockchain::{RelayError, RelayResult};
pub use config::RelayConfig;
pub use relay::TransactionRelay;
