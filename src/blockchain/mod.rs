//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration (seed phrase / private key, RPC URL)
//!     → wallet.rs (key derivation, signing, nonce watermark)
//!     → client.rs (RPC connection with timeouts)
//!     → transaction.rs (build, sign, broadcast, confirm)
//! ```
//!
//! # Security Constraints
//! - Key material ONLY from configuration populated by the environment
//! - Never log private keys, seed phrases or API keys
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use transaction::{TxCall, TxSubmitter};
pub use types::{BlockchainConfig, ChainId, RelayError, RelayResult};
pub use wallet::Wallet;
