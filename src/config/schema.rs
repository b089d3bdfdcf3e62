//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::fmt;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// 1inch sentinel address for the chain's native token.
pub const NATIVE_TOKEN_ADDRESS: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

/// Lido stETH contract on Ethereum mainnet.
pub const LIDO_MAINNET_ADDRESS: &str = "0xae7ab96520DE3A18E5e111B5EaAb095312D7fE84";

/// Root configuration for the wallet relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Chain connection and submission settings.
    pub blockchain: BlockchainConfig,

    /// Signer material.
    pub wallet: WalletConfig,

    /// Swap aggregator settings.
    pub aggregator: AggregatorConfig,

    /// Staking contract settings.
    pub staking: StakingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Token symbol to address table used by the CLI.
    pub tokens: TokenTable,
}

/// Blockchain integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations required. A mined receipt counts as one.
    pub confirmation_blocks: u32,

    /// Upper bound on the wait for a submitted transaction to confirm.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Gas price multiplier (1.0 = node price, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            confirmation_timeout_secs: 300,
            poll_interval_ms: 2000,
            gas_price_multiplier: 1.0,
            max_gas_price_gwei: 500,
        }
    }
}

/// Signer material. Never serialized back out.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WalletConfig {
    /// BIP-39 phrase the signer is derived from.
    #[serde(skip_serializing)]
    pub seed_phrase: String,

    /// Raw hex private key, used only when no seed phrase is set.
    #[serde(skip_serializing)]
    pub private_key: String,

    /// Address index on the `m/44'/60'/0'/0/{index}` path.
    pub derivation_index: u32,
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("seed_phrase", &redact(&self.seed_phrase))
            .field("private_key", &redact(&self.private_key))
            .field("derivation_index", &self.derivation_index)
            .finish()
    }
}

/// Swap aggregator configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// API base, without the chain id segment.
    pub base_url: String,

    /// API credential passed as the `apikey` query parameter.
    #[serde(skip_serializing)]
    pub api_key: String,

    /// HTTP request timeout in seconds.
    pub http_timeout_secs: u64,

    /// Slippage in percent used when the caller does not pass one.
    pub default_slippage: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.1inch.io/v5.0".to_string(),
            api_key: String::new(),
            http_timeout_secs: 15,
            default_slippage: 1.0,
        }
    }
}

impl fmt::Debug for AggregatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregatorConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("default_slippage", &self.default_slippage)
            .finish()
    }
}

/// Staking contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StakingConfig {
    /// Contract receiving plain ETH transfers for staking.
    pub contract_address: String,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            contract_address: LIDO_MAINNET_ADDRESS.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Symbol to address lookup, keyed by upper-case symbol.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TokenTable(pub BTreeMap<String, String>);

impl Default for TokenTable {
    fn default() -> Self {
        let mut tokens = BTreeMap::new();
        tokens.insert("ETH".to_string(), NATIVE_TOKEN_ADDRESS.to_string());
        Self(tokens)
    }
}

impl TokenTable {
    /// Look up a symbol, case-insensitively.
    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.0.get(&symbol.to_ascii_uppercase()).map(String::as_str)
    }

    /// Accept either a hex address or a symbol from the table.
    pub fn resolve(&self, token: &str) -> Result<Address, String> {
        if let Ok(address) = token.parse::<Address>() {
            return Ok(address);
        }
        self.get(token)
            .ok_or_else(|| format!("unknown token '{}'", token))?
            .parse::<Address>()
            .map_err(|e| format!("token '{}' has an invalid address: {}", token, e))
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}
