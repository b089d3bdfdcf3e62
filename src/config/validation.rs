//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, multiplier > 0)
//! - Check configured addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Secrets are not required here; a missing seed phrase or API key
//!   surfaces when the wallet or aggregator is first used

use std::fmt;

use alloy::primitives::Address;

use crate::config::schema::RelayConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let chain = &config.blockchain;

    if !chain.rpc_url.is_empty() && chain.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new("blockchain.rpc_url", "not a valid URL"));
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be greater than 0"));
    }
    if chain.confirmation_blocks == 0 {
        errors.push(ValidationError::new("blockchain.confirmation_blocks", "must be at least 1"));
    }
    if chain.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "blockchain.confirmation_timeout_secs",
            "must be greater than 0",
        ));
    }
    if chain.poll_interval_ms == 0 {
        errors.push(ValidationError::new("blockchain.poll_interval_ms", "must be greater than 0"));
    }
    if !(chain.gas_price_multiplier.is_finite() && chain.gas_price_multiplier > 0.0) {
        errors.push(ValidationError::new(
            "blockchain.gas_price_multiplier",
            "must be a positive number",
        ));
    }

    if config.aggregator.base_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new("aggregator.base_url", "not a valid URL"));
    }
    if config.aggregator.http_timeout_secs == 0 {
        errors.push(ValidationError::new("aggregator.http_timeout_secs", "must be greater than 0"));
    }

    if config.staking.contract_address.parse::<Address>().is_err() {
        errors.push(ValidationError::new("staking.contract_address", "not a valid address"));
    }

    for address in config.tokens.0.values() {
        if address.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                "tokens",
                format!("'{}' is not a valid address", address),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
