//! Configuration loading from disk and environment.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::schema::{RelayConfig, NATIVE_TOKEN_ADDRESS};
use crate::config::validation::{validate_config, ValidationError};

/// JSON-RPC endpoint URL.
pub const RPC_URL_ENV_VAR: &str = "ETHEREUM_RPC_URL";
/// BIP-39 phrase the signer is derived from.
pub const SEED_PHRASE_ENV_VAR: &str = "SEED_PHRASE";
/// Swap aggregator API key.
pub const API_KEY_ENV_VAR: &str = "ONEINCH_API_KEY";
/// Raw private key, used when no seed phrase is configured.
pub const PRIVATE_KEY_ENV_VAR: &str = "RELAY_PRIVATE_KEY";
/// Log level override.
pub const LOG_LEVEL_ENV_VAR: &str = "RELAY_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Dotenv(dotenvy::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Dotenv(e) => write!(f, ".env error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: optional TOML file, then environment overrides, then validation.
///
/// A `.env` file in the working directory (or a parent) fills in variables
/// the process environment leaves unset.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let dotenv = match dotenvy::dotenv_iter() {
        Ok(iter) => collect_dotenv(iter)?,
        Err(e) if e.not_found() => HashMap::new(),
        Err(e) => return Err(ConfigError::Dotenv(e)),
    };

    load_config_with(path, |key| {
        std::env::var(key)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| dotenv.get(key).cloned())
    })
}

/// Same as [`load_config`], with an explicit variable source.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            parse_config(&content)?
        }
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Read the variables of a `.env` file without touching the process environment.
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let iter = dotenvy::from_path_iter(path).map_err(ConfigError::Dotenv)?;
    collect_dotenv(iter)
}

fn collect_dotenv<R: std::io::Read>(
    iter: dotenvy::Iter<R>,
) -> Result<HashMap<String, String>, ConfigError> {
    iter.collect::<Result<_, _>>().map_err(ConfigError::Dotenv)
}

/// Parse a TOML document into a config. Does not validate.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    let mut config: RelayConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    // A user-supplied [tokens] table replaces the default one wholesale.
    config
        .tokens
        .0
        .entry("ETH".to_string())
        .or_insert_with(|| NATIVE_TOKEN_ADDRESS.to_string());
    config.tokens.0 = std::mem::take(&mut config.tokens.0)
        .into_iter()
        .map(|(symbol, address)| (symbol.to_ascii_uppercase(), address))
        .collect();

    Ok(config)
}

/// Overlay environment values on a config. Only set, non-empty variables win.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(url) = get(RPC_URL_ENV_VAR) {
        config.blockchain.rpc_url = url;
    }
    if let Some(phrase) = get(SEED_PHRASE_ENV_VAR) {
        config.wallet.seed_phrase = phrase;
    }
    if let Some(key) = get(PRIVATE_KEY_ENV_VAR) {
        config.wallet.private_key = key;
    }
    if let Some(key) = get(API_KEY_ENV_VAR) {
        config.aggregator.api_key = key;
    }
    if let Some(level) = get(LOG_LEVEL_ENV_VAR) {
        config.observability.log_level = level;
    }
}
