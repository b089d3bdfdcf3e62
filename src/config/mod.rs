//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (process env, then .env file)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets come from the environment and are redacted in `Debug`

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_with, read_dotenv, ConfigError};
pub use schema::{
    AggregatorConfig, BlockchainConfig, ObservabilityConfig, RelayConfig, StakingConfig,
    WalletConfig,
};
