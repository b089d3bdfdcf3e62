//! Swap quoting via an external aggregator.

pub mod aggregator;
pub mod types;

pub use aggregator::AggregatorClient;
pub use types::{SwapQuote, SwapRequest, SwapResponse};
