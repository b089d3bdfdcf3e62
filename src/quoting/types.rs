//! Swap quote types.
//!
//! The aggregator's `tx` object is deserialized loosely and then checked
//! field by field, so a missing or malformed field becomes a `Quote` error
//! instead of a half-built transaction.

use std::str::FromStr;

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::blockchain::types::{RelayError, RelayResult};

/// Largest slippage the aggregator accepts, in percent.
pub const MAX_SLIPPAGE_PERCENT: f64 = 50.0;

/// Caller intent for a swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
    /// Token sold.
    pub from_token: Address,
    /// Token bought.
    pub to_token: Address,
    /// Amount sold, in the from-token's smallest unit.
    pub amount: U256,
    /// Slippage tolerance in percent.
    pub slippage: f64,
}

impl SwapRequest {
    /// Reject requests the aggregator would refuse anyway.
    pub fn validate(&self) -> RelayResult<()> {
        if self.from_token == self.to_token {
            return Err(RelayError::Quote("from and to token are the same".to_string()));
        }
        if self.amount.is_zero() {
            return Err(RelayError::Quote("swap amount must be greater than 0".to_string()));
        }
        if !self.slippage.is_finite() || !(0.0..=MAX_SLIPPAGE_PERCENT).contains(&self.slippage) {
            return Err(RelayError::Quote(format!(
                "slippage {} outside 0..={}",
                self.slippage, MAX_SLIPPAGE_PERCENT
            )));
        }
        Ok(())
    }
}

/// Top-level body of the aggregator's swap endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapResponse {
    /// Executable transaction for the route.
    pub tx: Option<QuoteTx>,
}

/// Numeric fields arrive as JSON numbers or as decimal/hex strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(u64),
    Text(String),
}

impl Quantity {
    fn to_u256(&self) -> Option<U256> {
        match self {
            Quantity::Number(n) => Some(U256::from(*n)),
            Quantity::Text(s) if s.trim().is_empty() => None,
            Quantity::Text(s) => U256::from_str(s.trim()).ok(),
        }
    }
}

/// Raw `tx` object as sent by the aggregator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteTx {
    pub to: Option<String>,
    pub data: Option<String>,
    pub value: Option<Quantity>,
    pub gas: Option<Quantity>,
    pub gas_price: Option<Quantity>,
}

/// A validated quote, ready to become exactly one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapQuote {
    /// Router contract to call.
    pub to: Address,
    /// Encoded router call.
    pub data: Bytes,
    /// Native value to attach; zero when the aggregator omits it.
    pub value: U256,
    /// Gas limit.
    pub gas: u64,
    /// Legacy gas price in wei.
    pub gas_price: u128,
}

impl TryFrom<QuoteTx> for SwapQuote {
    type Error = RelayError;

    fn try_from(tx: QuoteTx) -> RelayResult<Self> {
        let to = tx
            .to
            .as_deref()
            .ok_or_else(|| missing("tx.to"))?
            .parse::<Address>()
            .map_err(|e| RelayError::Quote(format!("tx.to is not an address: {}", e)))?;

        let data = tx
            .data
            .as_deref()
            .ok_or_else(|| missing("tx.data"))?
            .parse::<Bytes>()
            .map_err(|e| RelayError::Quote(format!("tx.data is not hex: {}", e)))?;

        let value = match &tx.value {
            None => U256::ZERO,
            Some(Quantity::Text(s)) if s.trim().is_empty() => U256::ZERO,
            Some(q) => q.to_u256().ok_or_else(|| malformed("tx.value"))?,
        };

        let gas = tx
            .gas
            .as_ref()
            .ok_or_else(|| missing("tx.gas"))?
            .to_u256()
            .and_then(|g| u64::try_from(g).ok())
            .ok_or_else(|| malformed("tx.gas"))?;

        let gas_price = tx
            .gas_price
            .as_ref()
            .ok_or_else(|| missing("tx.gasPrice"))?
            .to_u256()
            .and_then(|p| u128::try_from(p).ok())
            .ok_or_else(|| malformed("tx.gasPrice"))?;

        Ok(Self {
            to,
            data,
            value,
            gas,
            gas_price,
        })
    }
}

impl SwapResponse {
    /// Validate the body into a quote.
    pub fn into_quote(self) -> RelayResult<SwapQuote> {
        self.tx.ok_or_else(|| missing("tx"))?.try_into()
    }
}

/// Error body the aggregator sends with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AggregatorErrorBody {
    pub error: Option<String>,
    pub description: Option<String>,
}

impl AggregatorErrorBody {
    /// Best human-readable reason, if any.
    pub fn reason(&self) -> Option<&str> {
        self.description.as_deref().or(self.error.as_deref())
    }
}

fn missing(field: &str) -> RelayError {
    RelayError::Quote(format!("quote response missing {}", field))
}

fn malformed(field: &str) -> RelayError {
    RelayError::Quote(format!("quote response has malformed {}", field))
}
