//! HTTP client for the swap aggregator's `swap` endpoint.

use std::time::Duration;

use alloy::primitives::Address;
use reqwest::StatusCode;

use crate::blockchain::types::{RelayError, RelayResult};
use crate::config::AggregatorConfig;
use crate::quoting::types::{AggregatorErrorBody, SwapQuote, SwapRequest, SwapResponse};

/// Fetches executable swap transactions from a 1inch-compatible API.
#[derive(Clone)]
pub struct AggregatorClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    chain_id: u64,
}

impl AggregatorClient {
    /// Create a client for the given chain.
    pub fn new(config: &AggregatorConfig, chain_id: u64) -> RelayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| RelayError::Quote(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            chain_id,
        })
    }

    /// Full URL of the swap endpoint, e.g. `https://api.1inch.io/v5.0/1/swap`.
    pub fn swap_url(&self) -> String {
        format!("{}/{}/swap", self.base_url, self.chain_id)
    }

    /// Query string for a swap request.
    pub fn swap_params(&self, request: &SwapRequest, from_address: Address) -> Vec<(&'static str, String)> {
        vec![
            ("fromTokenAddress", request.from_token.to_string()),
            ("toTokenAddress", request.to_token.to_string()),
            ("amount", request.amount.to_string()),
            ("fromAddress", from_address.to_string()),
            ("slippage", request.slippage.to_string()),
            ("disableEstimate", "true".to_string()),
            ("apikey", self.api_key.clone()),
        ]
    }

    /// Request a quote and validate it. Nothing is submitted here.
    pub async fn fetch_swap_quote(
        &self,
        request: &SwapRequest,
        from_address: Address,
    ) -> RelayResult<SwapQuote> {
        request.validate()?;

        tracing::debug!(
            from_token = %request.from_token,
            to_token = %request.to_token,
            amount = %request.amount,
            slippage = request.slippage,
            "Requesting swap quote"
        );

        let response = self
            .http
            .get(self.swap_url())
            .query(&self.swap_params(request, from_address))
            .send()
            .await
            .map_err(|e| RelayError::Quote(format!("aggregator request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<AggregatorErrorBody>(&body)
                .ok()
                .and_then(|b| b.reason().map(str::to_string))
                .unwrap_or(body);

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    RelayError::Auth(format!("aggregator rejected credentials ({}): {}", status, reason))
                }
                _ => RelayError::Quote(format!("aggregator returned {}: {}", status, reason)),
            });
        }

        let body: SwapResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Quote(format!("unexpected quote body: {}", e.without_url())))?;

        let quote = body.into_quote()?;
        tracing::debug!(router = %quote.to, gas = quote.gas, gas_price = quote.gas_price, "Swap quote received");
        Ok(quote)
    }
}

impl std::fmt::Debug for AggregatorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregatorClient")
            .field("base_url", &self.base_url)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}
