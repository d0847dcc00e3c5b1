use std::collections::HashMap;
use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::PriceSource;
use crate::shared::config::PriceFeedCfg;
use crate::shared::errors::ChainError;
use crate::shared::types::Token;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UsdQuote {
    pub usd: f64,
}

/// `{ "<address>": { "usd": <price> } }`
pub type PriceResponse = HashMap<String, UsdQuote>;

/// Token price API client (token-price endpoint keyed by contract address)
pub struct HttpPriceSource {
    http_client: Client,
    url: String,
}

impl HttpPriceSource {
    pub fn new(cfg: &PriceFeedCfg) -> Result<Self, ChainError> {
        let http_client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;
        Ok(Self {
            http_client,
            url: cfg.url.clone(),
        })
    }

    /// Pick `address` out of a response; keys are matched case-insensitively
    pub fn extract_price(response: &PriceResponse, address: Address) -> Result<f64, ChainError> {
        let quote = response
            .iter()
            .find(|(key, _)| key.parse::<Address>().map(|a| a == address).unwrap_or(false))
            .map(|(_, quote)| quote)
            .ok_or_else(|| ChainError::InvalidPayload(format!("no USD quote for {}", address)))?;

        if !quote.usd.is_finite() || quote.usd <= 0.0 {
            return Err(ChainError::InvalidPayload(format!("unusable USD quote {} for {}", quote.usd, address)));
        }
        Ok(quote.usd)
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn price_usd(&self, token: &Token) -> Result<f64, ChainError> {
        let address = token.address.to_string();
        let response = self
            .http_client
            .get(&self.url)
            .query(&[("contract_addresses", address.as_str()), ("vs_currencies", "usd")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChainError::NetworkError(format!(
                "price API request for {} failed with status: {}",
                token.symbol,
                response.status()
            )));
        }

        let body: PriceResponse = response.json().await?;
        let price = Self::extract_price(&body, token.address)?;
        debug!("💵 {} = ${}", token.symbol, price);
        Ok(price)
    }
}
