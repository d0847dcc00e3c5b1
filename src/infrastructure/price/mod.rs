//! USD price feeds

mod http_price_source;

pub use http_price_source::{HttpPriceSource, PriceResponse, UsdQuote};

use async_trait::async_trait;

use crate::shared::errors::ChainError;
use crate::shared::types::Token;

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current USD price of one whole `token`
    async fn price_usd(&self, token: &Token) -> Result<f64, ChainError>;
}
