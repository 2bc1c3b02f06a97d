use async_trait::async_trait;
use crate::error::UpstreamError;
use crate::types::{CompanyHoldingsReport, CurrencyList, ExchangeRateSet, PriceSnapshot};

/// Raw payloads from the external price/metadata provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Quotes for `coins`, or for the configured symbol list when `None`.
    async fn fetch_prices(&self, coins: Option<Vec<String>>) -> Result<PriceSnapshot, UpstreamError>;
    async fn supported_currencies(&self) -> Result<CurrencyList, UpstreamError>;
    async fn exchange_rates(&self) -> Result<ExchangeRateSet, UpstreamError>;
    async fn company_holdings(&self) -> Result<CompanyHoldingsReport, UpstreamError>;
}
