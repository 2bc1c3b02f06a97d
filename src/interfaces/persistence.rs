use async_trait::async_trait;
use crate::error::SinkResult;
use crate::types::{CompanyHoldingsReport, CurrencyList, ExchangeRateSet, FormattedRow, PriceSnapshot, PushOutcome};

/// Relational sink. Each call is independent: its own connection, its own transaction.
///
/// Save methods return the number of rows written. Implementations log their own
/// failures; the error is returned so the caller can record it and move on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn save_prices(&self, snapshot: &PriceSnapshot) -> SinkResult<usize>;
    async fn save_supported_currencies(&self, currencies: &CurrencyList) -> SinkResult<usize>;
    async fn save_exchange_rates(&self, rates: &ExchangeRateSet) -> SinkResult<usize>;
    async fn save_company_holdings(&self, report: &CompanyHoldingsReport) -> SinkResult<usize>;

    /// Best-effort audit of a streaming push. Never fails past its own boundary.
    async fn log_push_attempt(&self, rows: &[FormattedRow], outcome: &PushOutcome);
}
