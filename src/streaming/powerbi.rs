use std::time::Duration;
use async_trait::async_trait;
use crate::config::StreamingConfig;
use crate::error::{Error, Result};
use crate::interfaces::StreamingSink;
use crate::types::{DatasetKind, FormattedRow, PushOutcome};

/// Marker left in template push URLs that were never filled in.
pub const PLACEHOLDER_MARKER: &str = "paste_your";

/// Power BI streaming dataset client. One POST per push, no retry.
pub struct PowerBiClient {
    client: reqwest::Client,
    prices_url: String,
    exchange_rates_url: Option<String>,
    companies_url: Option<String>,
}

impl PowerBiClient {
    pub fn new(config: &StreamingConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(PowerBiClient {
            client,
            prices_url: config.prices_url.clone(),
            exchange_rates_url: config.exchange_rates_url.clone(),
            companies_url: config.companies_url.clone(),
        })
    }

    /// Push URL for `kind`, or `None` if it is unset or still a placeholder.
    pub fn endpoint(&self, kind: DatasetKind) -> Option<&str> {
        let url = match kind {
            DatasetKind::Prices => Some(self.prices_url.as_str()),
            DatasetKind::ExchangeRates => self.exchange_rates_url.as_deref(),
            DatasetKind::Companies => self.companies_url.as_deref(),
        }?;

        if url.is_empty() || url.contains(PLACEHOLDER_MARKER) {
            return None;
        }
        Some(url)
    }

    async fn post(&self, url: &str, rows: &[FormattedRow], kind: DatasetKind) -> PushOutcome {
        let response = match self.client.post(url).json(rows).send().await {
            Ok(response) => response,
            Err(e) => return PushOutcome::failure(e.status().map(|s| s.as_u16()), e.to_string()),
        };

        let status = response.status();
        if status.is_success() {
            return PushOutcome::success(status.as_u16());
        }

        let body = response.text().await.unwrap_or_default();
        let mut error = format!("{} push returned HTTP {}", kind, status);
        if !body.trim().is_empty() {
            error = format!("{}: {}", error, body.trim());
        }
        PushOutcome::failure(Some(status.as_u16()), error)
    }
}

#[async_trait]
impl StreamingSink for PowerBiClient {
    async fn push(&self, rows: &[FormattedRow], kind: DatasetKind) -> PushOutcome {
        let Some(url) = self.endpoint(kind) else {
            tracing::warn!("Power BI {} URL not configured, skipping push", kind);
            return PushOutcome::not_configured(kind);
        };

        let outcome = self.post(url, rows, kind).await;

        if outcome.succeeded {
            tracing::info!("Pushed {} {} rows to Power BI", rows.len(), kind);
        } else {
            tracing::error!(
                "Failed to push {} rows to Power BI (status {:?}): {}",
                kind,
                outcome.status_code,
                outcome.error.as_deref().unwrap_or_default()
            );
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(exchange_rates_url: Option<&str>, companies_url: Option<&str>) -> PowerBiClient {
        let config = StreamingConfig {
            prices_url: "https://api.powerbi.com/beta/prices/rows".to_string(),
            exchange_rates_url: exchange_rates_url.map(str::to_string),
            companies_url: companies_url.map(str::to_string),
        };
        PowerBiClient::new(&config, Duration::from_secs(10)).unwrap()
    }

    #[test]
    fn test_endpoint_resolution() {
        let client = client(Some("https://api.powerbi.com/beta/rates/rows"), None);

        assert_eq!(client.endpoint(DatasetKind::Prices), Some("https://api.powerbi.com/beta/prices/rows"));
        assert_eq!(client.endpoint(DatasetKind::ExchangeRates), Some("https://api.powerbi.com/beta/rates/rows"));
        assert_eq!(client.endpoint(DatasetKind::Companies), None);
    }

    #[test]
    fn test_placeholder_url_is_unconfigured() {
        let client = client(None, Some("https://paste_your_companies_push_url_here"));
        assert_eq!(client.endpoint(DatasetKind::Companies), None);
    }

    #[tokio::test]
    async fn test_unconfigured_push_reports_failure() {
        let client = client(None, None);
        let outcome = client.push(&[], DatasetKind::ExchangeRates).await;

        assert_eq!(outcome, PushOutcome::not_configured(DatasetKind::ExchangeRates));
    }
}
