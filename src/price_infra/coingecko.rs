use std::time::Duration;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use crate::config::SourceConfig;
use crate::error::{Error, Result, UpstreamError};
use crate::interfaces::PriceSource;
use crate::types::{CompanyHoldingsReport, CurrencyList, ExchangeRateSet, PriceSnapshot};

pub const API_KEY_HEADER: &str = "x_cg_demo_api_key";

const PRICES_PATH: &str = "/simple/price";
const SUPPORTED_CURRENCIES_PATH: &str = "/simple/supported_vs_currencies";
const EXCHANGE_RATES_PATH: &str = "/exchange_rates";
const COMPANY_HOLDINGS_PATH: &str = "/companies/public_treasury/bitcoin";

const QUOTE_CURRENCIES: &str = "usd,aud";
const PRICE_PRECISION: &str = "5";

pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    coins: Vec<String>,
}

impl CoinGeckoClient {
    pub fn new(config: &SourceConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(CoinGeckoClient {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            coins: config.coins.clone(),
        })
    }

    pub fn coins(&self) -> &[String] {
        &self.coins
    }

    // One attempt, no retry.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<T, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("CoinGecko {} returned HTTP {}", endpoint, status);
            return Err(UpstreamError::Status { endpoint, status: status.as_u16() });
        }

        response.json::<T>()
            .await
            .map_err(|source| UpstreamError::Decode { endpoint, source })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch_prices(&self, coins: Option<Vec<String>>) -> std::result::Result<PriceSnapshot, UpstreamError> {
        let symbols = coins.unwrap_or_else(|| self.coins.clone()).join(",");

        let query = [
            ("vs_currencies", QUOTE_CURRENCIES.to_string()),
            ("symbols", symbols),
            ("include_market_cap", "true".to_string()),
            ("include_24hr_vol", "true".to_string()),
            ("include_24hr_change", "true".to_string()),
            ("include_last_updated_at", "true".to_string()),
            ("precision", PRICE_PRECISION.to_string()),
        ];

        let snapshot: PriceSnapshot = self.get_json("prices", PRICES_PATH, &query).await?;
        tracing::debug!("Fetched {} prices from CoinGecko", snapshot.len());
        Ok(snapshot)
    }

    async fn supported_currencies(&self) -> std::result::Result<CurrencyList, UpstreamError> {
        let currencies: CurrencyList = self
            .get_json("supported_currencies", SUPPORTED_CURRENCIES_PATH, &[])
            .await?;
        tracing::debug!("Fetched {} supported currencies from CoinGecko", currencies.len());
        Ok(currencies)
    }

    async fn exchange_rates(&self) -> std::result::Result<ExchangeRateSet, UpstreamError> {
        let rates: ExchangeRateSet = self.get_json("exchange_rates", EXCHANGE_RATES_PATH, &[]).await?;
        tracing::debug!("Fetched {} BTC exchange rates from CoinGecko", rates.len());
        Ok(rates)
    }

    async fn company_holdings(&self) -> std::result::Result<CompanyHoldingsReport, UpstreamError> {
        let report: CompanyHoldingsReport = self
            .get_json("company_holdings", COMPANY_HOLDINGS_PATH, &[])
            .await?;
        tracing::debug!("Fetched {} company holdings from CoinGecko", report.companies.len());
        Ok(report)
    }
}
