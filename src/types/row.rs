use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceRow {
    pub asset: String,
    pub price_aud: f64,
    pub timestamp: String,
    pub price_usd: f64,
    pub exchange: String,
    pub source: String,
    pub volume_24h: f64,
    pub change_pct_24h: f64,
    pub market_cap_usd: f64,
    pub ingested_at: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExchangeRateRow {
    pub base_currency: String,
    pub target_currency: String,
    pub exchange_rate: f64,
    pub currency_type: String,
    pub currency_name: String,
    pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompanyRow {
    pub company_name: String,
    pub ticker_symbol: String,
    pub country: String,
    pub total_btc: f64,
    pub total_value_usd: f64,
    pub percent_of_supply: f64,
    pub timestamp: String,
}

/// Flat, sink-ready record. Serializes as a plain JSON object in the shape of its kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormattedRow {
    Price(PriceRow),
    ExchangeRate(ExchangeRateRow),
    Company(CompanyRow),
}

impl FormattedRow {
    pub fn timestamp(&self) -> &str {
        match self {
            FormattedRow::Price(row) => &row.timestamp,
            FormattedRow::ExchangeRate(row) => &row.timestamp,
            FormattedRow::Company(row) => &row.timestamp,
        }
    }
}

/// Streaming datasets, each with its own ingestion endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Prices,
    ExchangeRates,
    Companies,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Prices => "prices",
            DatasetKind::ExchangeRates => "exchange_rates",
            DatasetKind::Companies => "companies",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one streaming push. Always returned, never raised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushOutcome {
    pub succeeded: bool,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl PushOutcome {
    pub fn success(status_code: u16) -> Self {
        PushOutcome {
            succeeded: true,
            status_code: Some(status_code),
            error: None,
        }
    }

    pub fn failure(status_code: Option<u16>, error: impl Into<String>) -> Self {
        PushOutcome {
            succeeded: false,
            status_code,
            error: Some(error.into()),
        }
    }

    pub fn not_configured(kind: DatasetKind) -> Self {
        PushOutcome::failure(None, format!("{} URL not configured", kind))
    }

    pub fn status_label(&self) -> &'static str {
        if self.succeeded { "success" } else { "failure" }
    }
}
