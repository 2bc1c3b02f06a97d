//! Pure transformation of provider payloads into streaming rows.
//!
//! No I/O and no failure modes: absent numbers become `0`, absent strings become
//! empty. Every row carries the same timestamp text for a given `now`, so a frozen
//! clock yields identical output on repeated calls.

use chrono::{DateTime, Utc};
use crate::types::exchange_rate::BASE_ASSET;
use crate::types::row::{CompanyRow, ExchangeRateRow, FormattedRow, PriceRow};
use crate::types::timestamp::format_row_timestamp;
use crate::types::{CompanyHoldingsReport, ExchangeRateSet, PriceSnapshot};

pub const EXCHANGE_NAME: &str = "coingecko";
pub const SOURCE_TAG: &str = "coingecko_api";

/// Target currencies kept when formatting exchange rates, in output order.
pub const EXCHANGE_RATE_ALLOW_LIST: [&str; 10] =
    ["usd", "eur", "gbp", "jpy", "aud", "cad", "chf", "cny", "inr", "krw"];

pub const MAX_COMPANY_ROWS: usize = 10;

pub const SUMMARY_COMPANY_NAME: &str = "TOTAL_HOLDINGS";
pub const SUMMARY_TICKER: &str = "SUMMARY";
pub const SUMMARY_COUNTRY: &str = "ALL";

pub fn format_price_rows(snapshot: &PriceSnapshot, now: DateTime<Utc>) -> Vec<FormattedRow> {
    let timestamp = format_row_timestamp(now);

    snapshot.iter()
        .map(|(asset, quote)| {
            FormattedRow::Price(PriceRow {
                asset: asset.to_uppercase(),
                price_aud: quote.aud.unwrap_or(0.0),
                timestamp: timestamp.clone(),
                price_usd: quote.usd.unwrap_or(0.0),
                exchange: EXCHANGE_NAME.to_string(),
                source: SOURCE_TAG.to_string(),
                volume_24h: quote.usd_24h_vol.unwrap_or(0.0),
                change_pct_24h: quote.usd_24h_change.unwrap_or(0.0),
                market_cap_usd: quote.usd_market_cap.unwrap_or(0.0),
                ingested_at: timestamp.clone(),
            })
        })
        .collect()
}

/// Rows only for allow-listed currencies; everything else upstream is dropped.
pub fn format_exchange_rate_rows(rates: &ExchangeRateSet, now: DateTime<Utc>) -> Vec<FormattedRow> {
    let timestamp = format_row_timestamp(now);

    EXCHANGE_RATE_ALLOW_LIST.iter()
        .filter_map(|code| rates.get(code).map(|rate| (code, rate)))
        .map(|(code, rate)| {
            FormattedRow::ExchangeRate(ExchangeRateRow {
                base_currency: BASE_ASSET.to_string(),
                target_currency: code.to_uppercase(),
                exchange_rate: rate.value.unwrap_or(0.0),
                currency_type: rate.currency_type().as_str().to_string(),
                currency_name: rate.name.clone().unwrap_or_default(),
                timestamp: timestamp.clone(),
            })
        })
        .collect()
}

/// First `MAX_COMPANY_ROWS` companies in provider order, then one summary row.
///
/// The summary row is always appended, even when the report lists no companies.
pub fn format_company_rows(report: &CompanyHoldingsReport, now: DateTime<Utc>) -> Vec<FormattedRow> {
    let timestamp = format_row_timestamp(now);

    let mut rows: Vec<FormattedRow> = report.companies.iter()
        .take(MAX_COMPANY_ROWS)
        .map(|company| {
            FormattedRow::Company(CompanyRow {
                company_name: company.name.clone().unwrap_or_default(),
                ticker_symbol: company.symbol.clone().unwrap_or_default(),
                country: company.country.clone().unwrap_or_default(),
                total_btc: company.total_holdings.unwrap_or(0.0),
                total_value_usd: company.total_current_value_usd.unwrap_or(0.0),
                percent_of_supply: company.percentage_of_total_supply.unwrap_or(0.0),
                timestamp: timestamp.clone(),
            })
        })
        .collect();

    let summary = report.summary();
    rows.push(FormattedRow::Company(CompanyRow {
        company_name: SUMMARY_COMPANY_NAME.to_string(),
        ticker_symbol: SUMMARY_TICKER.to_string(),
        country: SUMMARY_COUNTRY.to_string(),
        total_btc: summary.total_holdings,
        total_value_usd: summary.total_value_usd,
        percent_of_supply: summary.market_cap_dominance,
        timestamp,
    }));

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompanyHolding, CurrencyType, ExchangeRate, PriceQuote};

    fn frozen_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_price_row_from_provider_snapshot() {
        let snapshot: PriceSnapshot = serde_json::from_str(
            r#"{"btc": {"usd": 65000, "aud": 97000, "usd_market_cap": 1.2e12,
                        "usd_24h_vol": 3e10, "usd_24h_change": 1.5,
                        "last_updated_at": 1700000000}}"#,
        ).unwrap();

        let rows = format_price_rows(&snapshot, frozen_now());
        assert_eq!(rows.len(), 1);

        let FormattedRow::Price(row) = &rows[0] else {
            panic!("expected a price row");
        };
        assert_eq!(row.asset, "BTC");
        assert_eq!(row.price_usd, 65000.0);
        assert_eq!(row.price_aud, 97000.0);
        assert_eq!(row.market_cap_usd, 1.2e12);
        assert_eq!(row.volume_24h, 3e10);
        assert_eq!(row.change_pct_24h, 1.5);
        assert_eq!(row.exchange, "coingecko");
        assert_eq!(row.source, "coingecko_api");
        assert_eq!(row.timestamp, "2023-11-14T22:13:20.000000Z");
        assert_eq!(row.timestamp, row.ingested_at);
    }

    #[test]
    fn test_price_row_defaults_missing_numbers_to_zero() {
        let mut snapshot = PriceSnapshot::new();
        snapshot.insert("doge", PriceQuote { usd: Some(0.07), ..PriceQuote::default() });

        let rows = format_price_rows(&snapshot, frozen_now());
        let FormattedRow::Price(row) = &rows[0] else {
            panic!("expected a price row");
        };
        assert_eq!(row.asset, "DOGE");
        assert_eq!(row.price_aud, 0.0);
        assert_eq!(row.market_cap_usd, 0.0);
        assert_eq!(row.volume_24h, 0.0);
    }

    #[test]
    fn test_exchange_rates_filtered_to_allow_list() {
        let mut rates = ExchangeRateSet::default();
        for code in ["usd", "eur", "sats", "xau", "krw"] {
            rates.rates.insert(code.to_string(), ExchangeRate {
                name: Some(format!("{} name", code)),
                unit: None,
                value: Some(1.0),
                currency_type: Some(CurrencyType::Fiat),
            });
        }

        let rows = format_exchange_rate_rows(&rates, frozen_now());
        let targets: Vec<_> = rows.iter()
            .map(|row| match row {
                FormattedRow::ExchangeRate(r) => r.target_currency.as_str(),
                _ => panic!("expected exchange rate rows"),
            })
            .collect();
        assert_eq!(targets, vec!["USD", "EUR", "KRW"]);
    }

    #[test]
    fn test_exchange_rates_none_allow_listed() {
        let mut rates = ExchangeRateSet::default();
        rates.rates.insert("sats".to_string(), ExchangeRate::default());
        assert!(format_exchange_rate_rows(&rates, frozen_now()).is_empty());
    }

    #[test]
    fn test_exchange_rate_defaults() {
        let mut rates = ExchangeRateSet::default();
        rates.rates.insert("gbp".to_string(), ExchangeRate::default());

        let rows = format_exchange_rate_rows(&rates, frozen_now());
        let FormattedRow::ExchangeRate(row) = &rows[0] else {
            panic!("expected an exchange rate row");
        };
        assert_eq!(row.base_currency, "BTC");
        assert_eq!(row.exchange_rate, 0.0);
        assert_eq!(row.currency_type, "unknown");
        assert_eq!(row.currency_name, "");
    }

    #[test]
    fn test_company_rows_capped_with_summary_last() {
        let report = CompanyHoldingsReport {
            total_holdings: Some(300_000.0),
            total_value_usd: Some(2.0e10),
            market_cap_dominance: Some(1.4),
            companies: (0..12)
                .map(|i| CompanyHolding {
                    name: Some(format!("Company {}", i)),
                    ..CompanyHolding::default()
                })
                .collect(),
        };

        let rows = format_company_rows(&report, frozen_now());
        assert_eq!(rows.len(), MAX_COMPANY_ROWS + 1);

        let FormattedRow::Company(first) = &rows[0] else {
            panic!("expected company rows");
        };
        assert_eq!(first.company_name, "Company 0");

        let FormattedRow::Company(summary) = rows.last().unwrap() else {
            panic!("expected company rows");
        };
        assert_eq!(summary.company_name, SUMMARY_COMPANY_NAME);
        assert_eq!(summary.ticker_symbol, SUMMARY_TICKER);
        assert_eq!(summary.country, SUMMARY_COUNTRY);
        assert_eq!(summary.total_btc, 300_000.0);
        assert_eq!(summary.total_value_usd, 2.0e10);
        assert_eq!(summary.percent_of_supply, 1.4);
    }

    #[test]
    fn test_empty_report_still_has_summary() {
        let rows = format_company_rows(&CompanyHoldingsReport::default(), frozen_now());
        assert_eq!(rows.len(), 1);
        let FormattedRow::Company(summary) = &rows[0] else {
            panic!("expected company rows");
        };
        assert_eq!(summary.company_name, SUMMARY_COMPANY_NAME);
        assert_eq!(summary.total_btc, 0.0);
    }
}
