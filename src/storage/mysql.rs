use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlConnection;
use sqlx::Connection;
use crate::config::DatabaseConfig;
use crate::error::{SinkError, SinkResult};
use crate::interfaces::Persistence;
use crate::storage::connector::{Connector, MySqlConnector};
use crate::types::timestamp::from_unix_seconds;
use crate::types::{CompanyHoldingsReport, CurrencyList, ExchangeRateSet, FormattedRow, PriceSnapshot, PushOutcome};

/// Rows of a push kept in the audit log as a representative sample.
pub const PUSH_LOG_SAMPLE_ROWS: usize = 2;

const COMPANY_DATA_SOURCE: &str = "public_companies";

const INSERT_PRICE: &str = r#"
    INSERT INTO crypto_prices
        (coin_id, coin_name, price_usd, price_usd_24h_change,
         market_cap_usd, volume_24h_usd, last_updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

const UPSERT_CURRENCY: &str = r#"
    INSERT INTO supported_currencies (currency_code, is_crypto)
    VALUES (?, ?)
    ON DUPLICATE KEY UPDATE updated_at = CURRENT_TIMESTAMP
"#;

const INSERT_EXCHANGE_RATE: &str = r#"
    INSERT INTO btc_exchange_rates
        (currency_code, currency_name, currency_type, rate_value, unit)
    VALUES (?, ?, ?, ?, ?)
"#;

const INSERT_COMPANY: &str = r#"
    INSERT INTO bitcoin_companies
        (company_name, symbol, country, total_holdings,
         total_entry_value_usd, total_current_value_usd,
         percentage_of_total_supply, data_source)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

const INSERT_TREASURY_SUMMARY: &str = r#"
    INSERT INTO bitcoin_treasury_summary
        (total_holdings, total_value_usd, companies_count,
         market_cap_dominance, data_source)
    VALUES (?, ?, ?, ?, ?)
"#;

const INSERT_PUSH_LOG: &str = r#"
    INSERT INTO powerbi_push_logs
        (status, response_code, error_message, data_pushed)
    VALUES (?, ?, ?, ?)
"#;

/// MySQL persistence sink. No pooling: every call connects, writes in one
/// transaction and closes the connection before returning.
pub struct MySqlStore {
    settings: Option<DatabaseConfig>,
    connector: Box<dyn Connector>,
}

impl MySqlStore {
    pub fn new(settings: Option<DatabaseConfig>) -> Self {
        Self::with_connector(settings, Box::new(MySqlConnector))
    }

    pub fn with_connector(settings: Option<DatabaseConfig>, connector: Box<dyn Connector>) -> Self {
        if settings.is_none() {
            tracing::warn!("MySQL configuration incomplete. Database operations will be skipped.");
        }
        MySqlStore { settings, connector }
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_some()
    }

    async fn open(&self) -> SinkResult<MySqlConnection> {
        let settings = self.settings.as_ref().ok_or(SinkError::NotConfigured)?;

        self.connector
            .connect(settings)
            .await
            .map_err(SinkError::Connect)
    }

    async fn finish(conn: MySqlConnection, result: SinkResult<usize>, what: &str) -> SinkResult<usize> {
        close(conn).await;

        match &result {
            Ok(count) => tracing::info!("Saved {} {} to database", count, what),
            Err(e) => tracing::error!("Error saving {}: {}", what, e),
        }
        result
    }

    async fn connect_for(&self, what: &str) -> SinkResult<MySqlConnection> {
        self.open().await.inspect_err(|e| match e {
            SinkError::NotConfigured => tracing::debug!("Database not configured, skipping {} save", what),
            e => tracing::error!("Failed to connect to database, skipping {} save: {}", what, e),
        })
    }

    async fn write_push_log(&self, rows: &[FormattedRow], outcome: &PushOutcome) -> SinkResult<usize> {
        let sample = push_sample(rows)?;

        let mut conn = self.open().await?;
        let result = sqlx::query(INSERT_PUSH_LOG)
            .bind(outcome.status_label())
            .bind(outcome.status_code)
            .bind(outcome.error.as_deref())
            .bind(sample)
            .execute(&mut conn)
            .await
            .map(|done| done.rows_affected() as usize)
            .map_err(SinkError::Write);

        close(conn).await;
        result
    }
}

/// JSON array of at most the first `PUSH_LOG_SAMPLE_ROWS` pushed rows.
fn push_sample(rows: &[FormattedRow]) -> SinkResult<String> {
    let sample = &rows[..rows.len().min(PUSH_LOG_SAMPLE_ROWS)];
    Ok(serde_json::to_string(sample)?)
}

async fn close(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        tracing::debug!("Error closing MySQL connection: {}", e);
    }
}

// A transaction dropped before commit rolls back, so an early `?` undoes the whole batch.

async fn write_prices(conn: &mut MySqlConnection, snapshot: &PriceSnapshot, now: DateTime<Utc>) -> SinkResult<usize> {
    let mut tx = conn.begin().await.map_err(SinkError::Write)?;

    for (coin_id, quote) in snapshot.iter() {
        sqlx::query(INSERT_PRICE)
            .bind(coin_id)
            .bind(coin_id.to_uppercase())
            .bind(quote.usd.unwrap_or(0.0))
            .bind(quote.usd_24h_change.unwrap_or(0.0))
            .bind(quote.usd_market_cap.unwrap_or(0.0))
            .bind(quote.usd_24h_vol.unwrap_or(0.0))
            .bind(from_unix_seconds(quote.last_updated_at, now))
            .execute(&mut *tx)
            .await
            .map_err(SinkError::Write)?;
    }

    tx.commit().await.map_err(SinkError::Write)?;
    Ok(snapshot.len())
}

async fn write_currencies(conn: &mut MySqlConnection, currencies: &CurrencyList) -> SinkResult<usize> {
    let mut tx = conn.begin().await.map_err(SinkError::Write)?;

    for (code, is_crypto) in currencies.classified() {
        sqlx::query(UPSERT_CURRENCY)
            .bind(code)
            .bind(is_crypto)
            .execute(&mut *tx)
            .await
            .map_err(SinkError::Write)?;
    }

    tx.commit().await.map_err(SinkError::Write)?;
    Ok(currencies.len())
}

async fn write_exchange_rates(conn: &mut MySqlConnection, rates: &ExchangeRateSet) -> SinkResult<usize> {
    let mut tx = conn.begin().await.map_err(SinkError::Write)?;

    for (code, rate) in &rates.rates {
        sqlx::query(INSERT_EXCHANGE_RATE)
            .bind(code)
            .bind(rate.name.as_deref().unwrap_or(code))
            .bind(rate.currency_type().as_str())
            .bind(rate.value.unwrap_or(0.0))
            .bind(rate.unit.as_deref().unwrap_or(code))
            .execute(&mut *tx)
            .await
            .map_err(SinkError::Write)?;
    }

    tx.commit().await.map_err(SinkError::Write)?;
    Ok(rates.len())
}

async fn write_company_holdings(conn: &mut MySqlConnection, report: &CompanyHoldingsReport) -> SinkResult<usize> {
    let mut tx = conn.begin().await.map_err(SinkError::Write)?;

    for company in &report.companies {
        sqlx::query(INSERT_COMPANY)
            .bind(company.name.as_deref().unwrap_or(""))
            .bind(company.symbol.as_deref())
            .bind(company.country.as_deref())
            .bind(company.total_holdings.unwrap_or(0.0))
            .bind(company.total_entry_value_usd)
            .bind(company.total_current_value_usd)
            .bind(company.percentage_of_total_supply)
            .bind(COMPANY_DATA_SOURCE)
            .execute(&mut *tx)
            .await
            .map_err(SinkError::Write)?;
    }

    // Summary goes in the same transaction as the company rows
    let summary = report.summary();
    sqlx::query(INSERT_TREASURY_SUMMARY)
        .bind(summary.total_holdings)
        .bind(report.total_value_usd)
        .bind(summary.companies_count as i64)
        .bind(report.market_cap_dominance)
        .bind(COMPANY_DATA_SOURCE)
        .execute(&mut *tx)
        .await
        .map_err(SinkError::Write)?;

    tx.commit().await.map_err(SinkError::Write)?;
    Ok(summary.companies_count)
}

#[async_trait]
impl Persistence for MySqlStore {
    async fn save_prices(&self, snapshot: &PriceSnapshot) -> SinkResult<usize> {
        let mut conn = self.connect_for("crypto prices").await?;
        let result = write_prices(&mut conn, snapshot, Utc::now()).await;
        Self::finish(conn, result, "crypto prices").await
    }

    async fn save_supported_currencies(&self, currencies: &CurrencyList) -> SinkResult<usize> {
        let mut conn = self.connect_for("supported currencies").await?;
        let result = write_currencies(&mut conn, currencies).await;
        Self::finish(conn, result, "supported currencies").await
    }

    async fn save_exchange_rates(&self, rates: &ExchangeRateSet) -> SinkResult<usize> {
        let mut conn = self.connect_for("BTC exchange rates").await?;
        let result = write_exchange_rates(&mut conn, rates).await;
        Self::finish(conn, result, "BTC exchange rates").await
    }

    async fn save_company_holdings(&self, report: &CompanyHoldingsReport) -> SinkResult<usize> {
        let mut conn = self.connect_for("Bitcoin companies").await?;
        let result = write_company_holdings(&mut conn, report).await;
        Self::finish(conn, result, "Bitcoin companies").await
    }

    async fn log_push_attempt(&self, rows: &[FormattedRow], outcome: &PushOutcome) {
        match self.write_push_log(rows, outcome).await {
            Ok(_) => tracing::debug!("Logged {} push attempt ({} rows)", outcome.status_label(), rows.len()),
            Err(SinkError::NotConfigured) => {}
            Err(e) => tracing::error!("Error logging push attempt to MySQL: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::connector::MockConnector;
    use crate::types::{DatasetKind, PriceQuote, PriceRow};

    fn database() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 3306,
            database: "crypto".to_string(),
            user: "harvester".to_string(),
            password: "secret".to_string(),
        }
    }

    fn snapshot() -> PriceSnapshot {
        let mut snapshot = PriceSnapshot::new();
        snapshot.insert("btc", PriceQuote { usd: Some(65000.0), ..PriceQuote::default() });
        snapshot
    }

    #[tokio::test]
    async fn test_unconfigured_store_never_connects() {
        let mut connector = MockConnector::new();
        connector.expect_connect().never();

        let store = MySqlStore::with_connector(None, Box::new(connector));
        assert!(!store.is_configured());

        assert!(matches!(store.save_prices(&snapshot()).await, Err(SinkError::NotConfigured)));
        assert!(matches!(
            store.save_supported_currencies(&CurrencyList(vec!["usd".to_string()])).await,
            Err(SinkError::NotConfigured)
        ));
        assert!(matches!(
            store.save_exchange_rates(&ExchangeRateSet::default()).await,
            Err(SinkError::NotConfigured)
        ));
        assert!(matches!(
            store.save_company_holdings(&CompanyHoldingsReport::default()).await,
            Err(SinkError::NotConfigured)
        ));

        store.log_push_attempt(&[], &PushOutcome::not_configured(DatasetKind::Prices)).await;
    }

    #[tokio::test]
    async fn test_connection_failure_is_reported_per_call() {
        let mut connector = MockConnector::new();
        connector.expect_connect()
            .times(3)
            .returning(|_| Err(sqlx::Error::PoolTimedOut));

        let store = MySqlStore::with_connector(Some(database()), Box::new(connector));

        assert!(matches!(store.save_prices(&snapshot()).await, Err(SinkError::Connect(_))));
        assert!(matches!(
            store.save_company_holdings(&CompanyHoldingsReport::default()).await,
            Err(SinkError::Connect(_))
        ));

        // Audit logging swallows the failure
        store.log_push_attempt(&[], &PushOutcome::success(200)).await;
    }

    fn price_rows(count: usize) -> Vec<FormattedRow> {
        (0..count)
            .map(|i| FormattedRow::Price(PriceRow {
                asset: format!("COIN{}", i),
                price_aud: 1.5,
                timestamp: "2023-11-14T22:13:20.000000Z".to_string(),
                price_usd: 1.0,
                exchange: "coingecko".to_string(),
                source: "coingecko_api".to_string(),
                volume_24h: 0.0,
                change_pct_24h: 0.0,
                market_cap_usd: 0.0,
                ingested_at: "2023-11-14T22:13:20.000000Z".to_string(),
            }))
            .collect()
    }

    #[test]
    fn test_push_sample_keeps_at_most_two_rows() {
        for (pushed, sampled) in [(0, 0), (1, 1), (2, 2), (5, 2)] {
            let sample = push_sample(&price_rows(pushed)).unwrap();
            let value: serde_json::Value = serde_json::from_str(&sample).unwrap();

            let rows = value.as_array().unwrap();
            assert_eq!(rows.len(), sampled, "{} rows pushed", pushed);
            if sampled > 0 {
                assert_eq!(rows[0]["asset"], "COIN0");
            }
        }
    }
}
