use std::net::TcpListener;
use std::time::Duration;
use price_harvester::config::StreamingConfig;
use price_harvester::interfaces::StreamingSink;
use price_harvester::streaming::PowerBiClient;
use price_harvester::types::{DatasetKind, ExchangeRateRow, FormattedRow};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rows() -> Vec<FormattedRow> {
    ["USD", "EUR"].iter()
        .map(|code| FormattedRow::ExchangeRate(ExchangeRateRow {
            base_currency: "BTC".to_string(),
            target_currency: code.to_string(),
            exchange_rate: 65000.0,
            currency_type: "fiat".to_string(),
            currency_name: format!("{} name", code),
            timestamp: "2023-11-14T22:13:20.000000Z".to_string(),
        }))
        .collect()
}

/// Address of a port nothing listens on. wiremock servers are pooled, so dropping one keeps it alive.
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn client(prices_url: String, exchange_rates_url: Option<String>) -> PowerBiClient {
    let config = StreamingConfig {
        prices_url,
        exchange_rates_url,
        companies_url: None,
    };
    PowerBiClient::new(&config, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_push_posts_rows_as_one_json_array() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rates"))
        .and(body_json(json!([
            {"base_currency": "BTC", "target_currency": "USD", "exchange_rate": 65000.0,
             "currency_type": "fiat", "currency_name": "USD name",
             "timestamp": "2023-11-14T22:13:20.000000Z"},
            {"base_currency": "BTC", "target_currency": "EUR", "exchange_rate": 65000.0,
             "currency_type": "fiat", "currency_name": "EUR name",
             "timestamp": "2023-11-14T22:13:20.000000Z"}
        ])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(format!("{}/prices", server.uri()), Some(format!("{}/rates", server.uri())));
    let outcome = client.push(&rows(), DatasetKind::ExchangeRates).await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.status_code, Some(200));
    assert_eq!(outcome.error, None);
}

#[tokio::test]
async fn test_non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(400).set_body_string("row schema mismatch"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(format!("{}/prices", server.uri()), None);
    let outcome = client.push(&rows(), DatasetKind::Prices).await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.status_code, Some(400));
    let error = outcome.error.unwrap();
    assert!(error.contains("prices"));
    assert!(error.contains("400"));
    assert!(error.contains("row schema mismatch"));
}

#[tokio::test]
async fn test_unconfigured_and_placeholder_urls_make_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let placeholder = format!("{}/paste_your_prices_push_url_here", server.uri());
    let client = client(placeholder, None);

    let prices = client.push(&rows(), DatasetKind::Prices).await;
    assert!(!prices.succeeded);
    assert_eq!(prices.error.as_deref(), Some("prices URL not configured"));

    let rates = client.push(&rows(), DatasetKind::ExchangeRates).await;
    assert!(!rates.succeeded);
    assert_eq!(rates.status_code, None);
    assert_eq!(rates.error.as_deref(), Some("exchange_rates URL not configured"));
}

#[tokio::test]
async fn test_unreachable_endpoint_has_no_status_code() {
    let url = format!("{}/prices", closed_port_url());

    let outcome = client(url, None).push(&rows(), DatasetKind::Prices).await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.status_code, None);
    assert!(outcome.error.is_some());
}
