use std::sync::Arc;
use anyhow::Context;
use price_harvester::config::AppConfig;
use price_harvester::core::{Harvester, SleepTicker};
use price_harvester::observability::metrics::register_metrics;
use price_harvester::observability::tracing::init_tracing;
use price_harvester::price_infra::CoinGeckoClient;
use price_harvester::storage::MySqlStore;
use price_harvester::streaming::PowerBiClient;
use price_harvester::types::SystemClock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already be populated
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("invalid configuration")?;

    init_tracing(&config.logging)?;
    register_metrics().context("failed to register metrics")?;

    let source = CoinGeckoClient::new(&config.source, config.http_timeout)?;
    let store = MySqlStore::new(config.database.clone());
    let sink = PowerBiClient::new(&config.streaming, config.http_timeout)?;

    tracing::info!(
        "Tracking {} coins; MySQL storage {}",
        source.coins().len(),
        if store.is_configured() { "enabled" } else { "disabled" }
    );

    let mut harvester = Harvester::new(
        Arc::new(source),
        Arc::new(store),
        Arc::new(sink),
        Arc::new(SystemClock),
        config.schedule.clone(),
    );

    harvester.run(&mut SleepTicker).await;
    Ok(())
}
