use std::time::Duration;

pub mod loader;

pub use loader::AppConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_COINS: [&str; 11] = [
    "btc", "eth", "xrp", "usdt", "sol", "bnb", "usdc", "doge", "ada", "avax", "shib",
];

#[derive(Clone, Debug)]
pub struct SourceConfig {
    pub api_key: String,
    pub base_url: String,
    pub coins: Vec<String>,
}

/// Present only when every connection field is set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamingConfig {
    pub prices_url: String,
    pub exchange_rates_url: Option<String>,
    pub companies_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub poll_interval: Duration,
    pub startup_delay: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            poll_interval: Duration::from_secs(60),
            startup_delay: Duration::from_secs(10),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Pretty,
            level: "info".to_string(),
        }
    }
}
