use std::time::Duration;
use config::{Config, Environment, File};
use serde::Deserialize;
use crate::config::*;
use crate::error::{Error, Result};

/// Validated, immutable settings handed to every component at construction.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub database: Option<DatabaseConfig>,
    pub streaming: StreamingConfig,
    pub schedule: ScheduleConfig,
    pub http_timeout: Duration,
    pub logging: LogConfig,
}

/// Flat key/value view, as read from `config/default.toml` and the environment.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    cg_key: Option<String>,
    cg_base_url: Option<String>,
    coins: Option<String>,
    http_timeout_seconds: Option<String>,
    mysql_host: Option<String>,
    mysql_port: Option<String>,
    mysql_database: Option<String>,
    mysql_user: Option<String>,
    mysql_password: Option<String>,
    pbi_prices_push_url: Option<String>,
    pbi_exchange_rates_url: Option<String>,
    pbi_companies_url: Option<String>,
    poll_interval_seconds: Option<String>,
    startup_delay_seconds: Option<String>,
    log_format: Option<String>,
    log_level: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::default())
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let raw: RawSettings = config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        raw.validate()
    }
}

impl RawSettings {
    fn validate(self) -> Result<AppConfig> {
        let api_key = required(self.cg_key, "CG_KEY")?;
        let prices_url = required(self.pbi_prices_push_url, "PBI_PRICES_PUSH_URL")?;

        let coins = match non_empty(self.coins) {
            Some(list) => parse_coins(&list),
            None => DEFAULT_COINS.iter().map(|c| c.to_string()).collect(),
        };
        if coins.is_empty() {
            return Err(Error::ConfigError("COINS must name at least one symbol".to_string()));
        }

        let http_timeout = seconds(self.http_timeout_seconds, "HTTP_TIMEOUT_SECONDS", 10)?;
        if http_timeout.is_zero() {
            return Err(Error::ConfigError("HTTP_TIMEOUT_SECONDS must be positive".to_string()));
        }

        let defaults = ScheduleConfig::default();
        let schedule = ScheduleConfig {
            poll_interval: seconds(
                self.poll_interval_seconds,
                "POLL_INTERVAL_SECONDS",
                defaults.poll_interval.as_secs(),
            )?,
            startup_delay: seconds(
                self.startup_delay_seconds,
                "STARTUP_DELAY_SECONDS",
                defaults.startup_delay.as_secs(),
            )?,
        };
        if schedule.poll_interval.is_zero() {
            return Err(Error::ConfigError("POLL_INTERVAL_SECONDS must be positive".to_string()));
        }

        let database = database_group(
            non_empty(self.mysql_host),
            non_empty(self.mysql_port),
            non_empty(self.mysql_database),
            non_empty(self.mysql_user),
            non_empty(self.mysql_password),
        )?;

        let logging = LogConfig {
            format: match non_empty(self.log_format).as_deref().map(str::to_ascii_lowercase).as_deref() {
                None | Some("pretty") => LogFormat::Pretty,
                Some("json") => LogFormat::Json,
                Some(other) => {
                    return Err(Error::ConfigError(format!("unknown LOG_FORMAT: {}", other)));
                }
            },
            level: non_empty(self.log_level).unwrap_or_else(|| LogConfig::default().level),
        };

        Ok(AppConfig {
            source: SourceConfig {
                api_key,
                base_url: non_empty(self.cg_base_url)
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                coins,
            },
            database,
            streaming: StreamingConfig {
                prices_url,
                exchange_rates_url: non_empty(self.pbi_exchange_rates_url),
                companies_url: non_empty(self.pbi_companies_url),
            },
            schedule,
            http_timeout,
            logging,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    non_empty(value).ok_or_else(|| Error::ConfigError(format!("{} is not set", key)))
}

fn seconds(value: Option<String>, key: &str, default: u64) -> Result<Duration> {
    match non_empty(value) {
        Some(v) => v.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| Error::ConfigError(format!("{} must be a whole number of seconds, got {:?}", key, v))),
        None => Ok(Duration::from_secs(default)),
    }
}

fn parse_coins(list: &str) -> Vec<String> {
    list.split(',')
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect()
}

// All-or-nothing: a partial group disables persistence rather than failing startup.
fn database_group(
    host: Option<String>,
    port: Option<String>,
    database: Option<String>,
    user: Option<String>,
    password: Option<String>,
) -> Result<Option<DatabaseConfig>> {
    let (Some(host), Some(port), Some(database), Some(user), Some(password)) =
        (host, port, database, user, password)
    else {
        return Ok(None);
    };

    let port = port.parse::<u16>()
        .map_err(|_| Error::ConfigError(format!("MYSQL_PORT must be a port number, got {:?}", port)))?;

    Ok(Some(DatabaseConfig { host, port, database, user, password }))
}
