use tracing::Span;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;
use crate::config::{LogConfig, LogFormat};
use crate::error::{Error, Result};

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::ConfigError(format!("invalid LOG_LEVEL {:?}: {}", config.level, e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(false)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_current_span(true)).try_init(),
    };

    installed.map_err(|e| Error::ConfigError(format!("failed to install tracing subscriber: {}", e)))
}

pub fn trace_cycle(cycle_id: &Uuid, cycle: u64) -> Span {
    tracing::info_span!(
        "harvest_cycle",
        cycle_id = %cycle_id,
        cycle = cycle,
    )
}

pub fn trace_stage(stage: &'static str) -> Span {
    tracing::info_span!(
        "sub_cycle",
        stage = stage,
    )
}
