use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Cycle metrics
    pub static ref CYCLES_TOTAL: IntCounter = IntCounter::new(
        "harvest_cycles_total",
        "Total number of harvest cycles started"
    ).unwrap();

    pub static ref CYCLE_PANICS: IntCounter = IntCounter::new(
        "harvest_cycle_panics_total",
        "Harvest cycles aborted by an unexpected panic"
    ).unwrap();

    pub static ref STAGE_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("harvest_stage_failures_total", "Sub-cycles that failed to fetch"),
        &["stage"]
    ).unwrap();

    // Sink metrics
    pub static ref SAVES: IntCounterVec = IntCounterVec::new(
        Opts::new("harvest_saves_total", "Database saves by stage and status"),
        &["stage", "status"]
    ).unwrap();

    pub static ref PUSHES: IntCounterVec = IntCounterVec::new(
        Opts::new("harvest_pushes_total", "Streaming pushes by dataset and status"),
        &["dataset", "status"]
    ).unwrap();
}

pub fn register_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(CYCLES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CYCLE_PANICS.clone()))?;
    REGISTRY.register(Box::new(STAGE_FAILURES.clone()))?;
    REGISTRY.register(Box::new(SAVES.clone()))?;
    REGISTRY.register(Box::new(PUSHES.clone()))?;
    Ok(())
}

/// Text exposition of everything in `REGISTRY`.
pub fn render() -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
