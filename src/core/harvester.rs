use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use futures::FutureExt;
use tracing::Instrument;
use uuid::Uuid;
use crate::config::ScheduleConfig;
use crate::core::state_machine::CycleStateMachine;
use crate::core::ticker::Ticker;
use crate::error::{Error, Result, SinkError, SinkResult, UpstreamError};
use crate::formatter::{format_company_rows, format_exchange_rate_rows, format_price_rows};
use crate::interfaces::{Persistence, PriceSource, StreamingSink};
use crate::observability::metrics::{render, CYCLES_TOTAL, CYCLE_PANICS, PUSHES, SAVES, STAGE_FAILURES};
use crate::observability::tracing::{trace_cycle, trace_stage};
use crate::types::{Clock, DatasetKind, FormattedRow};

/// Data kinds fetched each cycle, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubCycle {
    Prices,
    SupportedCurrencies,
    ExchangeRates,
    CompanyHoldings,
}

impl SubCycle {
    pub const ALL: [SubCycle; 4] = [
        SubCycle::Prices,
        SubCycle::SupportedCurrencies,
        SubCycle::ExchangeRates,
        SubCycle::CompanyHoldings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubCycle::Prices => "prices",
            SubCycle::SupportedCurrencies => "supported_currencies",
            SubCycle::ExchangeRates => "exchange_rates",
            SubCycle::CompanyHoldings => "company_holdings",
        }
    }
}

impl fmt::Display for SubCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageOutcome {
    /// Fetch succeeded. `pushed` is `None` when nothing was streamed.
    Completed { saved: bool, pushed: Option<bool> },
    /// Fetch failed; nothing was saved or pushed.
    Failed(String),
}

impl StageOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, StageOutcome::Failed(_))
    }
}

#[derive(Clone, Debug)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub cycle: u64,
    pub stages: Vec<(SubCycle, StageOutcome)>,
}

impl CycleReport {
    pub fn outcome(&self, stage: SubCycle) -> Option<&StageOutcome> {
        self.stages.iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, outcome)| outcome)
    }

    pub fn failures(&self) -> usize {
        self.stages.iter().filter(|(_, outcome)| outcome.is_failed()).count()
    }
}

/// The poll loop: fetch, save, format and push each data kind in turn.
pub struct Harvester {
    source: Arc<dyn PriceSource>,
    store: Arc<dyn Persistence>,
    sink: Arc<dyn StreamingSink>,
    clock: Arc<dyn Clock>,
    schedule: ScheduleConfig,
    state: CycleStateMachine,
}

impl Harvester {
    pub fn new(
        source: Arc<dyn PriceSource>,
        store: Arc<dyn Persistence>,
        sink: Arc<dyn StreamingSink>,
        clock: Arc<dyn Clock>,
        schedule: ScheduleConfig,
    ) -> Self {
        Harvester {
            source,
            store,
            sink,
            clock,
            schedule,
            state: CycleStateMachine::new(),
        }
    }

    pub fn state(&self) -> &CycleStateMachine {
        &self.state
    }

    /// Runs until `ticker` declines a wait. A failed cycle never ends the loop.
    pub async fn run(&mut self, ticker: &mut impl Ticker) {
        tracing::info!(
            "Starting harvester: first cycle in {:?}, then every {:?}",
            self.schedule.startup_delay,
            self.schedule.poll_interval
        );

        if !ticker.wait(self.schedule.startup_delay).await {
            return;
        }

        loop {
            // Panics are already logged and counted by the guard
            let _ = self.run_guarded_cycle().await;
            if tracing::enabled!(tracing::Level::DEBUG) {
                tracing::debug!("Metrics:\n{}", render());
            }

            if !ticker.wait(self.schedule.poll_interval).await {
                break;
            }
        }

        tracing::info!("Harvester stopped after {} cycles", self.state.cycles_started());
    }

    /// One cycle behind a catch-all: a panic anywhere inside becomes `Error::Unexpected`.
    pub async fn run_guarded_cycle(&mut self) -> Result<CycleReport> {
        match AssertUnwindSafe(self.run_cycle()).catch_unwind().await {
            Ok(report) => Ok(report),
            Err(panic) => {
                self.state.end_cycle();
                CYCLE_PANICS.inc();

                let message = panic_message(panic.as_ref());
                tracing::error!("Error in harvest cycle: {}", message);
                Err(Error::Unexpected(message))
            }
        }
    }

    pub async fn run_cycle(&mut self) -> CycleReport {
        let cycle = self.state.begin_cycle();
        let cycle_id = Uuid::new_v4();
        CYCLES_TOTAL.inc();

        let report = self.run_stages(cycle_id, cycle)
            .instrument(trace_cycle(&cycle_id, cycle))
            .await;

        self.state.end_cycle();
        report
    }

    async fn run_stages(&self, cycle_id: Uuid, cycle: u64) -> CycleReport {
        tracing::info!("Fetching all data");

        let mut stages = Vec::with_capacity(SubCycle::ALL.len());
        for stage in SubCycle::ALL {
            let outcome = self.run_stage(stage)
                .instrument(trace_stage(stage.as_str()))
                .await;
            stages.push((stage, outcome));
        }

        let report = CycleReport { cycle_id, cycle, stages };
        match report.failures() {
            0 => tracing::info!("All data fetched successfully"),
            n => tracing::warn!("Cycle finished with {} of {} sub-cycles failed", n, SubCycle::ALL.len()),
        }
        report
    }

    async fn run_stage(&self, stage: SubCycle) -> StageOutcome {
        tracing::info!("Fetching {}", stage);

        match stage {
            SubCycle::Prices => self.prices().await,
            SubCycle::SupportedCurrencies => self.supported_currencies().await,
            SubCycle::ExchangeRates => self.exchange_rates().await,
            SubCycle::CompanyHoldings => self.company_holdings().await,
        }
    }

    async fn prices(&self) -> StageOutcome {
        let snapshot = match self.source.fetch_prices(None).await {
            Ok(snapshot) => snapshot,
            Err(e) => return fetch_failed(SubCycle::Prices, e),
        };

        let saved = record_save(SubCycle::Prices, self.store.save_prices(&snapshot).await);
        let rows = format_price_rows(&snapshot, self.clock.now());
        let pushed = self.publish(&rows, DatasetKind::Prices).await;

        StageOutcome::Completed { saved, pushed }
    }

    async fn supported_currencies(&self) -> StageOutcome {
        let currencies = match self.source.supported_currencies().await {
            Ok(currencies) => currencies,
            Err(e) => return fetch_failed(SubCycle::SupportedCurrencies, e),
        };

        let saved = record_save(
            SubCycle::SupportedCurrencies,
            self.store.save_supported_currencies(&currencies).await,
        );

        StageOutcome::Completed { saved, pushed: None }
    }

    async fn exchange_rates(&self) -> StageOutcome {
        let rates = match self.source.exchange_rates().await {
            Ok(rates) => rates,
            Err(e) => return fetch_failed(SubCycle::ExchangeRates, e),
        };

        let saved = record_save(SubCycle::ExchangeRates, self.store.save_exchange_rates(&rates).await);
        let rows = format_exchange_rate_rows(&rates, self.clock.now());
        let pushed = self.publish(&rows, DatasetKind::ExchangeRates).await;

        StageOutcome::Completed { saved, pushed }
    }

    async fn company_holdings(&self) -> StageOutcome {
        let report = match self.source.company_holdings().await {
            Ok(report) => report,
            Err(e) => return fetch_failed(SubCycle::CompanyHoldings, e),
        };

        let saved = record_save(
            SubCycle::CompanyHoldings,
            self.store.save_company_holdings(&report).await,
        );
        let rows = format_company_rows(&report, self.clock.now());
        let pushed = self.publish(&rows, DatasetKind::Companies).await;

        StageOutcome::Completed { saved, pushed }
    }

    /// Pushes `rows` and records the attempt. Empty row sets are only pushed for prices,
    /// so every price poll leaves an audit entry.
    async fn publish(&self, rows: &[FormattedRow], kind: DatasetKind) -> Option<bool> {
        if rows.is_empty() && kind != DatasetKind::Prices {
            tracing::info!("No {} rows to push", kind);
            return None;
        }

        let outcome = self.sink.push(rows, kind).await;
        PUSHES.with_label_values(&[kind.as_str(), outcome.status_label()]).inc();

        self.store.log_push_attempt(rows, &outcome).await;
        Some(outcome.succeeded)
    }
}

fn fetch_failed(stage: SubCycle, error: UpstreamError) -> StageOutcome {
    STAGE_FAILURES.with_label_values(&[stage.as_str()]).inc();
    tracing::error!("Error fetching {}: {}", stage, error);
    StageOutcome::Failed(error.to_string())
}

// The store logs its own failures; only the count is recorded here.
fn record_save(stage: SubCycle, result: SinkResult<usize>) -> bool {
    let status = match &result {
        Ok(_) => "success",
        Err(SinkError::NotConfigured) => "skipped",
        Err(_) => "failure",
    };
    SAVES.with_label_values(&[stage.as_str(), status]).inc();
    result.is_ok()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
