use async_trait::async_trait;
use tokio::time::{sleep, Duration};

/// Scheduler seam for the harvest loop.
#[async_trait]
pub trait Ticker: Send {
    /// Waits `period`. Returning `false` stops the loop.
    async fn wait(&mut self, period: Duration) -> bool;
}

/// Wall-clock ticker. Never stops the loop.
#[derive(Debug, Default)]
pub struct SleepTicker;

#[async_trait]
impl Ticker for SleepTicker {
    async fn wait(&mut self, period: Duration) -> bool {
        if !period.is_zero() {
            sleep(period).await;
        }
        true
    }
}
