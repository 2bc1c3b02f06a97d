use async_trait::async_trait;
use crate::types::{DatasetKind, FormattedRow, PushOutcome};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StreamingSink: Send + Sync {
    /// Sends `rows` as one JSON array to the endpoint for `kind`.
    async fn push(&self, rows: &[FormattedRow], kind: DatasetKind) -> PushOutcome;
}
