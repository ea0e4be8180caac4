use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::{
    cancellation::Cancellation,
    clock::{Clock, Sleeper, SystemClock, TokioSleeper},
    configuration::Config,
    error::Error,
    handler::{
        aggregator::aggregate,
        paginator::{Completion, Paginator, Progress},
    },
    model::{SummaryReport, Window},
    provider::{LedgerSource, HTTP},
    types::SummaryRequest,
};

/// Validates credentials, walks the ledger and summarizes it. Nothing is
/// aggregated unless pagination finished or hit the page cap.
#[derive(Debug, Clone)]
pub struct SummaryService {
    config: Config,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
}

impl SummaryService {
    pub fn new(config: Config) -> Self {
        Self::with_runtime(config, Arc::new(SystemClock), Arc::new(TokioSleeper))
    }

    pub fn with_runtime(
        config: Config,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            config,
            clock,
            sleeper,
        }
    }

    pub async fn summarize(
        &self,
        http: &HTTP,
        request: SummaryRequest,
        cancellation: &Cancellation,
        progress: Option<UnboundedSender<Progress>>,
    ) -> Result<SummaryReport, Error> {
        let credentials = request.validate()?;
        let source = http.ledger(&credentials)?;

        self.summarize_from(&source, cancellation, progress).await
    }

    pub async fn summarize_from<S>(
        &self,
        source: &S,
        cancellation: &Cancellation,
        progress: Option<UnboundedSender<Progress>>,
    ) -> Result<SummaryReport, Error>
    where
        S: LedgerSource + ?Sized,
    {
        let paginator = Paginator::new(
            self.config.page_size,
            self.config.max_pages,
            self.config.page_delay,
            self.sleeper.as_ref(),
        )
        .with_progress(progress);

        let pagination = paginator.run(source, cancellation).await?;
        let summary = aggregate(&pagination.entries, self.clock.now());

        info!(
            "Summarized {} rollover entries out of {} ledger entries in {} pages",
            summary.count,
            pagination.entries.len(),
            pagination.pages
        );
        for window in Window::ALL {
            debug!(
                "Rollover total {}: {}",
                window,
                summary.totals_by_window.get(window)
            );
        }

        Ok(SummaryReport {
            summary,
            pages: pagination.pages,
            truncated: pagination.completion == Completion::Truncated,
        })
    }
}
