use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::{
    cancellation::Cancellation,
    clock::Sleeper,
    error::Error,
    provider::{LedgerSource, PageError},
    types::LedgerEntry,
};

/// Observable pagination progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    PageFetched {
        page: usize,
        received: usize,
        total: usize,
    },
    Waiting {
        page: usize,
        delay: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The upstream signalled end of history with an empty or short page.
    Exhausted,
    /// The page cap was reached; the history is valid but incomplete.
    Truncated,
}

#[derive(Debug)]
pub struct Pagination {
    pub entries: Vec<LedgerEntry>,
    pub pages: usize,
    pub completion: Completion,
}

/// Walks the ledger one page at a time. Calls are strictly sequential and
/// separated by a fixed pacing delay, which keeps nonces ordered and the
/// per-key rate limit respected.
pub struct Paginator<'a> {
    page_size: usize,
    max_pages: usize,
    delay: Duration,
    sleeper: &'a dyn Sleeper,
    progress: Option<UnboundedSender<Progress>>,
}

impl<'a> Paginator<'a> {
    pub fn new(
        page_size: usize,
        max_pages: usize,
        delay: Duration,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            page_size,
            max_pages,
            delay,
            sleeper,
            progress: None,
        }
    }

    pub fn with_progress(
        mut self,
        progress: Option<UnboundedSender<Progress>>,
    ) -> Self {
        self.progress = progress;
        self
    }

    pub async fn run<S>(
        &self,
        source: &S,
        cancellation: &Cancellation,
    ) -> Result<Pagination, Error>
    where
        S: LedgerSource + ?Sized,
    {
        let mut entries = Vec::new();
        let mut offset = 0;
        let mut pages = 0;

        loop {
            if cancellation.is_cancelled() {
                info!("Pagination cancelled before page {}", pages + 1);
                return Err(Error::Cancelled);
            }

            // an in-flight call is dropped, and its page discarded, on cancel
            let page = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    info!("Pagination cancelled during page {}", pages + 1);
                    return Err(Error::Cancelled);
                },
                page = source.fetch_page(offset) => page,
            };

            let page = page.map_err(|error| {
                match &error {
                    PageError::RateLimited => {
                        warn!("Rate limited at page {}", pages + 1)
                    },
                    e => warn!("Page {} failed: {}", pages + 1, e),
                }
                Error::from(error)
            })?;

            pages += 1;
            let received = page.len();

            if received == 0 {
                info!("Ledger exhausted after {} pages", pages);
                return Ok(Pagination {
                    entries,
                    pages,
                    completion: Completion::Exhausted,
                });
            }

            entries.extend(page.into_entries());
            offset += received;

            info!("Page {} fetched, {} entries", pages, received);
            self.emit(Progress::PageFetched {
                page: pages,
                received,
                total: entries.len(),
            });

            if received < self.page_size {
                return Ok(Pagination {
                    entries,
                    pages,
                    completion: Completion::Exhausted,
                });
            }

            if pages >= self.max_pages {
                warn!(
                    "Page cap of {} reached, history truncated at {} entries",
                    self.max_pages,
                    entries.len()
                );
                return Ok(Pagination {
                    entries,
                    pages,
                    completion: Completion::Truncated,
                });
            }

            self.emit(Progress::Waiting {
                page: pages,
                delay: self.delay,
            });

            tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    info!("Pagination cancelled while waiting after page {}", pages);
                    return Err(Error::Cancelled);
                },
                _ = self.sleeper.sleep(self.delay) => {},
            }
        }
    }

    fn emit(&self, event: Progress) {
        if let Some(progress) = &self.progress {
            // nobody listening is fine
            let _ = progress.send(event);
        }
    }
}
