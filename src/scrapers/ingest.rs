use crate::models::ListingRecord;
use crate::scrapers::extract::ListingExtractor;
use crate::scrapers::traits::{PageFetcher, PageStatus};
use crate::scrapers::types::ScrapeConfig;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::ops::Range;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Where the page loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IngestState {
    Fetching(u32),
    Extracting(u32),
    Paused(u32),
    Aborted,
    Completed,
}

impl IngestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, IngestState::Aborted | IngestState::Completed)
    }
}

/// Randomised pause between page requests
pub struct Pacer {
    min_ms: u64,
    max_ms: u64,
    rng: StdRng,
}

impl Pacer {
    pub fn new(config: &ScrapeConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        Self {
            min_ms: config.min_delay_ms.min(config.max_delay_ms),
            max_ms: config.max_delay_ms.max(config.min_delay_ms),
            rng,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        Duration::from_millis(self.rng.gen_range(self.min_ms..=self.max_ms))
    }

    async fn pause(&mut self) {
        let delay = self.next_delay();
        debug!(delay_ms = delay.as_millis() as u64, "Pausing before next page");
        tokio::time::sleep(delay).await;
    }
}

/// Result of one pass over the page range
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    /// Admitted records in page order, then document order
    pub records: Vec<ListingRecord>,
    pub final_state: IngestState,
    /// Status that caused the abort, if any
    pub blocked_status: Option<u16>,
    pub pages_attempted: u32,
    pub pages_failed: u32,
    pub listings_seen: usize,
    pub listings_skipped: usize,
    pub listings_rejected: usize,
}

impl IngestReport {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            final_state: IngestState::Completed,
            blocked_status: None,
            pages_attempted: 0,
            pages_failed: 0,
            listings_seen: 0,
            listings_skipped: 0,
            listings_rejected: 0,
        }
    }

    pub fn was_aborted(&self) -> bool {
        self.final_state == IngestState::Aborted
    }
}

/// Drives fetch, extract and pause over the pages of a run, one page at a time
pub struct Ingestor<F: PageFetcher> {
    fetcher: F,
    extractor: ListingExtractor,
    pacer: Pacer,
}

impl<F: PageFetcher> Ingestor<F> {
    pub fn new(fetcher: F, config: &ScrapeConfig) -> Result<Self> {
        let extractor =
            ListingExtractor::new(config.defaults).context("Failed to build listing extractor")?;
        Ok(Self::with_parts(fetcher, extractor, Pacer::new(config)))
    }

    pub fn with_parts(fetcher: F, extractor: ListingExtractor, pacer: Pacer) -> Self {
        Self {
            fetcher,
            extractor,
            pacer,
        }
    }

    /// Walk `pages` in order. Stops early only when the source blocks us;
    /// whatever was admitted before that is still returned.
    pub async fn run(&mut self, pages: Range<u32>) -> IngestReport {
        let mut report = IngestReport::new();
        let last_page = pages.end.saturating_sub(1);

        info!(
            source = self.fetcher.source_name(),
            first = pages.start,
            last = last_page,
            "Starting ingestion"
        );

        let mut state = IngestState::Fetching(pages.start);
        for page in pages {
            state = transition(state, IngestState::Fetching(page));
            report.pages_attempted += 1;

            match self.fetcher.fetch(page).await {
                Ok(fetched) => match PageStatus::from_code(fetched.status) {
                    PageStatus::Ok => {
                        state = transition(state, IngestState::Extracting(page));
                        let html = fetched.body.unwrap_or_default();
                        let outcome = self.extractor.extract_page(&html);

                        info!(
                            page,
                            found = outcome.listings_seen,
                            admitted = outcome.records.len(),
                            "Page extracted"
                        );

                        report.listings_seen += outcome.listings_seen;
                        report.listings_skipped += outcome.skipped;
                        report.listings_rejected += outcome.rejected;
                        report.records.extend(outcome.records);
                    }
                    PageStatus::Blocked => {
                        error!(page, status = fetched.status, "Blocked by anti-scraping, stopping");
                        report.blocked_status = Some(fetched.status);
                        report.final_state = transition(state, IngestState::Aborted);
                        return report;
                    }
                    PageStatus::Failed => {
                        warn!(page, status = fetched.status, "Failed to fetch page, skipping");
                        report.pages_failed += 1;
                    }
                },
                Err(e) => {
                    warn!(page, error = %e, "Request failed, skipping page");
                    report.pages_failed += 1;
                }
            }

            if page < last_page {
                state = transition(state, IngestState::Paused(page));
                self.pacer.pause().await;
            }
        }

        report.final_state = transition(state, IngestState::Completed);
        info!(
            pages = report.pages_attempted,
            admitted = report.records.len(),
            "Ingestion completed"
        );
        report
    }
}

fn transition(from: IngestState, to: IngestState) -> IngestState {
    debug!(?from, ?to, "Ingest state change");
    to
}
