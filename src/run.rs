use crate::scrapers::ingest::{IngestState, Ingestor};
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::ScrapeConfig;
use crate::store::{DatasetStore, MergeOutcome};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// What one ingestion run did, written out with `--summary`
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub final_state: IngestState,
    pub blocked_status: Option<u16>,
    pub pages_attempted: u32,
    pub pages_failed: u32,
    pub listings_seen: usize,
    pub listings_skipped: usize,
    pub listings_rejected: usize,
    pub admitted: usize,
    /// Rows in the store after the run; `None` when the store was not touched
    pub stored_rows: Option<usize>,
}

impl RunSummary {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "Saved run summary");
        Ok(())
    }
}

/// Ingest the configured pages and merge whatever was admitted into `store`.
///
/// A blocked run still merges its partial batch. An empty batch leaves the
/// store alone. A store that cannot be read is an error and is not written.
pub async fn ingest_and_merge<F: PageFetcher>(
    fetcher: F,
    config: &ScrapeConfig,
    store: &DatasetStore,
) -> Result<RunSummary> {
    let started_at = Utc::now();
    let source = fetcher.source_name().to_string();

    let mut ingestor = Ingestor::new(fetcher, config)?;
    let report = ingestor.run(config.page_range()).await;

    if report.was_aborted() {
        warn!(
            admitted = report.records.len(),
            "Run aborted; merging records gathered before the block"
        );
    }
    if report.records.is_empty() {
        warn!("No data scraped. Check selectors or anti-scraping blocking");
    }

    let admitted = report.records.len();
    let outcome = store
        .merge_and_save(report.records)
        .with_context(|| format!("Failed to merge into {}", store.path().display()))?;

    let stored_rows = match outcome {
        MergeOutcome::Unchanged => None,
        MergeOutcome::Saved { rows, previous_rows } => {
            info!(rows, previous_rows, admitted, "Dataset updated");
            Some(rows)
        }
    };

    Ok(RunSummary {
        source,
        started_at,
        finished_at: Utc::now(),
        final_state: report.final_state,
        blocked_status: report.blocked_status,
        pages_attempted: report.pages_attempted,
        pages_failed: report.pages_failed,
        listings_seen: report.listings_seen,
        listings_skipped: report.listings_skipped,
        listings_rejected: report.listings_rejected,
        admitted,
        stored_rows,
    })
}
