use crate::error::FetchError;
use crate::scrapers::extract::RawListing;
use async_trait::async_trait;
use scraper::ElementRef;

/// Response to a single listing-index request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub page: u32,
    pub status: u16,
    /// Body, present only when the status is 200
    pub body: Option<String>,
}

/// How the orchestrator must treat a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Ok,
    /// 403 / 429: the source is actively refusing us
    Blocked,
    Failed,
}

impl PageStatus {
    pub fn from_code(status: u16) -> Self {
        match status {
            200 => PageStatus::Ok,
            403 | 429 => PageStatus::Blocked,
            _ => PageStatus::Failed,
        }
    }
}

/// Source of listing-index pages.
/// Implemented over HTTP for real runs and over canned pages in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page. `Err` is reserved for transport failures (timeouts,
    /// refused connections); any HTTP status comes back as `Ok`.
    async fn fetch(&self, page: u32) -> Result<FetchedPage, FetchError>;

    /// Get the name of the page source
    fn source_name(&self) -> &'static str;
}

/// One way of reading a listing card.
///
/// Strategies are tried in order. Fields found by an earlier strategy win;
/// later strategies only fill what is still missing. Adding a new site
/// layout means appending a strategy.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, listing: ElementRef<'_>) -> Option<RawListing>;
}
