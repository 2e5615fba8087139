use crate::models::FieldDefaults;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.rumah123.com/jual/jakarta-selatan/rumah/";

/// Parameters for one ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Listing index URL; the page number is appended as `?page=N`
    pub base_url: String,
    /// First page to fetch (1-based)
    pub start_page: u32,
    /// Number of pages to attempt
    pub pages: u32,
    /// Pool of User-Agent strings, one drawn at random per request
    pub user_agents: Vec<String>,
    /// Lower bound of the pause between pages, in milliseconds
    pub min_delay_ms: u64,
    /// Upper bound of the pause between pages, in milliseconds
    pub max_delay_ms: u64,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Fixed seed for user-agent and delay selection
    pub seed: Option<u64>,
    pub defaults: FieldDefaults,
}

impl ScrapeConfig {
    /// Page indices of the run, in fetch order
    pub fn page_range(&self) -> Range<u32> {
        self.start_page..self.start_page.saturating_add(self.pages)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn page_url(&self, page: u32) -> String {
        format!("{}?page={}", self.base_url, page)
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            start_page: 1,
            pages: 2,
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36".to_string(),
            ],
            min_delay_ms: 2_000,
            max_delay_ms: 5_000,
            timeout_secs: 30,
            seed: None,
            defaults: FieldDefaults::default(),
        }
    }
}
