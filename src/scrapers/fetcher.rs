use crate::error::FetchError;
use crate::scrapers::traits::{FetchedPage, PageFetcher};
use crate::scrapers::types::ScrapeConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::sync::Mutex;
use tracing::{debug, warn};

const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36";

/// Fetches listing-index pages over HTTP with a rotating request identity
pub struct HttpPageFetcher {
    client: Client,
    config: ScrapeConfig,
    rng: Mutex<StdRng>,
}

impl HttpPageFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            client,
            config: config.clone(),
            rng: Mutex::new(rng),
        })
    }

    fn pick_user_agent(&self) -> String {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.config
            .user_agents
            .choose(&mut *rng)
            .cloned()
            .unwrap_or_else(|| FALLBACK_USER_AGENT.to_string())
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, page: u32) -> Result<FetchedPage, FetchError> {
        let url = self.config.page_url(page);
        let user_agent = self.pick_user_agent();

        debug!(page, %url, %user_agent, "Fetching listing page");

        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|source| classify(page, source))?;

        let status = response.status().as_u16();
        if status != 200 {
            warn!(page, status, "Listing page returned non-success status");
            return Ok(FetchedPage {
                page,
                status,
                body: None,
            });
        }

        let html = response.text().await.map_err(|source| classify(page, source))?;
        debug!(page, bytes = html.len(), "Downloaded listing page");

        Ok(FetchedPage {
            page,
            status,
            body: Some(html),
        })
    }

    fn source_name(&self) -> &'static str {
        "rumah123"
    }
}

fn classify(page: u32, source: reqwest::Error) -> FetchError {
    if source.is_timeout() {
        FetchError::Timeout { page }
    } else {
        FetchError::Transport { page, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_fetchers_pick_the_same_identities() {
        let config = ScrapeConfig {
            seed: Some(42),
            ..ScrapeConfig::default()
        };
        let a = HttpPageFetcher::new(&config).unwrap();
        let b = HttpPageFetcher::new(&config).unwrap();

        let picks_a: Vec<_> = (0..8).map(|_| a.pick_user_agent()).collect();
        let picks_b: Vec<_> = (0..8).map(|_| b.pick_user_agent()).collect();
        assert_eq!(picks_a, picks_b);
        assert!(picks_a.iter().all(|ua| config.user_agents.contains(ua)));
    }

    #[test]
    fn empty_pool_falls_back_to_fixed_identity() {
        let config = ScrapeConfig {
            user_agents: Vec::new(),
            ..ScrapeConfig::default()
        };
        let fetcher = HttpPageFetcher::new(&config).unwrap();
        assert_eq!(fetcher.pick_user_agent(), FALLBACK_USER_AGENT);
    }
}
