use anyhow::Context;
use clap::Parser;
use rumah_scout::models::FieldDefaults;
use rumah_scout::run::ingest_and_merge;
use rumah_scout::scrapers::types::DEFAULT_BASE_URL;
use rumah_scout::scrapers::{HttpPageFetcher, ScrapeConfig};
use rumah_scout::store::xlsx::export_xlsx;
use rumah_scout::store::{DatasetStore, DEFAULT_STORE_PATH};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rumah-scout")]
#[command(about = "Scrape house listings and merge them into the price dataset")]
struct Cli {
    /// Number of listing pages to fetch
    #[arg(long, env = "RUMAH_PAGES", default_value_t = 2)]
    pages: u32,

    /// First page index
    #[arg(long, default_value_t = 1)]
    start_page: u32,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Dataset CSV to merge into
    #[arg(long, default_value = DEFAULT_STORE_PATH)]
    store: PathBuf,

    /// Also export the merged dataset as an Excel workbook
    #[arg(long)]
    xlsx: Option<PathBuf>,

    /// Write a JSON summary of the run
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Seed for user-agent and delay selection
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 2_000)]
    min_delay_ms: u64,

    #[arg(long, default_value_t = 5_000)]
    max_delay_ms: u64,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[arg(long, default_value_t = FieldDefaults::default().building_area)]
    default_building_area: u32,

    #[arg(long, default_value_t = FieldDefaults::default().land_area)]
    default_land_area: u32,

    #[arg(long, default_value_t = FieldDefaults::default().bedrooms)]
    default_bedrooms: u32,

    #[arg(long, default_value_t = FieldDefaults::default().bathrooms)]
    default_bathrooms: u32,

    #[arg(long, default_value_t = FieldDefaults::default().garages)]
    default_garages: u32,
}

impl Cli {
    fn scrape_config(&self) -> ScrapeConfig {
        ScrapeConfig {
            base_url: self.base_url.clone(),
            start_page: self.start_page,
            pages: self.pages,
            min_delay_ms: self.min_delay_ms,
            max_delay_ms: self.max_delay_ms,
            timeout_secs: self.timeout_secs,
            seed: self.seed,
            defaults: FieldDefaults {
                building_area: self.default_building_area,
                land_area: self.default_land_area,
                bedrooms: self.default_bedrooms,
                bathrooms: self.default_bathrooms,
                garages: self.default_garages,
            },
            ..ScrapeConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.scrape_config();
    let store = DatasetStore::new(&cli.store);

    info!(pages = config.pages, store = %store.path().display(), "🏠 Rumah Scout");

    let fetcher = HttpPageFetcher::new(&config)?;
    let summary = ingest_and_merge(fetcher, &config, &store).await?;

    if let Some(path) = &cli.xlsx {
        match store.load()? {
            Some(records) => export_xlsx(&records, path)?,
            None => info!("No dataset yet, skipping workbook export"),
        }
    }

    if let Some(path) = &cli.summary {
        summary
            .write_json(path)
            .context("Failed to write run summary")?;
    }

    println!(
        "{:?}: {} pages, {} admitted, store rows: {}",
        summary.final_state,
        summary.pages_attempted,
        summary.admitted,
        summary
            .stored_rows
            .map_or_else(|| "unchanged".to_string(), |rows| rows.to_string()),
    );

    Ok(())
}
