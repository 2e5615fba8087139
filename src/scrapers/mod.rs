pub mod extract;
pub mod fetcher;
pub mod ingest;
pub mod normalize;
pub mod traits;
pub mod types;

pub use extract::ListingExtractor;
pub use fetcher::HttpPageFetcher;
pub use ingest::{IngestReport, IngestState, Ingestor};
pub use traits::{ExtractionStrategy, FetchedPage, PageFetcher};
pub use types::ScrapeConfig;
