use std::path::PathBuf;
use thiserror::Error;

/// Transport-level failure for a single page request
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for page {page} timed out")]
    Timeout { page: u32 },
    #[error("request for page {page} failed: {source}")]
    Transport {
        page: u32,
        #[source]
        source: reqwest::Error,
    },
}

/// Failure to turn one listing block into a record
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no extraction strategy recognised the listing")]
    Unrecognized,
    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },
}

/// Failure reading or writing the persisted dataset
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("unexpected header in {path}: found {found:?}")]
    Schema { path: PathBuf, found: Vec<String> },
    #[error("failed to write workbook {path}: {message}")]
    Xlsx { path: PathBuf, message: String },
}
