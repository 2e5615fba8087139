//! The persisted dataset: a CSV file that accumulates listings across runs.
//!
//! One writer at a time. Nothing here locks the file; running two ingestions
//! against the same store is unsupported.

pub mod merge;
pub mod xlsx;

pub use merge::merge;

use crate::error::StoreError;
use crate::models::{ListingRecord, COLUMNS};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_STORE_PATH: &str = "data/raw/DATA RUMAH.csv";

/// What a merge step did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Nothing was admitted; the store was left as it was
    Unchanged,
    Saved { rows: usize, previous_rows: usize },
}

pub struct DatasetStore {
    path: PathBuf,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored dataset. `Ok(None)` when no store exists yet.
    ///
    /// A header that does not match the expected columns, or any row that
    /// fails to parse, is an error: a store we cannot validate is never
    /// overwritten.
    pub fn load(&self) -> Result<Option<Vec<ListingRecord>>, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No existing dataset");
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(|source| self.csv_error(source))?;

        let headers = reader.headers().map_err(|source| self.csv_error(source))?;
        if headers.iter().ne(COLUMNS.iter().copied()) {
            return Err(StoreError::Schema {
                path: self.path.clone(),
                found: headers.iter().map(str::to_string).collect(),
            });
        }

        let records = reader
            .deserialize::<ListingRecord>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| self.csv_error(source))?;

        info!(path = %self.path.display(), rows = records.len(), "Loaded existing dataset");
        Ok(Some(records))
    }

    /// Write `records` as the whole dataset, numbering rows `1..=N`.
    /// The file is written beside the store and renamed into place.
    pub fn save(&self, records: &[ListingRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(parent, source))?;
        }

        let tmp_path = self.tmp_path();
        let written = self
            .write_rows(&tmp_path, records)
            .and_then(|()| {
                fs::rename(&tmp_path, &self.path).map_err(|source| self.io_error(&self.path, source))
            });
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                debug!(path = %tmp_path.display(), error = %cleanup, "No temp file to remove");
            }
            return Err(e);
        }

        info!(path = %self.path.display(), rows = records.len(), "Saved dataset");
        Ok(())
    }

    fn write_rows(&self, tmp_path: &Path, records: &[ListingRecord]) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(tmp_path).map_err(|source| self.csv_error(source))?;
        // Written explicitly so an empty dataset still carries its header
        writer.write_record(COLUMNS).map_err(|source| self.csv_error(source))?;
        for (idx, record) in records.iter().enumerate() {
            let row = ListingRecord {
                sequence: idx as u32 + 1,
                ..record.clone()
            };
            writer
                .write_record(row_fields(&row))
                .map_err(|source| self.csv_error(source))?;
        }
        writer.flush().map_err(|source| self.io_error(tmp_path, source))
    }

    /// Load, merge `incoming`, save. An empty batch leaves the store untouched.
    pub fn merge_and_save(&self, incoming: Vec<ListingRecord>) -> Result<MergeOutcome, StoreError> {
        if incoming.is_empty() {
            info!(path = %self.path.display(), "No admitted records, store left unchanged");
            return Ok(MergeOutcome::Unchanged);
        }

        let existing = self.load()?;
        let previous_rows = existing.as_ref().map_or(0, Vec::len);
        let merged = merge(existing, incoming);
        self.save(&merged)?;

        Ok(MergeOutcome::Saved {
            rows: merged.len(),
            previous_rows,
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn csv_error(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: self.path.clone(),
            source,
        }
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn row_fields(record: &ListingRecord) -> [String; 8] {
    [
        record.sequence.to_string(),
        record.name.clone(),
        record.price.to_string(),
        record.building_area.to_string(),
        record.land_area.to_string(),
        record.bedrooms.to_string(),
        record.bathrooms.to_string(),
        record.garages.to_string(),
    ]
}
