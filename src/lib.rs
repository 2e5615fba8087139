//! Listing ingestion for the house-price dataset: fetch listing pages,
//! extract and normalise listings, merge them into the persisted CSV.

pub mod error;
pub mod models;
pub mod run;
pub mod scrapers;
pub mod store;
