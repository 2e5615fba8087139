use serde::{Deserialize, Serialize};

/// Column order of the persisted dataset, header row included.
pub const COLUMNS: [&str; 8] = ["NO", "NAMA RUMAH", "HARGA", "LB", "LT", "KT", "KM", "GRS"];

/// Core listing data model, one row of the persisted dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// 1-based row position, re-derived on every save
    #[serde(rename = "NO")]
    pub sequence: u32,
    #[serde(rename = "NAMA RUMAH")]
    pub name: String,
    /// Whole rupiah
    #[serde(rename = "HARGA")]
    pub price: u64,
    /// Building area in m²
    #[serde(rename = "LB")]
    pub building_area: u32,
    /// Land area in m²
    #[serde(rename = "LT")]
    pub land_area: u32,
    #[serde(rename = "KT")]
    pub bedrooms: u32,
    #[serde(rename = "KM")]
    pub bathrooms: u32,
    #[serde(rename = "GRS")]
    pub garages: u32,
}

/// Identity used to detect the same listing across runs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingKey {
    pub name: String,
    pub building_area: u32,
    pub land_area: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
}

impl ListingRecord {
    pub fn key(&self) -> ListingKey {
        ListingKey {
            name: self.name.clone(),
            building_area: self.building_area,
            land_area: self.land_area,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
        }
    }

    /// Admission filter: only price-positive listings are ever stored
    pub fn is_admissible(&self) -> bool {
        self.price > 0
    }

    /// Row handed to the prediction service
    pub fn features(&self) -> PredictionFeatures {
        PredictionFeatures {
            building_area: self.building_area,
            land_area: self.land_area,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            garages: self.garages,
        }
    }
}

/// Fallback values used when a field cannot be extracted from a listing.
///
/// These mirror what the dataset has always been filled with; they are
/// policy, not statistics, so every one of them can be overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefaults {
    pub building_area: u32,
    pub land_area: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub garages: u32,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            building_area: 100,
            land_area: 100,
            bedrooms: 2,
            bathrooms: 1,
            garages: 1,
        }
    }
}

/// Feature row consumed by the price model: exactly LB, LT, KT, KM, GRS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionFeatures {
    #[serde(rename = "LB")]
    pub building_area: u32,
    #[serde(rename = "LT")]
    pub land_area: u32,
    #[serde(rename = "KT")]
    pub bedrooms: u32,
    #[serde(rename = "KM")]
    pub bathrooms: u32,
    #[serde(rename = "GRS")]
    pub garages: u32,
}
