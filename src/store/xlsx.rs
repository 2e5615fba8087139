use crate::error::StoreError;
use crate::models::{ListingRecord, COLUMNS};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::Path;
use tracing::info;

/// Write the dataset as a single-sheet workbook with the store's columns
pub fn export_xlsx(records: &[ListingRecord], path: &Path) -> Result<(), StoreError> {
    let to_store_error = |e: XlsxError| StoreError::Xlsx {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in COLUMNS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(to_store_error)?;
    }

    for (i, record) in records.iter().enumerate() {
        let r = (i + 1) as u32;

        worksheet
            .write_number(r, 0, f64::from(record.sequence))
            .map_err(to_store_error)?;
        worksheet
            .write_string(r, 1, &record.name)
            .map_err(to_store_error)?;
        worksheet
            .write_number(r, 2, record.price as f64)
            .map_err(to_store_error)?;

        let counts = [
            record.building_area,
            record.land_area,
            record.bedrooms,
            record.bathrooms,
            record.garages,
        ];
        for (offset, value) in counts.into_iter().enumerate() {
            worksheet
                .write_number(r, 3 + offset as u16, f64::from(value))
                .map_err(to_store_error)?;
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    workbook.save(path).map_err(to_store_error)?;
    info!(path = %path.display(), rows = records.len(), "Exported workbook");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_creates_workbook() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("DATA RUMAH.xlsx");
        let records = vec![ListingRecord {
            sequence: 1,
            name: "Rumah A".to_string(),
            price: 7_500_000_000,
            building_area: 150,
            land_area: 200,
            bedrooms: 4,
            bathrooms: 3,
            garages: 1,
        }];

        export_xlsx(&records, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }
}
