// 🗄️ Dataset - immutable snapshot of every input table
// Loaded once at startup; every dashboard query reads it, nothing writes it.

use crate::config::DashboardConfig;
use crate::loader::{load_optional_table, load_table, LoadedTable, RowError};
use crate::records::{CountryYearRow, ExportRow, ImportRow, ProductDetailRow, ProductImage, TradeRecord};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Dataset {
    pub exports: Vec<TradeRecord>,
    pub imports: Vec<TradeRecord>,
    pub country_years: Vec<CountryYearRow>,
    pub product_details: Vec<ProductDetailRow>,
    pub images: Vec<ProductImage>,
    /// Rows rejected while loading, across all tables
    pub skipped: Vec<RowError>,
    /// SHA-256 over the per-table digests; same files → same fingerprint
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
}

/// What /health and the CLI report about a snapshot
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub export_rows: usize,
    pub import_rows: usize,
    pub country_year_rows: usize,
    pub product_detail_rows: usize,
    pub image_rows: usize,
    pub skipped_rows: usize,
    pub years: Vec<i32>,
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
}

fn fingerprint_of(digests: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for digest in digests {
        hasher.update(digest.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

impl Dataset {
    /// In-memory snapshot from already-normalized records
    pub fn from_records(exports: Vec<TradeRecord>, imports: Vec<TradeRecord>) -> Self {
        Dataset {
            exports,
            imports,
            country_years: Vec::new(),
            product_details: Vec::new(),
            images: Vec::new(),
            skipped: Vec::new(),
            fingerprint: fingerprint_of(&[]),
            loaded_at: Utc::now(),
        }
    }

    /// Builder pattern: attach the country-year summary table
    pub fn with_country_years(mut self, rows: Vec<CountryYearRow>) -> Self {
        self.country_years = rows;
        self
    }

    /// Builder pattern: attach per-country product detail rows
    pub fn with_product_details(mut self, rows: Vec<ProductDetailRow>) -> Self {
        self.product_details = rows;
        self
    }

    /// Builder pattern: attach the image link table
    pub fn with_images(mut self, rows: Vec<ProductImage>) -> Self {
        self.images = rows;
        self
    }

    /// Read every configured table from disk
    pub fn load(config: &DashboardConfig) -> Result<Self> {
        let exports: LoadedTable<ExportRow> = load_table(&config.path_of(&config.exports_file))?;
        let imports: LoadedTable<ImportRow> = load_table(&config.path_of(&config.imports_file))?;
        let country_years: LoadedTable<CountryYearRow> =
            load_optional_table(&config.path_of(&config.country_years_file))?;
        let images: LoadedTable<ProductImage> = load_optional_table(&config.path_of(&config.images_file))?;

        let mut digests: Vec<String> = vec![
            exports.digest.clone(),
            imports.digest.clone(),
            country_years.digest.clone(),
            images.digest.clone(),
        ];

        let mut skipped = Vec::new();
        skipped.extend(exports.skipped);
        skipped.extend(imports.skipped);
        skipped.extend(country_years.skipped);
        skipped.extend(images.skipped);

        let mut product_details = Vec::new();
        for source in &config.product_details {
            let table: LoadedTable<ProductDetailRow> = load_optional_table(&config.path_of(&source.file))?;
            digests.push(table.digest);
            skipped.extend(table.skipped);
            product_details.extend(table.rows.into_iter().map(|mut row| {
                if row.year.is_none() {
                    row.year = source.year;
                }
                row
            }));
        }

        let digest_refs: Vec<&str> = digests.iter().map(String::as_str).collect();

        let dataset = Dataset {
            exports: exports.rows.into_iter().map(TradeRecord::from).collect(),
            imports: imports.rows.into_iter().map(TradeRecord::from).collect(),
            country_years: country_years.rows,
            product_details,
            images: images.rows,
            skipped,
            fingerprint: fingerprint_of(&digest_refs),
            loaded_at: Utc::now(),
        };

        info!(
            exports = dataset.exports.len(),
            imports = dataset.imports.len(),
            skipped = dataset.skipped.len(),
            fingerprint = %&dataset.fingerprint[..12],
            "dataset loaded"
        );

        Ok(dataset)
    }

    /// Years present in either direction, ascending
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.exports.iter().chain(&self.imports).map(|r| r.year).collect();
        years.into_iter().collect()
    }

    /// Product types present in either direction, sorted
    pub fn product_types(&self) -> Vec<String> {
        let types: BTreeSet<&str> = self
            .exports
            .iter()
            .chain(&self.imports)
            .map(|r| r.product_type.as_str())
            .collect();
        types.into_iter().map(String::from).collect()
    }

    /// Partners present in either direction, sorted
    pub fn partners(&self) -> Vec<String> {
        let partners: BTreeSet<&str> = self
            .exports
            .iter()
            .chain(&self.imports)
            .map(|r| r.partner.as_str())
            .collect();
        partners.into_iter().map(String::from).collect()
    }

    /// Partners of the country-year table, in table order
    pub fn country_partners(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut partners = Vec::new();
        for row in &self.country_years {
            if seen.insert(row.partner.as_str()) {
                partners.push(row.partner.clone());
            }
        }
        partners
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            export_rows: self.exports.len(),
            import_rows: self.imports.len(),
            country_year_rows: self.country_years.len(),
            product_detail_rows: self.product_details.len(),
            image_rows: self.images.len(),
            skipped_rows: self.skipped.len(),
            years: self.years(),
            fingerprint: self.fingerprint.clone(),
            loaded_at: self.loaded_at,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetailSource;
    use crate::records::Direction;
    use std::fs;

    fn write_fixture(dir: &std::path::Path) {
        fs::write(
            dir.join("exports_grouped.csv"),
            "year,importer_name,Product Type,value,Continent\n\
             2022,China,Machines,150,Asia\n\
             2021,Canada,Vehicles,80,North America\n\
             2022,Mexico,Vehicles,oops,North America\n",
        )
        .unwrap();
        fs::write(
            dir.join("imports_grouped.csv"),
            "year,exporter_name,Product Type,value\n\
             2022,China,Machines,500\n\
             2022,Vietnam,Apparel,40\n",
        )
        .unwrap();
        fs::write(
            dir.join("tab3data1.csv"),
            "importer_name,year,import_value,export_value\n\
             China,2021,400,120\n\
             China,2022,500,150\n\
             Canada,2022,90,80\n",
        )
        .unwrap();
        fs::write(
            dir.join("details_2022.csv"),
            "country,Product Name,import_value,import_quantity,export_value,export_quantity\n\
             China,Toys,300,30,10,1\n",
        )
        .unwrap();
    }

    fn fixture_config(dir: &std::path::Path) -> DashboardConfig {
        DashboardConfig {
            data_dir: dir.to_path_buf(),
            product_details: vec![DetailSource {
                file: "details_2022.csv".to_string(),
                year: Some(2022),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_load_from_disk_with_skips() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());

        let dataset = Dataset::load(&fixture_config(dir.path())).unwrap();

        assert_eq!(dataset.exports.len(), 2);
        assert_eq!(dataset.imports.len(), 2);
        assert_eq!(dataset.skipped.len(), 1);
        assert_eq!(dataset.skipped[0].line, 4);
        assert!(dataset.exports.iter().all(|r| r.direction == Direction::Export));
        assert!(dataset.imports.iter().all(|r| r.direction == Direction::Import));
        assert_eq!(dataset.product_details[0].year, Some(2022));
        // image table is optional and absent
        assert!(dataset.images.is_empty());
    }

    #[test]
    fn test_reload_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let config = fixture_config(dir.path());

        let first = Dataset::load(&config).unwrap();
        let second = Dataset::load(&config).unwrap();

        assert_eq!(first.fingerprint, second.fingerprint);
        assert_eq!(first.exports, second.exports);

        fs::write(
            dir.path().join("imports_grouped.csv"),
            "year,exporter_name,Product Type,value\n2022,China,Machines,501\n",
        )
        .unwrap();
        let third = Dataset::load(&config).unwrap();
        assert_ne!(first.fingerprint, third.fingerprint);
    }

    #[test]
    fn test_missing_exports_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Dataset::load(&fixture_config(dir.path())).is_err());
    }

    #[test]
    fn test_filter_options() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let dataset = Dataset::load(&fixture_config(dir.path())).unwrap();

        assert_eq!(dataset.years(), vec![2021, 2022]);
        assert_eq!(dataset.product_types(), vec!["Apparel", "Machines", "Vehicles"]);
        assert_eq!(dataset.partners(), vec!["Canada", "China", "Vietnam"]);
        assert_eq!(dataset.country_partners(), vec!["China", "Canada"]);

        let summary = dataset.summary();
        assert_eq!(summary.skipped_rows, 1);
        assert_eq!(summary.country_year_rows, 3);
        assert_eq!(summary.fingerprint.len(), 64);
    }
}
