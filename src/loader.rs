// 📂 CSV Loader - flat files → typed rows
// Malformed rows are skipped and reported per line instead of aborting the load.

use crate::records::{CountryYearRow, ExportRow, ImportRow, ProductDetailRow, ProductImage};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

// ============================================================================
// ROW CHECKS
// ============================================================================

/// Semantic checks applied after a row deserializes
pub trait RowCheck {
    fn check(&self) -> std::result::Result<(), String>;
}

fn check_amount(field: &str, value: f64) -> std::result::Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{} is not a finite number", field));
    }
    if value < 0.0 {
        return Err(format!("{} must be non-negative, got {}", field, value));
    }
    Ok(())
}

fn check_name(field: &str, value: &str) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is empty", field));
    }
    Ok(())
}

impl RowCheck for ExportRow {
    fn check(&self) -> std::result::Result<(), String> {
        check_name("importer_name", &self.partner)?;
        check_name("Product Type", &self.product_type)?;
        check_amount("value", self.value)
    }
}

impl RowCheck for ImportRow {
    fn check(&self) -> std::result::Result<(), String> {
        check_name("exporter_name", &self.partner)?;
        check_name("Product Type", &self.product_type)?;
        check_amount("value", self.value)
    }
}

impl RowCheck for ProductDetailRow {
    fn check(&self) -> std::result::Result<(), String> {
        check_name("country", &self.country)?;
        check_name("Product Name", &self.product_name)?;
        check_amount("import_value", self.import_value)?;
        check_amount("import_quantity", self.import_quantity)?;
        check_amount("export_value", self.export_value)?;
        check_amount("export_quantity", self.export_quantity)
    }
}

impl RowCheck for CountryYearRow {
    fn check(&self) -> std::result::Result<(), String> {
        check_name("importer_name", &self.partner)?;
        check_amount("import_value", self.import_value)?;
        check_amount("export_value", self.export_value)
    }
}

impl RowCheck for ProductImage {
    fn check(&self) -> std::result::Result<(), String> {
        check_name("Group", &self.group)?;
        check_name("url", &self.url)
    }
}

// ============================================================================
// LOAD RESULT
// ============================================================================

/// A row that was rejected during load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub source: String,
    /// 1-based line in the file (header is line 1)
    pub line: u64,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.source, self.line, self.message)
    }
}

/// Rows that parsed, plus what was skipped
#[derive(Debug, Clone)]
pub struct LoadedTable<T> {
    pub rows: Vec<T>,
    pub skipped: Vec<RowError>,
    /// SHA-256 of the raw bytes, hex encoded
    pub digest: String,
}

impl<T> LoadedTable<T> {
    pub fn empty() -> Self {
        LoadedTable {
            rows: Vec::new(),
            skipped: Vec::new(),
            digest: String::new(),
        }
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Parse a delimited table with a header row from in-memory bytes
pub fn read_table<T>(bytes: &[u8], source: &str) -> Result<LoadedTable<T>>
where
    T: DeserializeOwned + RowCheck,
{
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = rdr
        .headers()
        .with_context(|| format!("Failed to read header of {}", source))?
        .clone();

    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    let mut record = csv::StringRecord::new();

    loop {
        match rdr.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                if record.len() != headers.len() {
                    skipped.push(RowError {
                        source: source.to_string(),
                        line,
                        message: format!("expected {} fields, got {}", headers.len(), record.len()),
                    });
                    continue;
                }
                let parsed = record
                    .deserialize::<T>(Some(&headers))
                    .map_err(|e| e.to_string())
                    .and_then(|row| row.check().map(|()| row));

                match parsed {
                    Ok(row) => rows.push(row),
                    Err(message) => skipped.push(RowError {
                        source: source.to_string(),
                        line,
                        message,
                    }),
                }
            }
            Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                skipped.push(RowError {
                    source: source.to_string(),
                    line,
                    message: e.to_string(),
                });
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", source));
            }
        }
    }

    for err in &skipped {
        warn!(source, line = err.line, reason = %err.message, "skipped malformed row");
    }

    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = format!("{:x}", hasher.finalize());

    debug!(source, rows = rows.len(), skipped = skipped.len(), "parsed table");

    Ok(LoadedTable {
        rows,
        skipped,
        digest,
    })
}

/// Load a required table; a missing file is an error
pub fn load_table<T>(path: &Path) -> Result<LoadedTable<T>>
where
    T: DeserializeOwned + RowCheck,
{
    let bytes = fs::read(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let table = read_table(&bytes, &source)?;
    info!(
        file = %source,
        rows = table.rows.len(),
        skipped = table.skipped.len(),
        "loaded table"
    );
    Ok(table)
}

/// Load an optional table; a missing file yields an empty table
pub fn load_optional_table<T>(path: &Path) -> Result<LoadedTable<T>>
where
    T: DeserializeOwned + RowCheck,
{
    if !path.exists() {
        warn!(file = ?path, "optional table not found, continuing without it");
        return Ok(LoadedTable::empty());
    }
    load_table(path)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_export_table() {
        let csv = "year,importer_name,Product Type,value,Continent\n\
                   2022,China,Machines,150,Asia\n\
                   2022,Canada,Vehicles,200.5,North America\n";

        let table: LoadedTable<ExportRow> = read_table(csv.as_bytes(), "exports.csv").unwrap();

        assert_eq!(table.rows.len(), 2);
        assert!(table.skipped.is_empty());
        assert_eq!(table.rows[0].partner, "China");
        assert_eq!(table.rows[1].value, 200.5);
        assert_eq!(table.rows[1].continent.as_deref(), Some("North America"));
        assert_eq!(table.digest.len(), 64);
    }

    #[test]
    fn test_malformed_rows_are_skipped_not_fatal() {
        let csv = "year,exporter_name,Product Type,value\n\
                   2022,China,Machines,500\n\
                   2022,Mexico,Vehicles,not-a-number\n\
                   2022,Japan,Machines,-5\n\
                   2021,Germany,Chemicals,42\n";

        let table: LoadedTable<ImportRow> = read_table(csv.as_bytes(), "imports.csv").unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.skipped_count(), 2);
        assert_eq!(table.skipped[0].line, 3);
        assert_eq!(table.skipped[1].line, 4);
        assert!(table.skipped[1].message.contains("non-negative"));
        assert_eq!(table.rows[1].partner, "Germany");
    }

    #[test]
    fn test_rows_with_wrong_width_are_skipped() {
        let csv = "year,exporter_name,Product Type,value\n\
                   2022,China,Machines,500,EXTRA\n\
                   2022,Mexico,Vehicles\n\
                   2021,Germany,Chemicals,42\n";

        let table: LoadedTable<ImportRow> = read_table(csv.as_bytes(), "imports.csv").unwrap();

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].partner, "Germany");
        assert_eq!(table.skipped_count(), 2);
        assert_eq!(table.skipped[0].line, 2);
        assert_eq!(table.skipped[0].message, "expected 4 fields, got 5");
        assert_eq!(table.skipped[1].line, 3);
    }

    #[test]
    fn test_invalid_utf8_row_is_skipped() {
        let mut csv = b"year,exporter_name,Product Type,value\n2022,China,Machines,500\n".to_vec();
        csv.extend_from_slice(b"2022,C\xff\xfete,Machines,7\n");
        csv.extend_from_slice(b"2021,Germany,Chemicals,42\n");

        let table: LoadedTable<ImportRow> = read_table(&csv, "imports.csv").unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.skipped_count(), 1);
        assert_eq!(table.skipped[0].line, 3);
        assert!(table.skipped[0].message.to_lowercase().contains("utf-8"));
    }

    #[test]
    fn test_missing_continent_column_is_optional() {
        let csv = "year,importer_name,Product Type,value\n2020,Chile,Copper,9\n";
        let table: LoadedTable<ExportRow> = read_table(csv.as_bytes(), "exports.csv").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].continent, None);
    }

    #[test]
    fn test_digest_is_stable() {
        let csv = "Group,url,Sampled Products\nToys,http://x/1.png,Dolls\n";
        let a: LoadedTable<ProductImage> = read_table(csv.as_bytes(), "a").unwrap();
        let b: LoadedTable<ProductImage> = read_table(csv.as_bytes(), "b").unwrap();
        assert_eq!(a.digest, b.digest);
    }

    #[test]
    fn test_load_table_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "importer_name,year,import_value,export_value").unwrap();
        writeln!(file, "China,2022,500,150").unwrap();

        let table: LoadedTable<CountryYearRow> = load_table(file.path()).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].import_value, 500.0);
    }

    #[test]
    fn test_missing_required_table_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<LoadedTable<ExportRow>> = load_table(&dir.path().join("nope.csv"));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_optional_table_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table: LoadedTable<ProductImage> =
            load_optional_table(&dir.path().join("image_link.csv")).unwrap();
        assert!(table.rows.is_empty());
        assert!(table.digest.is_empty());
    }
}
