// 📦 Trade Records - typed rows for every input table
// Raw CSV rows deserialize into the *Row structs, then normalize into
// TradeRecord (one per shipment-category-year tuple).

use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// DIRECTION & MEASURE
// ============================================================================

/// Direction of a flow, relative to the US
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Export,
    Import,
}

impl Direction {
    pub fn name(&self) -> &str {
        match self {
            Direction::Export => "Export",
            Direction::Import => "Import",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "export" | "exports" => Ok(Direction::Export),
            "import" | "imports" => Ok(Direction::Import),
            _ => Err(DashboardError::UnknownDirection(s.to_string())),
        }
    }
}

/// Which column of an aggregate a view reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measure {
    Export,
    Import,
    Balance,
}

impl Measure {
    pub const ALL: [Measure; 3] = [Measure::Export, Measure::Import, Measure::Balance];

    /// Label used by the selection widgets
    pub fn title(&self) -> &str {
        match self {
            Measure::Export => "Export",
            Measure::Import => "Import",
            Measure::Balance => "Trade Balance",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Measure::Export => Measure::Import,
            Measure::Import => Measure::Balance,
            Measure::Balance => Measure::Export,
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Measure {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "export" | "exports" => Ok(Measure::Export),
            "import" | "imports" => Ok(Measure::Import),
            "balance" | "trade balance" => Ok(Measure::Balance),
            _ => Err(DashboardError::UnknownMeasure(s.to_string())),
        }
    }
}

// ============================================================================
// NORMALIZED RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub year: i32,
    pub partner: String,
    pub product_type: String,
    pub value: f64,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub continent: Option<String>,
    pub direction: Direction,
}

impl TradeRecord {
    pub fn new(year: i32, partner: &str, product_type: &str, value: f64, direction: Direction) -> Self {
        TradeRecord {
            year,
            partner: partner.to_string(),
            product_type: product_type.to_string(),
            value,
            quantity: None,
            continent: None,
            direction,
        }
    }

    /// Builder pattern: attach continent
    pub fn with_continent(mut self, continent: &str) -> Self {
        self.continent = Some(continent.to_string());
        self
    }
}

// ============================================================================
// RAW CSV ROWS
// ============================================================================

/// Row of the export table (partner is the importing country)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportRow {
    pub year: i32,

    #[serde(rename = "importer_name")]
    pub partner: String,

    #[serde(rename = "Product Type")]
    pub product_type: String,

    pub value: f64,

    #[serde(rename = "Continent", default)]
    pub continent: Option<String>,
}

/// Row of the import table (partner is the exporting country)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportRow {
    pub year: i32,

    #[serde(rename = "exporter_name")]
    pub partner: String,

    #[serde(rename = "Product Type")]
    pub product_type: String,

    pub value: f64,
}

impl From<ExportRow> for TradeRecord {
    fn from(row: ExportRow) -> Self {
        TradeRecord {
            year: row.year,
            partner: row.partner,
            product_type: row.product_type,
            value: row.value,
            quantity: None,
            continent: row.continent.filter(|c| !c.trim().is_empty()),
            direction: Direction::Export,
        }
    }
}

impl From<ImportRow> for TradeRecord {
    fn from(row: ImportRow) -> Self {
        TradeRecord {
            year: row.year,
            partner: row.partner,
            product_type: row.product_type,
            value: row.value,
            quantity: None,
            continent: None,
            direction: Direction::Import,
        }
    }
}

/// Per-country product detail row (both directions on one line)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProductDetailRow {
    pub country: String,

    #[serde(rename = "Product Name")]
    pub product_name: String,

    pub import_value: f64,
    pub import_quantity: f64,
    pub export_value: f64,
    pub export_quantity: f64,

    /// Filled from the source file when the table itself has no year column
    #[serde(default)]
    pub year: Option<i32>,
}

impl ProductDetailRow {
    pub fn value(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Export => self.export_value,
            Direction::Import => self.import_value,
        }
    }

    pub fn quantity(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Export => self.export_quantity,
            Direction::Import => self.import_quantity,
        }
    }

    /// Import minus export, the way the country page labels its deficit
    pub fn trade_deficit(&self) -> f64 {
        self.import_value - self.export_value
    }
}

/// Yearly bilateral totals for one partner
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CountryYearRow {
    #[serde(rename = "importer_name")]
    pub partner: String,
    pub year: i32,
    pub import_value: f64,
    pub export_value: f64,
}

/// Example product image for a product group
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProductImage {
    #[serde(rename = "Group")]
    pub group: String,

    pub url: String,

    #[serde(rename = "Sampled Products")]
    pub caption: String,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_from_str() {
        assert_eq!("Export".parse::<Measure>().unwrap(), Measure::Export);
        assert_eq!("imports".parse::<Measure>().unwrap(), Measure::Import);
        assert_eq!("Trade Balance".parse::<Measure>().unwrap(), Measure::Balance);
        assert_eq!("trade_balance".parse::<Measure>().unwrap(), Measure::Balance);
        assert!("volume".parse::<Measure>().is_err());
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!(" Import ".parse::<Direction>().unwrap(), Direction::Import);
        assert_eq!(
            "sideways".parse::<Direction>(),
            Err(DashboardError::UnknownDirection("sideways".to_string()))
        );
    }

    #[test]
    fn test_measure_cycle() {
        let mut m = Measure::Export;
        for _ in 0..3 {
            m = m.next();
        }
        assert_eq!(m, Measure::Export);
    }

    #[test]
    fn test_export_row_blank_continent_dropped() {
        let row = ExportRow {
            year: 2022,
            partner: "Canada".to_string(),
            product_type: "Machines".to_string(),
            value: 10.0,
            continent: Some("  ".to_string()),
        };
        let record: TradeRecord = row.into();
        assert_eq!(record.direction, Direction::Export);
        assert_eq!(record.continent, None);
    }

    #[test]
    fn test_product_detail_deficit() {
        let row = ProductDetailRow {
            country: "China".to_string(),
            product_name: "Toys".to_string(),
            import_value: 500.0,
            import_quantity: 20.0,
            export_value: 150.0,
            export_quantity: 5.0,
            year: None,
        };
        assert_eq!(row.trade_deficit(), 350.0);
        assert_eq!(row.value(Direction::Export), 150.0);
        assert_eq!(row.quantity(Direction::Import), 20.0);
    }
}
