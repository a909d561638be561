// ➕ Aggregation Stage - grouped sums and the export/import join
//
// aggregate() sums one direction's records per key; join() outer-joins the
// export and import sides with zero fill. Balance is never stored: it is
// derived from the two operands every time it is read.

use crate::records::{Direction, Measure, TradeRecord};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

// ============================================================================
// KEYS
// ============================================================================

/// Column a record can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Year,
    Partner,
    ProductType,
}

/// Grouping key of an aggregate row; columns not grouped on stay None
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AggregateKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
}

impl AggregateKey {
    pub fn of(record: &TradeRecord, keys: &[GroupKey]) -> Self {
        let mut key = AggregateKey::default();
        for k in keys {
            match k {
                GroupKey::Year => key.year = Some(record.year),
                GroupKey::Partner => key.partner = Some(record.partner.clone()),
                GroupKey::ProductType => key.product_type = Some(record.product_type.clone()),
            }
        }
        key
    }

    /// Human label: the most specific named column, else the year
    pub fn label(&self) -> String {
        if let Some(product) = &self.product_type {
            if self.partner.is_none() {
                return product.clone();
            }
        }
        match (&self.partner, &self.product_type, self.year) {
            (Some(p), Some(t), _) => format!("{} / {}", p, t),
            (Some(p), None, _) => p.clone(),
            (None, _, Some(y)) => y.to_string(),
            _ => String::new(),
        }
    }
}

// ============================================================================
// AGGREGATE ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub key: AggregateKey,
    pub export_value: f64,
    pub import_value: f64,
    /// First continent seen for the key (export table only carries it)
    pub continent: Option<String>,
}

impl AggregateRow {
    pub fn new(key: AggregateKey) -> Self {
        AggregateRow {
            key,
            export_value: 0.0,
            import_value: 0.0,
            continent: None,
        }
    }

    /// Export minus import; negative means a deficit
    pub fn balance(&self) -> f64 {
        self.export_value - self.import_value
    }

    pub fn value(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Export => self.export_value,
            Measure::Import => self.import_value,
            Measure::Balance => self.balance(),
        }
    }

    pub fn label(&self) -> String {
        self.key.label()
    }

    fn add(&mut self, direction: Direction, value: f64) {
        match direction {
            Direction::Export => self.export_value += value,
            Direction::Import => self.import_value += value,
        }
    }
}

#[derive(Serialize)]
struct AggregateRowView<'a> {
    #[serde(flatten)]
    key: &'a AggregateKey,
    export_value: f64,
    import_value: f64,
    balance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    continent: &'a Option<String>,
}

impl Serialize for AggregateRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AggregateRowView {
            key: &self.key,
            export_value: self.export_value,
            import_value: self.import_value,
            balance: self.balance(),
            continent: &self.continent,
        }
        .serialize(serializer)
    }
}

// ============================================================================
// FILTER
// ============================================================================

/// Sidebar selection; None means "any"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeFilter {
    pub year: Option<i32>,
    pub partner: Option<String>,
    pub product_type: Option<String>,
}

impl TradeFilter {
    pub fn year(year: i32) -> Self {
        TradeFilter {
            year: Some(year),
            ..Default::default()
        }
    }

    pub fn with_partner(mut self, partner: &str) -> Self {
        self.partner = Some(partner.to_string());
        self
    }

    pub fn with_product(mut self, product_type: &str) -> Self {
        self.product_type = Some(product_type.to_string());
        self
    }

    pub fn matches(&self, record: &TradeRecord) -> bool {
        if let Some(year) = self.year {
            if record.year != year {
                return false;
            }
        }
        if let Some(partner) = &self.partner {
            if &record.partner != partner {
                return false;
            }
        }
        if let Some(product) = &self.product_type {
            if &record.product_type != product {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&'a self, records: &'a [TradeRecord]) -> impl Iterator<Item = &'a TradeRecord> + 'a {
        records.iter().filter(move |r| self.matches(r))
    }
}

// ============================================================================
// AGGREGATE & JOIN
// ============================================================================

/// Sum `value` per distinct key over the records of one direction.
/// Rows come out in first-appearance order of their key.
pub fn aggregate<'a, I>(records: I, keys: &[GroupKey], direction: Direction) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a TradeRecord>,
{
    let mut index: HashMap<AggregateKey, usize> = HashMap::new();
    let mut rows: Vec<AggregateRow> = Vec::new();

    for record in records.into_iter().filter(|r| r.direction == direction) {
        let key = AggregateKey::of(record, keys);
        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                index.insert(key.clone(), rows.len());
                rows.push(AggregateRow::new(key));
                rows.len() - 1
            }
        };

        let row = &mut rows[slot];
        row.add(direction, record.value);
        if row.continent.is_none() {
            row.continent = record.continent.clone();
        }
    }

    rows
}

/// Outer join of the export and import aggregates on their key.
/// A key missing on one side still appears, with that side at 0.
pub fn join(export_agg: &[AggregateRow], import_agg: &[AggregateRow]) -> Vec<AggregateRow> {
    let mut index: HashMap<&AggregateKey, usize> = HashMap::new();
    let mut rows: Vec<AggregateRow> = Vec::with_capacity(export_agg.len().max(import_agg.len()));

    for exp in export_agg {
        index.insert(&exp.key, rows.len());
        rows.push(AggregateRow {
            key: exp.key.clone(),
            export_value: exp.export_value,
            import_value: 0.0,
            continent: exp.continent.clone(),
        });
    }

    for imp in import_agg {
        match index.get(&imp.key) {
            Some(&i) => {
                let row = &mut rows[i];
                row.import_value = imp.import_value;
                if row.continent.is_none() {
                    row.continent = imp.continent.clone();
                }
            }
            None => rows.push(AggregateRow {
                key: imp.key.clone(),
                export_value: 0.0,
                import_value: imp.import_value,
                continent: imp.continent.clone(),
            }),
        }
    }

    rows
}

/// Aggregate both directions and join them in one step
pub fn trade_table<'a, E, I>(exports: E, imports: I, keys: &[GroupKey]) -> Vec<AggregateRow>
where
    E: IntoIterator<Item = &'a TradeRecord>,
    I: IntoIterator<Item = &'a TradeRecord>,
{
    let export_agg = aggregate(exports, keys, Direction::Export);
    let import_agg = aggregate(imports, keys, Direction::Import);
    join(&export_agg, &import_agg)
}

/// Column total of one measure
pub fn total(rows: &[AggregateRow], measure: Measure) -> f64 {
    rows.iter().map(|r| r.value(measure)).sum()
}

// ============================================================================
// TESTS
// ============================================================================
