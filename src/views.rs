// 📊 Dashboard Views - one pure query per page
//
// Each view takes the immutable Dataset plus the sidebar selection and
// returns every table its page renders. Nothing here is cached; calling a
// view twice with the same inputs yields the same output.

use crate::aggregate::{aggregate, join, total, AggregateKey, AggregateRow, GroupKey, TradeFilter};
use crate::binning::{bin, BinnedBatch, OVERVIEW_SCHEMES, PRODUCT_SCHEMES};
use crate::dataset::Dataset;
use crate::format::{scale, Unit};
use crate::ranking::{rank, RankPolicy, RankedRow};
use crate::records::{CountryYearRow, Direction, Measure, ProductImage};
use crate::text::wrap_text;
use serde::Serialize;
use std::collections::HashSet;

/// Example images shown next to the product page
pub const MAX_EXAMPLE_IMAGES: usize = 4;

// ============================================================================
// SHARED PIECES
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SummaryBar {
    pub category: &'static str,
    /// Scaled value; imports are drawn negative
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeSummary {
    pub unit: Unit,
    pub bars: Vec<SummaryBar>,
}

impl TradeSummary {
    fn from_totals(export_total: f64, import_total: f64, unit: Unit) -> Self {
        TradeSummary {
            unit,
            bars: vec![
                SummaryBar {
                    category: "Export",
                    value: scale(export_total, unit),
                },
                SummaryBar {
                    category: "Import",
                    value: -scale(import_total, unit),
                },
                SummaryBar {
                    category: "Trade Balance",
                    value: scale(export_total - import_total, unit),
                },
            ],
        }
    }
}

/// Treemap tile
#[derive(Debug, Clone, Serialize)]
pub struct ProductTile {
    pub label: String,
    pub wrapped_label: String,
    /// Display value in billions
    pub value: f64,
    /// Fraction of all tiles
    pub share: f64,
}

/// Rows that belong to the measured side: flows only show keys recorded in
/// that direction, balance shows the full outer join.
fn measured_rows(export_agg: &[AggregateRow], import_agg: &[AggregateRow], measure: Measure) -> Vec<AggregateRow> {
    let joined = join(export_agg, import_agg);
    let side: Option<HashSet<&AggregateKey>> = match measure {
        Measure::Export => Some(export_agg.iter().map(|r| &r.key).collect()),
        Measure::Import => Some(import_agg.iter().map(|r| &r.key).collect()),
        Measure::Balance => None,
    };
    match side {
        Some(keys) => joined.into_iter().filter(|r| keys.contains(&r.key)).collect(),
        None => joined,
    }
}

fn product_tiles(rows: &[AggregateRow], measure: Measure, wrap_width: usize) -> Vec<ProductTile> {
    let ranked = rank(rows, measure, RankPolicy::for_measure(measure, usize::MAX).positive_only());
    let sum: f64 = ranked.iter().map(|r| r.display_value).sum();

    ranked
        .into_iter()
        .map(|r| ProductTile {
            wrapped_label: wrap_text(&r.label, wrap_width),
            value: scale(r.display_value, Unit::Billions),
            share: if sum > 0.0 { r.display_value / sum } else { 0.0 },
            label: r.label,
        })
        .collect()
}

fn partner_title(measure: Measure, top_n: usize, product: Option<&str>) -> String {
    match (measure, product) {
        (Measure::Balance, None) => "Countries With the Biggest Trade Deficit with US".to_string(),
        (Measure::Balance, Some(p)) => format!("Biggest Trade Deficits for {}", p),
        (m, None) => format!("Top {} {} Partners", top_n, m),
        (m, Some(p)) => format!("Top {} {} Partners for {}", top_n, m, p),
    }
}

fn products_title(measure: Measure) -> String {
    match measure {
        Measure::Export => "Top Exported Products".to_string(),
        Measure::Import => "Top Imported Products".to_string(),
        Measure::Balance => "Products With the Biggest Trade Deficit".to_string(),
    }
}

// ============================================================================
// TRADE OVERVIEW
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverviewQuery {
    pub year: i32,
    pub measure: Measure,
    pub top_n: usize,
    pub wrap_width: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeOverview {
    pub year: i32,
    pub measure: Measure,
    /// (year, partner) rows on the measured side
    pub partners: Vec<AggregateRow>,
    pub choropleth: BinnedBatch,
    pub top_partners_title: String,
    pub top_partners: Vec<RankedRow>,
    pub summary: TradeSummary,
    pub products_title: String,
    pub products: Vec<ProductTile>,
}

pub fn overview(dataset: &Dataset, query: &OverviewQuery) -> TradeOverview {
    let filter = TradeFilter::year(query.year);
    let partner_keys = [GroupKey::Year, GroupKey::Partner];

    let export_agg = aggregate(filter.apply(&dataset.exports), &partner_keys, Direction::Export);
    let import_agg = aggregate(filter.apply(&dataset.imports), &partner_keys, Direction::Import);
    let partners = measured_rows(&export_agg, &import_agg, query.measure);

    let product_exports = aggregate(filter.apply(&dataset.exports), &[GroupKey::ProductType], Direction::Export);
    let product_imports = aggregate(filter.apply(&dataset.imports), &[GroupKey::ProductType], Direction::Import);
    let products = measured_rows(&product_exports, &product_imports, query.measure);

    TradeOverview {
        year: query.year,
        measure: query.measure,
        choropleth: bin(&partners, query.measure, &OVERVIEW_SCHEMES),
        top_partners_title: partner_title(query.measure, query.top_n, None),
        top_partners: rank(&partners, query.measure, RankPolicy::for_measure(query.measure, query.top_n)),
        summary: TradeSummary::from_totals(
            total(&export_agg, Measure::Export),
            total(&import_agg, Measure::Import),
            Unit::Trillions,
        ),
        products_title: products_title(query.measure),
        products: product_tiles(&products, query.measure, query.wrap_width),
        partners,
    }
}

// ============================================================================
// PRODUCT FOCUS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    pub year: i32,
    pub measure: Measure,
    pub product: String,
    pub top_n: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductFocus {
    pub year: i32,
    pub measure: Measure,
    pub product: String,
    pub partners: Vec<AggregateRow>,
    pub choropleth: BinnedBatch,
    pub top_partners_title: String,
    pub top_partners: Vec<RankedRow>,
    pub summary: TradeSummary,
    /// Export/import per year for the product, ascending by year
    pub yearly: Vec<AggregateRow>,
    /// Exports minus imports summed over the years is negative
    pub deficit: bool,
    pub images: Vec<ProductImage>,
}

pub fn product_focus(dataset: &Dataset, query: &ProductQuery) -> ProductFocus {
    let filter = TradeFilter::year(query.year).with_product(&query.product);
    let partner_keys = [GroupKey::Year, GroupKey::Partner];

    let export_agg = aggregate(filter.apply(&dataset.exports), &partner_keys, Direction::Export);
    let import_agg = aggregate(filter.apply(&dataset.imports), &partner_keys, Direction::Import);
    let partners = measured_rows(&export_agg, &import_agg, query.measure);

    let all_years = TradeFilter {
        product_type: Some(query.product.clone()),
        ..Default::default()
    };
    let mut yearly = join(
        &aggregate(all_years.apply(&dataset.exports), &[GroupKey::Year], Direction::Export),
        &aggregate(all_years.apply(&dataset.imports), &[GroupKey::Year], Direction::Import),
    );
    yearly.sort_by_key(|r| r.key.year);
    let deficit = total(&yearly, Measure::Balance) < 0.0;

    let images = dataset
        .images
        .iter()
        .filter(|img| img.group == query.product)
        .take(MAX_EXAMPLE_IMAGES)
        .cloned()
        .collect();

    ProductFocus {
        year: query.year,
        measure: query.measure,
        product: query.product.clone(),
        choropleth: bin(&partners, query.measure, &PRODUCT_SCHEMES),
        top_partners_title: partner_title(query.measure, query.top_n, Some(&query.product)),
        top_partners: rank(&partners, query.measure, RankPolicy::for_measure(query.measure, query.top_n)),
        summary: TradeSummary::from_totals(
            total(&export_agg, Measure::Export),
            total(&import_agg, Measure::Import),
            Unit::Billions,
        ),
        partners,
        yearly,
        deficit,
        images,
    }
}

// ============================================================================
// COUNTRY FOCUS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ProductBreakdown {
    pub product_name: String,
    /// Tile size
    pub quantity: f64,
    /// Tile color
    pub value: f64,
    /// Import minus export
    pub trade_deficit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryFocus {
    pub partner: String,
    pub direction: Direction,
    pub title: String,
    /// Yearly totals, ascending by year
    pub series: Vec<CountryYearRow>,
    pub products: Vec<ProductBreakdown>,
}

pub fn country_focus(dataset: &Dataset, partner: &str, direction: Direction, year: Option<i32>) -> CountryFocus {
    let mut series: Vec<CountryYearRow> = dataset
        .country_years
        .iter()
        .filter(|r| r.partner == partner)
        .cloned()
        .collect();
    series.sort_by_key(|r| r.year);

    let products = dataset
        .product_details
        .iter()
        .filter(|r| r.country == partner)
        .filter(|r| year.is_none() || r.year == year)
        .filter(|r| r.quantity(direction) > 0.0)
        .map(|r| ProductBreakdown {
            product_name: r.product_name.clone(),
            quantity: r.quantity(direction),
            value: r.value(direction),
            trade_deficit: r.trade_deficit(),
        })
        .collect();

    let verb = match direction {
        Direction::Export => "Export",
        Direction::Import => "Import",
    };

    CountryFocus {
        partner: partner.to_string(),
        direction,
        title: format!("Treemap of {} with {} by HS Categories", verb, partner),
        series,
        products,
    }
}

// ============================================================================
// FILTER OPTIONS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub measures: Vec<Measure>,
    pub product_types: Vec<String>,
    pub partners: Vec<String>,
    pub country_partners: Vec<String>,
}

pub fn filter_options(dataset: &Dataset) -> FilterOptions {
    FilterOptions {
        years: dataset.years(),
        measures: Measure::ALL.to_vec(),
        product_types: dataset.product_types(),
        partners: dataset.partners(),
        country_partners: dataset.country_partners(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
