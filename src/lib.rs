// US Trade Dashboard - Core Library
// Exposes the aggregation pipeline for the TUI, the API server, and tests

pub mod error;
pub mod records;    // Typed rows + Direction/Measure
pub mod loader;     // CSV ingestion with row checks
pub mod aggregate;  // Grouped sums + export/import join
pub mod ranking;    // Top-N with view policies
pub mod binning;    // Sign-aware color buckets
pub mod text;       // Label wrapping
pub mod format;     // Currency + unit scaling
pub mod config;
pub mod dataset;    // Immutable snapshot of all tables
pub mod views;      // Overview / product / country pages

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::DashboardError;
pub use records::{
    CountryYearRow, Direction, ExportRow, ImportRow, Measure,
    ProductDetailRow, ProductImage, TradeRecord,
};
pub use loader::{load_optional_table, load_table, read_table, LoadedTable, RowCheck, RowError};
pub use aggregate::{aggregate, join, total, trade_table, AggregateKey, AggregateRow, GroupKey, TradeFilter};
pub use ranking::{normalize, rank, top_n, RankOrder, RankPolicy, RankedRow, DEFAULT_TOP_N};
pub use binning::{
    bin, bin_values, BinnedBatch, BinnedValue, Bucket, BucketScheme, SchemePair,
    OVERVIEW_SCHEMES, PRODUCT_SCHEMES,
};
pub use text::{wrap_lines, wrap_text, LINE_BREAK};
pub use format::{dollar, dollar_scaled, scale, short_usd, Unit};
pub use config::DashboardConfig;
pub use dataset::{Dataset, DatasetSummary};
pub use views::{
    country_focus, filter_options, overview, product_focus, CountryFocus, FilterOptions,
    OverviewQuery, ProductFocus, ProductQuery, TradeOverview,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
