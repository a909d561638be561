// 🎨 Sign-Aware Binning - measure values → fixed choropleth buckets
//
// A scheme is an ordered list of (upper bound exclusive, label, color).
// The first bucket extends to -inf, the last bound is +inf, every bucket is
// half-open [lower, upper). One scheme is picked per batch: the signed one
// when any value is negative, the non-negative one otherwise.

use crate::aggregate::AggregateRow;
use crate::error::DashboardError;
use crate::records::Measure;
use serde::Serialize;

const INF: f64 = f64::INFINITY;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bucket {
    /// Exclusive upper bound; serialized as null when unbounded
    pub upper: f64,
    pub label: &'static str,
    pub color: &'static str,
}

const fn bucket(upper: f64, label: &'static str, color: &'static str) -> Bucket {
    Bucket { upper, label, color }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketScheme {
    pub name: &'static str,
    pub buckets: &'static [Bucket],
}

// ============================================================================
// FIXED SCHEMES
// ============================================================================

pub const OVERVIEW_NON_NEGATIVE: BucketScheme = BucketScheme {
    name: "overview-non-negative",
    buckets: &[
        bucket(500e6, "0-500M", "#ffffcc"),
        bucket(1e9, "500M-1B", "#ffeda0"),
        bucket(3e9, "1B-3B", "#fed976"),
        bucket(8e9, "3B-8B", "#feb24c"),
        bucket(18e9, "8B-18B", "#fd8d3c"),
        bucket(36e9, "18B-36B", "#fc4e2a"),
        bucket(71e9, "36B-71B", "#e31a1c"),
        bucket(200e9, "71B-200B", "#bd0026"),
        bucket(INF, "> 200B", "#800026"),
    ],
};

pub const OVERVIEW_SIGNED: BucketScheme = BucketScheme {
    name: "overview-signed",
    buckets: &[
        bucket(-200e9, "<-200B", "#800026"),
        bucket(-100e9, "-200B-100B", "#bd0026"),
        bucket(-30e9, "-100B-30B", "#e31a1c"),
        bucket(-10e9, "-30B-10B", "#fc4e2a"),
        bucket(0.0, "-10B-0", "#feb24c"),
        bucket(0.1e9, "0-0.1B", "#d0e1f2"),
        bucket(0.2e9, "0.1B-0.2B", "#a6bddb"),
        bucket(0.5e9, "0.2B-0.5B", "#74a9cf"),
        bucket(1e9, "0.5B-1B", "#2b8cbe"),
        bucket(10e9, "1B-10B", "#0570b0"),
        bucket(30e9, "10B-30B", "#045a8d"),
        bucket(INF, ">30B", "#023858"),
    ],
};

pub const PRODUCT_NON_NEGATIVE: BucketScheme = BucketScheme {
    name: "product-non-negative",
    buckets: &[
        bucket(1e5, "< 100K", "#ffffcc"),
        bucket(1e6, "100K - 1M", "#ffeda0"),
        bucket(10e6, "1M - 10M", "#fed976"),
        bucket(50e6, "10M - 50M", "#feb24c"),
        bucket(100e6, "50M - 100M", "#fd8d3c"),
        bucket(500e6, "100M - 500M", "#fc4e2a"),
        bucket(1e9, "500M - 1B", "#e31a1c"),
        bucket(10e9, "1B - 10B", "#bd0026"),
        bucket(50e9, "10B - 50B", "#800026"),
        bucket(100e9, "50B - 100B", "#67001f"),
        bucket(INF, "> 100B", "#49000d"),
    ],
};

pub const PRODUCT_SIGNED: BucketScheme = BucketScheme {
    name: "product-signed",
    buckets: &[
        bucket(-150e9, "<-150B", "#800026"),
        bucket(-50e9, "-150B-50B", "#bd0026"),
        bucket(-30e9, "-50B-30B", "#e31a1c"),
        bucket(-10e9, "-30B-10B", "#fc4e2a"),
        bucket(-5e9, "-10B-5B", "#fd8d3c"),
        bucket(-2.5e9, "-5B-2.5B", "#feb24c"),
        bucket(0.0, "-2.5B-0", "#fed976"),
        bucket(0.1e9, "0B-0.1B", "#eff3ff"),
        bucket(0.2e9, "0.1B-0.2B", "#bdd7e7"),
        bucket(0.5e9, "0.2B-0.5B", "#9ecae1"),
        bucket(1e9, "0.5B-1B", "#6baed6"),
        bucket(10e9, "1B-10B", "#4292c6"),
        bucket(30e9, "10B-30B", "#2171b5"),
        bucket(INF, ">30B", "#084594"),
    ],
};

impl BucketScheme {
    /// Index of the bucket holding `value`. Total over all non-NaN values.
    pub fn index_of(&self, value: f64) -> usize {
        debug_assert!(!value.is_nan(), "NaN reached binning");
        let last = self.buckets.len().saturating_sub(1);
        self.buckets
            .iter()
            .position(|b| value < b.upper)
            .unwrap_or(last)
    }

    pub fn bucket_for(&self, value: f64) -> &'static Bucket {
        &self.buckets[self.index_of(value)]
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.buckets.iter().map(|b| b.label).collect()
    }

    /// Bounds must strictly increase and the last one must be +inf
    pub fn validate(&self) -> Result<(), DashboardError> {
        let last = self
            .buckets
            .last()
            .ok_or_else(|| DashboardError::InvalidConfig(format!("scheme {} has no buckets", self.name)))?;
        if last.upper != INF {
            return Err(DashboardError::InvalidConfig(format!(
                "scheme {} does not end at +inf",
                self.name
            )));
        }
        for pair in self.buckets.windows(2) {
            if pair[0].upper >= pair[1].upper {
                return Err(DashboardError::InvalidConfig(format!(
                    "scheme {} bounds not increasing at {}",
                    self.name, pair[1].label
                )));
            }
        }
        Ok(())
    }
}

/// The two schemes a page chooses between
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemePair {
    pub non_negative: BucketScheme,
    pub signed: BucketScheme,
}

pub const OVERVIEW_SCHEMES: SchemePair = SchemePair {
    non_negative: OVERVIEW_NON_NEGATIVE,
    signed: OVERVIEW_SIGNED,
};

pub const PRODUCT_SCHEMES: SchemePair = SchemePair {
    non_negative: PRODUCT_NON_NEGATIVE,
    signed: PRODUCT_SIGNED,
};

impl SchemePair {
    /// Decided once for the whole batch
    pub fn select<I: IntoIterator<Item = f64>>(&self, values: I) -> BucketScheme {
        if values.into_iter().any(|v| v < 0.0) {
            self.signed
        } else {
            self.non_negative
        }
    }
}

// ============================================================================
// BINNING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinnedValue {
    /// Row label (partner, product, ...)
    pub label: String,
    pub value: f64,
    pub bucket: usize,
    pub bucket_label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinnedBatch {
    pub scheme: BucketScheme,
    /// Sorted by bucket order, ties in input order
    pub values: Vec<BinnedValue>,
}

impl BinnedBatch {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Bin labelled values with one scheme, then sort by bucket order
pub fn bin_values<I>(values: I, scheme: BucketScheme) -> Vec<BinnedValue>
where
    I: IntoIterator<Item = (String, f64)>,
{
    let mut binned: Vec<BinnedValue> = values
        .into_iter()
        .map(|(label, value)| {
            let bucket = scheme.index_of(value);
            let b = &scheme.buckets[bucket];
            BinnedValue {
                label,
                value,
                bucket,
                bucket_label: b.label,
                color: b.color,
            }
        })
        .collect();

    binned.sort_by_key(|v| v.bucket);
    binned
}

/// Bin one measure of a row batch, choosing the scheme from the batch itself
pub fn bin(rows: &[AggregateRow], measure: Measure, schemes: &SchemePair) -> BinnedBatch {
    let scheme = schemes.select(rows.iter().map(|r| r.value(measure)));
    let values = bin_values(rows.iter().map(|r| (r.label(), r.value(measure))), scheme);
    BinnedBatch { scheme, values }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregateKey;
    use proptest::prelude::*;

    fn row(partner: &str, export_value: f64, import_value: f64) -> AggregateRow {
        AggregateRow {
            key: AggregateKey {
                partner: Some(partner.to_string()),
                ..Default::default()
            },
            export_value,
            import_value,
            continent: None,
        }
    }

    const ALL: [BucketScheme; 4] = [OVERVIEW_NON_NEGATIVE, OVERVIEW_SIGNED, PRODUCT_NON_NEGATIVE, PRODUCT_SIGNED];

    #[test]
    fn test_builtin_schemes_are_valid() {
        for scheme in ALL {
            scheme.validate().unwrap();
        }
    }

    #[test]
    fn test_edge_value_goes_to_upper_bucket() {
        assert_eq!(OVERVIEW_NON_NEGATIVE.bucket_for(499_999_999.0).label, "0-500M");
        assert_eq!(OVERVIEW_NON_NEGATIVE.bucket_for(500e6).label, "500M-1B");
        assert_eq!(OVERVIEW_NON_NEGATIVE.bucket_for(200e9).label, "> 200B");
        assert_eq!(OVERVIEW_SIGNED.bucket_for(0.0).label, "0-0.1B");
        assert_eq!(OVERVIEW_SIGNED.bucket_for(-200e9).label, "-200B-100B");
    }

    #[test]
    fn test_outer_buckets_are_unbounded() {
        assert_eq!(OVERVIEW_SIGNED.bucket_for(-1e15).label, "<-200B");
        assert_eq!(OVERVIEW_SIGNED.bucket_for(f64::NEG_INFINITY).label, "<-200B");
        assert_eq!(PRODUCT_NON_NEGATIVE.bucket_for(f64::INFINITY).label, "> 100B");
        // the non-negative scheme still takes a stray negative in its first bucket
        assert_eq!(PRODUCT_NON_NEGATIVE.bucket_for(-1.0).label, "< 100K");
    }

    #[test]
    fn test_china_balance_lands_in_small_deficit_bucket() {
        let rows = vec![row("China", 150.0, 500.0)];
        let batch = bin(&rows, Measure::Balance, &OVERVIEW_SCHEMES);
        assert_eq!(batch.scheme.name, "overview-signed");
        assert_eq!(batch.values[0].value, -350.0);
        assert_eq!(batch.values[0].bucket_label, "-10B-0");
        assert_eq!(batch.values[0].color, "#feb24c");
    }

    #[test]
    fn test_one_negative_switches_whole_batch() {
        let rows = vec![row("A", 5e9, 0.0), row("B", 0.0, 1.0), row("C", 40e9, 0.0)];
        let batch = bin(&rows, Measure::Balance, &OVERVIEW_SCHEMES);
        assert_eq!(batch.scheme, OVERVIEW_SIGNED);

        let exports = bin(&rows, Measure::Export, &OVERVIEW_SCHEMES);
        assert_eq!(exports.scheme, OVERVIEW_NON_NEGATIVE);
    }

    #[test]
    fn test_output_sorted_by_bucket_not_label() {
        let rows = vec![row("Big", 300e9, 0.0), row("Small", 1e6, 0.0), row("Mid", 2e9, 0.0), row("Tiny", 2e6, 0.0)];
        let batch = bin(&rows, Measure::Export, &OVERVIEW_SCHEMES);
        let order: Vec<&str> = batch.values.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(order, vec!["Small", "Tiny", "Mid", "Big"]);
        let labels: Vec<&str> = batch.values.iter().map(|v| v.bucket_label).collect();
        assert_eq!(labels, vec!["0-500M", "0-500M", "1B-3B", "> 200B"]);
    }

    #[test]
    fn test_empty_batch() {
        let batch = bin(&[], Measure::Import, &PRODUCT_SCHEMES);
        assert!(batch.is_empty());
        assert_eq!(batch.scheme, PRODUCT_NON_NEGATIVE);
    }

    #[test]
    fn test_validate_rejects_bad_schemes() {
        const OPEN: BucketScheme = BucketScheme {
            name: "open",
            buckets: &[Bucket { upper: 1.0, label: "a", color: "#000" }],
        };
        const UNSORTED: BucketScheme = BucketScheme {
            name: "unsorted",
            buckets: &[
                Bucket { upper: 5.0, label: "a", color: "#000" },
                Bucket { upper: 1.0, label: "b", color: "#111" },
                Bucket { upper: f64::INFINITY, label: "c", color: "#222" },
            ],
        };
        assert!(OPEN.validate().is_err());
        assert!(UNSORTED.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_every_finite_value_gets_exactly_one_bucket(value in -1e13f64..1e13) {
            for scheme in ALL {
                let i = scheme.index_of(value);
                let lower = if i == 0 { f64::NEG_INFINITY } else { scheme.buckets[i - 1].upper };
                prop_assert!(lower <= value && value < scheme.buckets[i].upper);
                let matching = (0..scheme.buckets.len())
                    .filter(|&j| {
                        let lo = if j == 0 { f64::NEG_INFINITY } else { scheme.buckets[j - 1].upper };
                        lo <= value && value < scheme.buckets[j].upper
                    })
                    .count();
                prop_assert_eq!(matching, 1);
            }
        }

        #[test]
        fn prop_batch_uses_one_scheme_in_bucket_order(values in prop::collection::vec(-5e11f64..5e11, 0..30)) {
            let labelled: Vec<(String, f64)> = values.iter().enumerate().map(|(i, v)| (i.to_string(), *v)).collect();
            let scheme = OVERVIEW_SCHEMES.select(values.iter().copied());
            let expect_signed = values.iter().any(|v| *v < 0.0);
            prop_assert_eq!(scheme == OVERVIEW_SIGNED, expect_signed);

            let binned = bin_values(labelled, scheme);
            let labels = scheme.labels();
            for pair in binned.windows(2) {
                prop_assert!(pair[0].bucket <= pair[1].bucket);
            }
            for v in &binned {
                prop_assert_eq!(labels[v.bucket], v.bucket_label);
            }
        }
    }
}
