// 🏆 Top-N Ranking
// Stable ranking of aggregate rows by one measure, plus the per-view display
// policy (deficit negation, positive-only sizing, progress-bar scaling).

use crate::aggregate::AggregateRow;
use crate::records::Measure;
use serde::Serialize;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RankOrder {
    Descending,
    Ascending,
}

/// The N rows with the largest (or, ascending, smallest) value of `measure`.
/// Ties keep their original relative order.
pub fn top_n(rows: &[AggregateRow], measure: Measure, n: usize, order: RankOrder) -> Vec<AggregateRow> {
    let mut sorted: Vec<&AggregateRow> = rows.iter().collect();
    match order {
        RankOrder::Descending => sorted.sort_by(|a, b| b.value(measure).total_cmp(&a.value(measure))),
        RankOrder::Ascending => sorted.sort_by(|a, b| a.value(measure).total_cmp(&b.value(measure))),
    }
    sorted.into_iter().take(n).cloned().collect()
}

/// Scale values into [0, 1] against the column maximum.
/// An all-zero (or empty, or all-negative) column maps to 0.0 everywhere.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v / max).clamp(0.0, 1.0)).collect()
}

// ============================================================================
// VIEW POLICY
// ============================================================================

/// How one view ranks and displays a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankPolicy {
    pub n: usize,
    pub order: RankOrder,
    /// Flip the sign of the rendered value (deficit views)
    pub negate_display: bool,
    /// Drop rows whose rendered value is not strictly positive
    pub positive_only: bool,
}

impl RankPolicy {
    pub fn top(n: usize) -> Self {
        RankPolicy {
            n,
            order: RankOrder::Descending,
            negate_display: false,
            positive_only: false,
        }
    }

    /// Biggest deficits first, shown as positive amounts
    pub fn deficit(n: usize) -> Self {
        RankPolicy {
            n,
            order: RankOrder::Ascending,
            negate_display: true,
            positive_only: false,
        }
    }

    /// Balance measures rank as deficits; flows rank largest first
    pub fn for_measure(measure: Measure, n: usize) -> Self {
        match measure {
            Measure::Balance => RankPolicy::deficit(n),
            Measure::Export | Measure::Import => RankPolicy::top(n),
        }
    }

    pub fn positive_only(mut self) -> Self {
        self.positive_only = true;
        self
    }

    fn display(&self, value: f64) -> f64 {
        if self.negate_display {
            -value
        } else {
            value
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedRow {
    pub rank: usize,
    pub label: String,
    pub row: AggregateRow,
    /// Measure value in the data model's sign convention
    pub value: f64,
    /// Value as rendered (sign flipped for deficit views)
    pub display_value: f64,
    /// display_value against the column maximum, in [0, 1]
    pub progress: f64,
}

/// Rank rows for display under a view policy
pub fn rank(rows: &[AggregateRow], measure: Measure, policy: RankPolicy) -> Vec<RankedRow> {
    let candidates: Vec<AggregateRow> = if policy.positive_only {
        rows.iter()
            .filter(|r| policy.display(r.value(measure)) > 0.0)
            .cloned()
            .collect()
    } else {
        rows.to_vec()
    };

    let top = top_n(&candidates, measure, policy.n, policy.order);
    let display: Vec<f64> = top.iter().map(|r| policy.display(r.value(measure))).collect();
    let progress = normalize(&display);

    top.into_iter()
        .zip(display)
        .zip(progress)
        .enumerate()
        .map(|(i, ((row, display_value), progress))| RankedRow {
            rank: i + 1,
            label: row.label(),
            value: row.value(measure),
            display_value,
            progress,
            row,
        })
        .collect()
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

    fn labels(rows: &[AggregateRow]) -> Vec<String> {
        rows.iter().map(|r| r.label()).collect()
    }

    #[test]
    fn test_top_n_descending_and_truncated() {
        let rows = vec![row("A", 5.0, 0.0), row("B", 9.0, 0.0), row("C", 1.0, 0.0), row("D", 7.0, 0.0)];
        let top = top_n(&rows, Measure::Export, 2, RankOrder::Descending);
        assert_eq!(labels(&top), vec!["B", "D"]);
    }

    #[test]
    fn test_top_n_ties_keep_original_order() {
        let rows = vec![row("A", 5.0, 0.0), row("B", 9.0, 0.0), row("C", 5.0, 0.0), row("D", 5.0, 0.0)];
        let top = top_n(&rows, Measure::Export, 10, RankOrder::Descending);
        assert_eq!(labels(&top), vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn test_deficit_view_negates_display_only() {
        let rows = vec![row("China", 150.0, 500.0), row("Canada", 300.0, 100.0), row("Japan", 10.0, 90.0)];

        let ranked = rank(&rows, Measure::Balance, RankPolicy::deficit(10));

        assert_eq!(ranked[0].label, "China");
        assert_eq!(ranked[0].value, -350.0);
        assert_eq!(ranked[0].display_value, 350.0);
        assert_eq!(ranked[0].row.balance(), -350.0);
        assert_eq!(ranked[1].label, "Japan");
        assert_eq!(ranked[2].label, "Canada");
        assert_eq!(ranked[2].display_value, -200.0);
        assert_eq!(ranked[2].progress, 0.0);
        assert_eq!(ranked[0].progress, 1.0);
    }

    #[test]
    fn test_positive_only_policy_drops_non_positive() {
        let rows = vec![row("China", 150.0, 500.0), row("Canada", 300.0, 100.0)];
        let ranked = rank(&rows, Measure::Balance, RankPolicy::deficit(10).positive_only());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].label, "China");
    }

    #[test]
    fn test_normalize_all_zero_is_neutral() {
        assert_eq!(normalize(&[0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
        assert!(normalize(&[]).is_empty());
        assert_eq!(normalize(&[2.0, 4.0]), vec![0.5, 1.0]);
    }

    #[test]
    fn test_rank_numbers_from_one() {
        let rows = vec![row("A", 1.0, 0.0), row("B", 2.0, 0.0)];
        let ranked = rank(&rows, Measure::Export, RankPolicy::for_measure(Measure::Export, DEFAULT_TOP_N));
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(ranked[0].label, "B");
    }

    proptest! {
        #[test]
        fn prop_top_n_is_prefix_of_stable_sort(values in prop::collection::vec(0u8..10, 0..40), n in 0usize..15) {
            let rows: Vec<AggregateRow> = values
                .iter()
                .enumerate()
                .map(|(i, v)| row(&format!("p{}", i), *v as f64, 0.0))
                .collect();

            let top = top_n(&rows, Measure::Export, n, RankOrder::Descending);
            prop_assert!(top.len() <= n);

            let full = top_n(&rows, Measure::Export, rows.len(), RankOrder::Descending);
            prop_assert_eq!(&full[..top.len()], &top[..]);

            for pair in full.windows(2) {
                let (a, b) = (pair[0].export_value, pair[1].export_value);
                prop_assert!(a >= b);
                if a == b {
                    // equal values keep input order
                    let ia: usize = pair[0].label()[1..].parse().unwrap();
                    let ib: usize = pair[1].label()[1..].parse().unwrap();
                    prop_assert!(ia < ib);
                }
            }
        }
    }
}
