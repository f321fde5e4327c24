//! Accuracy scoring of model-reported counts against ground truth.
//!
//! Both functions are total: empty inputs and zero counts produce a score
//! rather than an error.

use serde::Serialize;

use crate::frequency::WordCount;
use crate::reconcile::fit_length;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One word's ground truth next to the model's answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub word: String,
    pub actual: u64,
    pub reported: u64,
    /// `actual - reported`; negative when the model over-counted.
    pub difference: i64,
    /// Percentage in [0, 100].
    pub accuracy: f64,
}

/// Full comparison of a ranking against one model's counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub model: String,
    pub rows: Vec<ComparisonRow>,
    pub total_actual: u64,
    pub total_reported: u64,
    /// Percentage in [0, 100].
    pub aggregate_accuracy: f64,
}

// ---------------------------------------------------------------------------
// Scoring functions
// ---------------------------------------------------------------------------

/// Accuracy of a single reported count, as a percentage.
///
/// When the word never occurs, an answer of 0 scores 100 and any other
/// answer scores 0.
pub fn word_accuracy(actual: u64, reported: u64) -> f64 {
    if actual == 0 {
        return if reported == 0 { 100.0 } else { 0.0 };
    }
    let error = actual.abs_diff(reported) as f64 / actual as f64;
    ((1.0 - error) * 100.0).max(0.0)
}

/// Aggregate accuracy over all words: `1 - Σ|c - m| / Σc`, as a percentage.
///
/// `counts` is paired positionally with `ranking`; missing entries count
/// as 0. Returns 0 when the ground-truth total is 0.
pub fn aggregate_accuracy(ranking: &[WordCount], counts: &[u64]) -> f64 {
    let total: u128 = ranking.iter().map(|w| u128::from(w.count)).sum();
    if total == 0 {
        return 0.0;
    }
    let error: u128 = ranking
        .iter()
        .zip(fit_length(counts, ranking.len()))
        .map(|(w, m)| u128::from(w.count.abs_diff(m)))
        .sum();
    ((1.0 - error as f64 / total as f64) * 100.0).max(0.0)
}

/// Compare `ranking` with a model's `counts` and build a report.
pub fn compare(ranking: &[WordCount], counts: &[u64], model: &str) -> ComparisonReport {
    let counts = fit_length(counts, ranking.len());
    let rows: Vec<ComparisonRow> = ranking
        .iter()
        .zip(counts.iter())
        .map(|(w, &reported)| ComparisonRow {
            word: w.word.clone(),
            actual: w.count,
            reported,
            difference: signed_difference(w.count, reported),
            accuracy: word_accuracy(w.count, reported),
        })
        .collect();

    ComparisonReport {
        model: model.to_string(),
        total_actual: saturating_total(rows.iter().map(|r| r.actual)),
        total_reported: saturating_total(rows.iter().map(|r| r.reported)),
        aggregate_accuracy: aggregate_accuracy(ranking, &counts),
        rows,
    }
}

/// `actual - reported`, clamped to the `i64` range.
fn signed_difference(actual: u64, reported: u64) -> i64 {
    let diff = i128::from(actual) - i128::from(reported);
    i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX })
}

fn saturating_total(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking() -> Vec<WordCount> {
        vec![
            WordCount::new("the", 10),
            WordCount::new("cat", 5),
            WordCount::new("sat", 5),
        ]
    }

    #[test]
    fn exact_count_is_perfect() {
        assert_eq!(word_accuracy(10, 10), 100.0);
    }

    #[test]
    fn zero_reported_is_zero_accuracy() {
        assert_eq!(word_accuracy(10, 0), 0.0);
    }

    #[test]
    fn zero_truth_zero_reported_is_perfect() {
        assert_eq!(word_accuracy(0, 0), 100.0);
    }

    #[test]
    fn zero_truth_nonzero_reported_is_zero() {
        assert_eq!(word_accuracy(0, 3), 0.0);
    }

    #[test]
    fn over_count_is_floored_at_zero() {
        assert_eq!(word_accuracy(2, 10), 0.0);
        assert!((word_accuracy(10, 12) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn aggregate_uses_total_error() {
        // errors: 0 + 1 + 4 = 5 over total 20 -> 75%
        let acc = aggregate_accuracy(&ranking(), &[10, 4, 1]);
        assert!((acc - 75.0).abs() < 1e-9);
    }

    #[test]
    fn aggregate_zero_total_is_zero() {
        assert_eq!(aggregate_accuracy(&[], &[]), 0.0);
        assert_eq!(aggregate_accuracy(&[WordCount::new("x", 0)], &[0]), 0.0);
    }

    #[test]
    fn aggregate_is_floored() {
        let acc = aggregate_accuracy(&[WordCount::new("x", 1)], &[50]);
        assert_eq!(acc, 0.0);
    }

    #[test]
    fn compare_builds_rows_and_pads_missing_counts() {
        let report = compare(&ranking(), &[10, 6], "gpt-4o");
        assert_eq!(report.model, "gpt-4o");
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[1].difference, -1);
        assert_eq!(report.rows[2].reported, 0);
        assert_eq!(report.rows[2].accuracy, 0.0);
        assert_eq!(report.total_actual, 20);
        assert_eq!(report.total_reported, 16);
    }

    #[test]
    fn compare_survives_huge_reported_counts() {
        let ranking = vec![WordCount::new("a", 1), WordCount::new("b", 1)];
        let counts = crate::reconcile::reconcile_counts(
            "18446744073709551615,18446744073709551615",
            2,
        )
        .counts;
        let report = compare(&ranking, &counts, "gpt-4");
        assert_eq!(report.total_reported, u64::MAX);
        assert_eq!(report.total_actual, 2);
        assert_eq!(report.rows[0].difference, i64::MIN);
        assert_eq!(report.rows[0].accuracy, 0.0);
        assert_eq!(report.aggregate_accuracy, 0.0);
    }

    #[test]
    fn difference_just_past_i64_range() {
        let report = compare(&[WordCount::new("a", 3)], &[9_223_372_036_854_775_808], "gpt-4");
        assert_eq!(report.rows[0].difference, -9_223_372_036_854_775_805);
        assert_eq!(signed_difference(u64::MAX, 0), i64::MAX);
        assert_eq!(signed_difference(5, 7), -2);
    }

    #[test]
    fn compare_empty_ranking() {
        let report = compare(&[], &[1, 2, 3], "gpt-4");
        assert!(report.rows.is_empty());
        assert_eq!(report.aggregate_accuracy, 0.0);
    }
}
