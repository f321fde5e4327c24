//! Terminal and JSON rendering of rankings and comparisons.
//!
//! Commands build a ranking or a [`ComparisonReport`], pick a [`Format`]
//! and call one of the `render_*` functions, which keeps presentation in
//! one place.

use colored::Colorize;
use serde::Serialize;

use crate::error::{LlmCountError, Result};
use crate::frequency::WordCount;
use crate::scoring::ComparisonReport;

/// Supported output formats.
///
/// Mirrors [`crate::cli::OutputFormat`] but decoupled from clap so that
/// library code can use it without pulling in CLI dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Json,
}

/// Render a ground-truth ranking.
pub fn render_ranking(ranking: &[WordCount], format: Format) -> Result<String> {
    match format {
        Format::Json => to_json(&RankingJson { top_words: ranking }),
        Format::Table => Ok(ranking_table(ranking)),
    }
}

/// Render a model comparison.
pub fn render_comparison(report: &ComparisonReport, format: Format) -> Result<String> {
    match format {
        Format::Json => to_json(report),
        Format::Table => Ok(comparison_table(report)),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RankingJson<'a> {
    top_words: &'a [WordCount],
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| LlmCountError::config_with_source("failed to serialize output", e))
}

fn ranking_table(ranking: &[WordCount]) -> String {
    if ranking.is_empty() {
        return format!("{}\n", "No words found.".dimmed());
    }
    let width = word_width(ranking.iter().map(|w| w.word.as_str()));
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        format!("{:>3}  {:<width$}  {:>6}", "#", "word", "count").bold()
    ));
    for (i, w) in ranking.iter().enumerate() {
        out.push_str(&format!("{:>3}  {:<width$}  {:>6}\n", i + 1, w.word, w.count));
    }
    out
}

fn comparison_table(report: &ComparisonReport) -> String {
    if report.rows.is_empty() {
        return format!("{}\n", "No words to compare.".dimmed());
    }
    let width = word_width(report.rows.iter().map(|r| r.word.as_str()));
    let mut out = String::new();
    out.push_str(&format!("{} {}\n\n", "Model:".bold(), report.model));
    out.push_str(&format!(
        "{}\n",
        format!(
            "{:<width$}  {:>6}  {:>6}  {:>6}  {:>8}",
            "word", "actual", "model", "diff", "accuracy"
        )
        .bold()
    ));
    for row in &report.rows {
        let diff = format!("{:+}", row.difference);
        let diff = if row.difference == 0 {
            diff.green()
        } else {
            diff.red()
        };
        out.push_str(&format!(
            "{:<width$}  {:>6}  {:>6}  {:>6}  {:>7.1}%\n",
            row.word, row.actual, row.reported, diff, row.accuracy
        ));
    }
    out.push('\n');
    out.push_str(&format!(
        "{} {:.1}% ({} reported vs {} actual)\n",
        "Overall accuracy:".bold(),
        report.aggregate_accuracy,
        report.total_reported,
        report.total_actual
    ));
    out
}

fn word_width<'a>(words: impl Iterator<Item = &'a str>) -> usize {
    words.map(|w| w.chars().count()).max().unwrap_or(0).max(4)
}
