use serde::Serialize;

use super::scores::clamp_score;
use crate::github::types::{CommitActivityWeek, Issue, ItemState, LanguageBytes};

/// Number of trailing weeks shown in the commit frequency chart
pub const COMMIT_WEEKS: usize = 12;

const SECONDS_PER_DAY: i64 = 86_400;

/// A labeled value for bar/line charts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: u64,
}

/// Resolution time of one closed issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionPoint {
    pub label: String,
    pub issue_number: u64,
    pub days: i64,
}

/// Share of the codebase written in one language
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
    pub name: String,
    /// Percentage rounded to one decimal place
    pub percentage: f64,
}

impl LanguageShare {
    /// Percentage with exactly one decimal, e.g. "50.0"
    pub fn percentage_label(&self) -> String {
        format!("{:.1}", self.percentage)
    }
}

/// Commit totals of the last 12 weeks (or fewer), labeled "Week 1".."Week N"
/// in chronological order.
pub fn commit_series(weeks: &[CommitActivityWeek]) -> Vec<SeriesPoint> {
    let start = weeks.len().saturating_sub(COMMIT_WEEKS);
    weeks[start..]
        .iter()
        .enumerate()
        .map(|(i, week)| SeriesPoint {
            label: format!("Week {}", i + 1),
            value: week.total,
        })
        .collect()
}

/// Whole days from creation to close for every closed issue.
///
/// Pull requests listed by the issues endpoint count like any other entry.
/// Open issues and closed issues without a `closed_at` are skipped. Days are
/// floored.
pub fn issue_resolution_series(issues: &[Issue]) -> Vec<ResolutionPoint> {
    issues
        .iter()
        .filter(|issue| issue.state == ItemState::Closed)
        .filter_map(|issue| issue.closed_at.map(|closed_at| (issue, closed_at)))
        .enumerate()
        .map(|(i, (issue, closed_at))| {
            let seconds = (closed_at - issue.created_at).num_seconds();
            ResolutionPoint {
                label: format!("Issue {}", i + 1),
                issue_number: issue.number,
                days: seconds.div_euclid(SECONDS_PER_DAY),
            }
        })
        .collect()
}

/// Percentage of total bytes per language, highest first.
///
/// Languages with equal shares keep their input order. No bytes at all
/// yields an empty list.
pub fn language_percentages(bytes_by_language: &LanguageBytes) -> Vec<LanguageShare> {
    let total: u128 = bytes_by_language.values().map(|&bytes| u128::from(bytes)).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<LanguageShare> = bytes_by_language
        .iter()
        .map(|(name, &bytes)| LanguageShare {
            name: name.clone(),
            percentage: clamp_score(round_one_decimal(bytes as f64 / total as f64 * 100.0)),
        })
        .collect();

    shares.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    shares
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
