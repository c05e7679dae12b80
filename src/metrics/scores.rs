use chrono::{DateTime, Utc};
use serde::Serialize;

use super::rankings::ReviewCounts;
use crate::github::types::{Contributor, PullRequest};

pub const MAX_SCORE: f64 = 100.0;

const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Pin a raw score into [0, 100]; NaN and infinities become 0.
pub(crate) fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, MAX_SCORE)
    } else {
        0.0
    }
}

/// Merged PRs per day since the earliest merged PR was opened, times 10.
///
/// The window is at least one day.
pub fn pr_velocity(prs: &[PullRequest], now: DateTime<Utc>) -> f64 {
    let merged: Vec<&PullRequest> = prs.iter().filter(|pr| pr.is_merged()).collect();
    let Some(earliest) = merged.iter().map(|pr| pr.created_at).min() else {
        return 0.0;
    };

    let window_days = ((now - earliest).num_seconds() as f64 / SECONDS_PER_DAY).max(1.0);
    clamp_score(merged.len() as f64 / window_days * 10.0)
}

/// Faster merges score higher: every day of average merge latency costs 10
/// points.
pub fn review_time_score(prs: &[PullRequest]) -> f64 {
    let latencies_hours: Vec<f64> = prs
        .iter()
        .filter_map(|pr| pr.merge_latency())
        .map(|latency| latency.num_seconds() as f64 / SECONDS_PER_HOUR)
        .collect();

    if latencies_hours.is_empty() {
        return 0.0;
    }

    let average = latencies_hours.iter().sum::<f64>() / latencies_hours.len() as f64;
    clamp_score(MAX_SCORE - (average / 24.0) * 10.0)
}

/// Share of reviews that were approvals
pub fn collaboration_score(total_reviews: u64, approvals: u64) -> f64 {
    if total_reviews == 0 {
        return 0.0;
    }
    clamp_score(approvals as f64 / total_reviews as f64 * 100.0)
}

/// 100 minus the share of reviews that requested changes
pub fn code_quality_score(total_reviews: u64, changes_requested: u64) -> f64 {
    if total_reviews == 0 {
        return 0.0;
    }
    clamp_score(MAX_SCORE - changes_requested as f64 / total_reviews as f64 * 100.0)
}

/// Share of listed contributors with at least one contribution
pub fn team_engagement_score(contributors: &[Contributor]) -> f64 {
    if contributors.is_empty() {
        return 0.0;
    }
    let active = contributors.iter().filter(|c| c.contributions > 0).count();
    clamp_score(active as f64 / contributors.len() as f64 * 100.0)
}

/// The five team scores shown together in the collaboration view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeamMetrics {
    pub pr_velocity: f64,
    pub review_time: f64,
    pub collaboration: f64,
    pub code_quality: f64,
    pub team_engagement: f64,
}

impl TeamMetrics {
    pub const LABELS: [&'static str; 5] = [
        "PR Velocity",
        "Review Time",
        "Collaboration Score",
        "Code Quality",
        "Team Engagement",
    ];

    pub fn compute(
        prs: &[PullRequest],
        reviews: &ReviewCounts,
        contributors: &[Contributor],
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            pr_velocity: pr_velocity(prs, now),
            review_time: review_time_score(prs),
            collaboration: collaboration_score(reviews.total, reviews.approvals),
            code_quality: code_quality_score(reviews.total, reviews.changes_requested),
            team_engagement: team_engagement_score(contributors),
        }
    }

    /// Label/score pairs in display order
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            (Self::LABELS[0], self.pr_velocity),
            (Self::LABELS[1], self.review_time),
            (Self::LABELS[2], self.collaboration),
            (Self::LABELS[3], self.code_quality),
            (Self::LABELS[4], self.team_engagement),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::ItemState;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn pr(number: u64, created_days_ago: i64, merged_after_hours: Option<i64>) -> PullRequest {
        let created_at = now() - Duration::days(created_days_ago);
        PullRequest {
            number,
            title: format!("PR {}", number),
            state: if merged_after_hours.is_some() { ItemState::Closed } else { ItemState::Open },
            created_at,
            merged_at: merged_after_hours.map(|h| created_at + Duration::hours(h)),
        }
    }

    fn contributor(login: &str, contributions: u64) -> Contributor {
        Contributor {
            login: login.to_string(),
            avatar_url: String::new(),
            contributions,
            html_url: String::new(),
        }
    }

    fn assert_in_range(score: f64) {
        assert!(score.is_finite(), "score is not finite: {}", score);
        assert!((0.0..=100.0).contains(&score), "score out of range: {}", score);
    }

    #[test]
    fn test_pr_velocity_no_merged() {
        assert_eq!(pr_velocity(&[], now()), 0.0);
        assert_eq!(pr_velocity(&[pr(1, 3, None)], now()), 0.0);
    }

    #[test]
    fn test_pr_velocity_uses_earliest_merged() {
        // 5 merged PRs, earliest opened 10 days ago -> 0.5/day -> 5
        let prs: Vec<_> = (0..5)
            .map(|i| pr(i, if i == 3 { 10 } else { 2 }, Some(1)))
            .collect();
        assert!((pr_velocity(&prs, now()) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_pr_velocity_window_at_least_one_day() {
        // Opened one hour ago: window clamps to 1 day -> 3 * 10 = 30
        let created_at = now() - Duration::hours(1);
        let prs: Vec<_> = (0..3)
            .map(|n| PullRequest {
                number: n,
                title: String::new(),
                state: ItemState::Closed,
                created_at,
                merged_at: Some(now()),
            })
            .collect();
        assert!((pr_velocity(&prs, now()) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_pr_velocity_caps_at_100() {
        let prs: Vec<_> = (0..50).map(|i| pr(i, 1, Some(1))).collect();
        assert_eq!(pr_velocity(&prs, now()), 100.0);
    }

    #[test]
    fn test_review_time_score() {
        // Average 48h -> 100 - 2 * 10 = 80
        let prs = vec![pr(1, 10, Some(24)), pr(2, 10, Some(72)), pr(3, 1, None)];
        assert!((review_time_score(&prs) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_review_time_score_no_merged_is_zero() {
        assert_eq!(review_time_score(&[pr(1, 2, None)]), 0.0);
        assert_eq!(review_time_score(&[]), 0.0);
    }

    #[test]
    fn test_review_time_score_slow_merges_floor_at_zero() {
        // 30 days average -> 100 - 300 would be negative
        let prs = vec![pr(1, 60, Some(24 * 30))];
        assert_eq!(review_time_score(&prs), 0.0);
    }

    #[test]
    fn test_collaboration_score() {
        assert_eq!(collaboration_score(0, 0), 0.0);
        assert_eq!(collaboration_score(4, 2), 50.0);
        assert_eq!(collaboration_score(4, 4), 100.0);
    }

    #[test]
    fn test_code_quality_score() {
        assert_eq!(code_quality_score(0, 0), 0.0);
        assert_eq!(code_quality_score(4, 1), 75.0);
        assert_eq!(code_quality_score(4, 0), 100.0);
    }

    #[test]
    fn test_team_engagement_score() {
        assert_eq!(team_engagement_score(&[]), 0.0);
        let contributors = vec![
            contributor("a", 10),
            contributor("b", 0),
            contributor("c", 1),
            contributor("d", 0),
        ];
        assert_eq!(team_engagement_score(&contributors), 50.0);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let pr_sets: Vec<Vec<PullRequest>> = vec![
            vec![],
            vec![pr(1, 0, Some(0))],
            vec![pr(1, 400, Some(24 * 365)), pr(2, 1, None)],
            (0..100).map(|i| pr(i, i as i64 % 7, Some(i as i64))).collect(),
            // merged before created (malformed)
            vec![PullRequest {
                number: 1,
                title: String::new(),
                state: ItemState::Closed,
                created_at: now(),
                merged_at: Some(now() - Duration::days(3)),
            }],
        ];

        for prs in &pr_sets {
            assert_in_range(pr_velocity(prs, now()));
            assert_in_range(review_time_score(prs));
        }

        for (total, part) in [(0, 0), (1, 0), (1, 1), (3, 5), (100, 37)] {
            assert_in_range(collaboration_score(total, part));
            assert_in_range(code_quality_score(total, part));
        }

        assert_in_range(team_engagement_score(&[contributor("a", 0)]));
        assert_in_range(team_engagement_score(&[contributor("a", u64::MAX)]));
    }

    #[test]
    fn test_team_metrics_compute_and_entries() {
        let prs = vec![pr(1, 10, Some(24))];
        let reviews = ReviewCounts {
            approvals: 3,
            changes_requested: 1,
            pending: 0,
            total: 4,
        };
        let contributors = vec![contributor("a", 3)];

        let metrics = TeamMetrics::compute(&prs, &reviews, &contributors, now());
        assert!((metrics.pr_velocity - 1.0).abs() < 1e-9);
        assert!((metrics.review_time - 90.0).abs() < 1e-9);
        assert_eq!(metrics.collaboration, 75.0);
        assert_eq!(metrics.code_quality, 75.0);
        assert_eq!(metrics.team_engagement, 100.0);

        let entries = metrics.entries();
        assert_eq!(entries[0].0, "PR Velocity");
        assert_eq!(entries[4], ("Team Engagement", 100.0));
    }
}
