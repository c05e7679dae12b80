use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::github::types::{
    Commit, CommitActivityWeek, Contributor, Issue, LanguageBytes, PullRequest, RepositorySummary,
    Review, UserRepository,
};
use crate::github::RepoRef;
use crate::metrics::{
    commit_series, contributor_leaderboard, issue_resolution_series, language_percentages,
    pull_request_state_counts, review_state_counts, LanguageShare, PullRequestCounts,
    ResolutionPoint, ReviewCounts, SeriesPoint, TeamMetrics,
};

pub const TOP_CONTRIBUTORS: usize = 5;
pub const RECENT_COMMITS: usize = 10;
pub const LEADERBOARD_SIZE: usize = 10;

/// Headline numbers, contributors, commits and languages of one repository
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryOverview {
    pub summary: RepositorySummary,
    pub pull_requests: PullRequestCounts,
    pub top_contributors: Vec<Contributor>,
    pub recent_commits: Vec<Commit>,
    pub languages: Vec<LanguageShare>,
}

impl RepositoryOverview {
    pub fn build(
        summary: RepositorySummary,
        contributors: Vec<Contributor>,
        prs: &[PullRequest],
        commits: Vec<Commit>,
        languages: &LanguageBytes,
    ) -> Self {
        Self {
            summary,
            pull_requests: pull_request_state_counts(prs),
            top_contributors: contributors.into_iter().take(TOP_CONTRIBUTORS).collect(),
            recent_commits: commits.into_iter().take(RECENT_COMMITS).collect(),
            languages: language_percentages(languages),
        }
    }

    /// (label, value) pairs for the stat cards
    pub fn stat_cards(&self) -> [(&'static str, u64); 4] {
        [
            ("Stars", self.summary.stars),
            ("Forks", self.summary.forks),
            ("Issues", self.summary.open_issues),
            ("Pull Requests", self.pull_requests.total()),
        ]
    }
}

/// Commit frequency and issue resolution charts
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsReport {
    pub commit_series: Vec<SeriesPoint>,
    pub issue_resolution: Vec<ResolutionPoint>,
}

impl AnalyticsReport {
    pub fn build(weeks: &[CommitActivityWeek], issues: &[Issue]) -> Self {
        Self {
            commit_series: commit_series(weeks),
            issue_resolution: issue_resolution_series(issues),
        }
    }

    /// Mean resolution time in days, None without closed issues
    pub fn average_resolution_days(&self) -> Option<f64> {
        if self.issue_resolution.is_empty() {
            return None;
        }
        let total: i64 = self.issue_resolution.iter().map(|p| p.days).sum();
        Some(total as f64 / self.issue_resolution.len() as f64)
    }
}

/// Team scores, review statistics and the contributor leaderboard
#[derive(Debug, Clone, Serialize)]
pub struct CollaborationReport {
    pub team: TeamMetrics,
    pub reviews: ReviewCounts,
    pub leaderboard: Vec<Contributor>,
    /// Number of pull requests whose reviews were fetched
    pub pull_requests_sampled: usize,
}

impl CollaborationReport {
    pub fn build(
        prs: &[PullRequest],
        reviews: &[Review],
        contributors: &[Contributor],
        now: DateTime<Utc>,
    ) -> Self {
        let counts = review_state_counts(reviews);
        Self {
            team: TeamMetrics::compute(prs, &counts, contributors, now),
            reviews: counts,
            leaderboard: contributor_leaderboard(contributors)
                .into_iter()
                .take(LEADERBOARD_SIZE)
                .collect(),
            pull_requests_sampled: prs.len(),
        }
    }
}

/// Repositories whose name contains `query`, case-insensitive.
/// A blank query keeps everything.
pub fn filter_repositories<'a>(
    repos: &'a [UserRepository],
    query: &str,
) -> Vec<&'a UserRepository> {
    let query = query.trim().to_lowercase();
    repos
        .iter()
        .filter(|repo| query.is_empty() || repo.name.to_lowercase().contains(&query))
        .collect()
}

/// Everything the repository view renders
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryReport {
    pub repo: RepoRef,
    pub generated_at: DateTime<Utc>,
    pub overview: RepositoryOverview,
    pub analytics: AnalyticsReport,
    pub collaboration: CollaborationReport,
}
