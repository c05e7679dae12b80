//! Pure aggregation of GitHub payloads into chart series, 0-100 scores and
//! rankings. Nothing here performs I/O or fails: empty input degrades to an
//! empty series or a zero score.

pub mod rankings;
pub mod scores;
pub mod series;

pub use rankings::{
    contributor_leaderboard, pull_request_state_counts, review_state_counts, PullRequestCounts,
    ReviewCounts,
};
pub use scores::{
    code_quality_score, collaboration_score, pr_velocity, review_time_score, team_engagement_score,
    TeamMetrics, MAX_SCORE,
};
pub use series::{
    commit_series, issue_resolution_series, language_percentages, LanguageShare, ResolutionPoint,
    SeriesPoint, COMMIT_WEEKS,
};
