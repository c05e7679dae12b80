use serde::Serialize;

use crate::github::types::{Contributor, ItemState, PullRequest, Review, ReviewState};

/// Review totals across all fetched pull requests.
///
/// `total` only counts the three tracked states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReviewCounts {
    pub approvals: u64,
    pub changes_requested: u64,
    pub pending: u64,
    pub total: u64,
}

impl ReviewCounts {
    /// `count` as a percentage of `total`, 0 when there are no reviews
    pub fn share(&self, count: u64) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (count as f64 / self.total as f64 * 100.0).clamp(0.0, 100.0)
    }
}

/// Open/closed split of a pull request listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PullRequestCounts {
    pub open: u64,
    pub closed: u64,
}

impl PullRequestCounts {
    pub fn total(&self) -> u64 {
        self.open + self.closed
    }
}

/// Contributors ordered by contribution count, highest first.
///
/// Uses a stable sort so equal counts keep their input order.
pub fn contributor_leaderboard(contributors: &[Contributor]) -> Vec<Contributor> {
    let mut ranked = contributors.to_vec();
    ranked.sort_by(|a, b| b.contributions.cmp(&a.contributions));
    ranked
}

/// Count approvals, change requests and pending reviews. Other states are
/// ignored entirely.
pub fn review_state_counts(reviews: &[Review]) -> ReviewCounts {
    let mut counts = ReviewCounts::default();
    for review in reviews {
        match review.state {
            ReviewState::Approved => counts.approvals += 1,
            ReviewState::ChangesRequested => counts.changes_requested += 1,
            ReviewState::Pending => counts.pending += 1,
            ReviewState::Other => continue,
        }
        counts.total += 1;
    }
    counts
}

pub fn pull_request_state_counts(prs: &[PullRequest]) -> PullRequestCounts {
    prs.iter().fold(PullRequestCounts::default(), |mut counts, pr| {
        match pr.state {
            ItemState::Open => counts.open += 1,
            ItemState::Closed => counts.closed += 1,
        }
        counts
    })
}
