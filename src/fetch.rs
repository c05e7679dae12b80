use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;

use crate::github::endpoints::{self, PAGE_SIZE};
use crate::github::types::{Review, UserRepository};
use crate::github::{is_valid_login, FetchError, GitHubClient, RepoRef};
use crate::report::{AnalyticsReport, CollaborationReport, RepositoryOverview, RepositoryReport};

/// Default cap on review requests in flight for one repository
pub const DEFAULT_REVIEW_CONCURRENCY: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub review_concurrency: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            review_concurrency: DEFAULT_REVIEW_CONCURRENCY,
        }
    }
}

/// Run `task` for every item with at most `limit` futures in flight and
/// collect the results in completion order.
///
/// The first error is returned immediately; futures still in flight are
/// dropped with it.
pub async fn bounded_fan_out<I, T, E, F, Fut>(
    items: I,
    limit: usize,
    mut task: F,
) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let limit = limit.max(1);
    let mut items = items.into_iter();
    let mut in_flight = FuturesUnordered::new();
    let mut results = Vec::new();

    // Fill initial batch
    for item in items.by_ref().take(limit) {
        in_flight.push(task(item));
    }

    // Feed one new task per completed one
    while let Some(result) = in_flight.next().await {
        results.push(result?);
        if let Some(item) = items.next() {
            in_flight.push(task(item));
        }
    }

    Ok(results)
}

/// A 404 on a repository-level endpoint means the repository itself is missing
fn scoped_to_repo(err: FetchError, repo: &RepoRef) -> FetchError {
    match err {
        FetchError::NotFound(_) => FetchError::NotFound(format!("Repository {}", repo)),
        other => other,
    }
}

/// The repository was already found, so a 404 on one pull request's reviews
/// is an upstream inconsistency, not a missing repository.
fn review_lookup_failure(err: FetchError) -> FetchError {
    match err {
        FetchError::NotFound(what) => FetchError::Upstream {
            status: 404,
            message: format!("{} not found", what),
        },
        other => other,
    }
}

/// Validate `username` and list their repositories, most starred first.
///
/// A user without repositories yields an empty list, not an error.
pub async fn fetch_user_repositories(
    client: &GitHubClient,
    username: &str,
) -> Result<Vec<UserRepository>> {
    let username = username.trim();
    if username.is_empty() {
        bail!("Please enter a GitHub username");
    }
    if !is_valid_login(username) {
        bail!("Invalid GitHub username '{}'", username);
    }

    endpoints::get_user(client, username).await?;
    let repos = endpoints::list_user_repos(client, username).await?;

    tracing::info!(username, count = repos.len(), "fetched user repositories");
    Ok(repos)
}

/// Repository summary, contributors, pull requests, commits and languages,
/// fetched concurrently and joined.
pub async fn fetch_overview(client: &GitHubClient, repo: &RepoRef) -> Result<RepositoryOverview> {
    let (summary, contributors, prs, commits, languages) = tokio::try_join!(
        endpoints::get_repository(client, repo),
        endpoints::list_contributors(client, repo, None),
        endpoints::list_pulls(client, repo, None),
        endpoints::list_commits(client, repo),
        endpoints::get_languages(client, repo),
    )
    .map_err(|e| scoped_to_repo(e, repo))?;

    tracing::debug!(
        repo = %repo,
        contributors = contributors.len(),
        prs = prs.len(),
        commits = commits.len(),
        languages = languages.len(),
        "overview batch complete"
    );
    Ok(RepositoryOverview::build(summary, contributors, &prs, commits, &languages))
}

/// Weekly commit activity and issue resolution times
pub async fn fetch_analytics(client: &GitHubClient, repo: &RepoRef) -> Result<AnalyticsReport> {
    let (weeks, issues) = tokio::try_join!(
        endpoints::get_commit_activity(client, repo),
        endpoints::list_issues(client, repo),
    )
    .map_err(|e| scoped_to_repo(e, repo))?;

    tracing::debug!(
        repo = %repo,
        weeks = weeks.len(),
        issues = issues.len(),
        "analytics batch complete"
    );
    Ok(AnalyticsReport::build(&weeks, &issues))
}

/// Pull requests and contributors, then the reviews of every pull request
/// with bounded concurrency.
pub async fn fetch_collaboration(
    client: &GitHubClient,
    repo: &RepoRef,
    options: FetchOptions,
    now: DateTime<Utc>,
) -> Result<CollaborationReport> {
    let (prs, contributors) = tokio::try_join!(
        endpoints::list_pulls(client, repo, Some(PAGE_SIZE)),
        endpoints::list_contributors(client, repo, Some(PAGE_SIZE)),
    )
    .map_err(|e| scoped_to_repo(e, repo))?;

    let numbers: Vec<u64> = prs.iter().map(|pr| pr.number).collect();
    let review_lists = bounded_fan_out(numbers, options.review_concurrency, move |number| {
        endpoints::list_reviews(client, repo, number)
    })
    .await
    .map_err(review_lookup_failure)?;

    let mut reviews: Vec<Review> = review_lists.into_iter().flatten().collect();
    reviews.sort_by_key(|review| review.pull_number);

    tracing::debug!(
        repo = %repo,
        prs = prs.len(),
        reviews = reviews.len(),
        concurrency = options.review_concurrency,
        "collaboration batch complete"
    );
    Ok(CollaborationReport::build(&prs, &reviews, &contributors, now))
}

/// Every batch of the repository view, joined into one report.
///
/// Any failure fails the whole report so the view never renders partially.
pub async fn fetch_repository_report(
    client: &GitHubClient,
    repo: &RepoRef,
    options: FetchOptions,
) -> Result<RepositoryReport> {
    let now = Utc::now();
    let (overview, analytics, collaboration) = tokio::try_join!(
        fetch_overview(client, repo),
        fetch_analytics(client, repo),
        fetch_collaboration(client, repo, options, now),
    )?;

    tracing::info!(repo = %repo, "repository report ready");
    Ok(RepositoryReport {
        repo: repo.clone(),
        generated_at: now,
        overview,
        analytics,
        collaboration,
    })
}
