use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Byte counts per language, as returned by `/repos/{owner}/{repo}/languages`
pub type LanguageBytes = BTreeMap<String, u64>;

/// Open/closed state shared by pull requests and issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    Open,
    Closed,
}

/// A GitHub user or organization as embedded in other payloads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
}

/// Response of `GET /users/{username}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub html_url: String,
}

/// Response of `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub owner: Account,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "stargazers_count", default)]
    pub stars: u64,
    #[serde(rename = "forks_count", default)]
    pub forks: u64,
    #[serde(rename = "open_issues_count", default)]
    pub open_issues: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub html_url: String,
}

/// One entry of `GET /users/{username}/repos`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRepository {
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub owner: Account,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "stargazers_count", default)]
    pub stars: u64,
    #[serde(rename = "forks_count", default)]
    pub forks: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub html_url: String,
}

/// One entry of `GET /repos/{owner}/{repo}/contributors`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub contributions: u64,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub state: ItemState,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }

    /// Time from creation to merge, None for unmerged PRs
    pub fn merge_latency(&self) -> Option<Duration> {
        self.merged_at.map(|merged| merged - self.created_at)
    }
}

/// Review states that feed the review statistics. Anything else GitHub
/// reports (COMMENTED, DISMISSED, ...) lands in `Other` and is not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Pending,
    #[default]
    #[serde(other)]
    Other,
}

/// One entry of `GET /repos/{owner}/{repo}/pulls/{number}/reviews`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub state: ReviewState,
    #[serde(default)]
    pub user: Option<Account>,
    /// Number of the PR this review belongs to (not part of the payload)
    #[serde(skip_deserializing, default)]
    pub pull_number: u64,
}

/// One entry of `GET /repos/{owner}/{repo}/stats/commit_activity`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitActivityWeek {
    /// Start of the week as a unix timestamp
    pub week: i64,
    pub total: u64,
    #[serde(default)]
    pub days: Vec<u64>,
}

/// One entry of `GET /repos/{owner}/{repo}/commits`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub commit: CommitDetail,
    #[serde(default)]
    pub author: Option<Account>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<CommitSignature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSignature {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl Commit {
    /// First line of the commit message
    pub fn headline(&self) -> &str {
        self.commit.message.lines().next().unwrap_or("")
    }

    pub fn short_sha(&self) -> String {
        self.sha.chars().take(7).collect()
    }

    pub fn author_name(&self) -> &str {
        self.commit
            .author
            .as_ref()
            .map(|a| a.name.as_str())
            .filter(|name| !name.is_empty())
            .or_else(|| self.author.as_ref().map(|a| a.login.as_str()))
            .unwrap_or("unknown")
    }

    pub fn authored_at(&self) -> Option<DateTime<Utc>> {
        self.commit.author.as_ref().and_then(|a| a.date)
    }
}

/// One entry of `GET /repos/{owner}/{repo}/issues`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub state: ItemState,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    /// Present when the "issue" is actually a pull request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}
