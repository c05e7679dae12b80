pub mod client;
pub mod endpoints;
pub mod error;
pub mod repo_ref;
pub mod types;

pub use client::{create_client, GitHubClient, DEFAULT_API_BASE_URL};
pub use error::FetchError;
pub use repo_ref::{is_valid_login, RepoRef};
pub use types::{
    Account, Commit, CommitActivityWeek, Contributor, Issue, ItemState, LanguageBytes, PullRequest,
    RepositorySummary, Review, ReviewState, User, UserRepository,
};
