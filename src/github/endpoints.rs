use super::client::GitHubClient;
use super::error::FetchError;
use super::repo_ref::RepoRef;
use super::types::{
    CommitActivityWeek, Commit, Contributor, Issue, LanguageBytes, PullRequest, RepositorySummary,
    Review, User, UserRepository,
};

/// Largest page GitHub serves; nothing beyond the first page is fetched
pub const PAGE_SIZE: u32 = 100;

fn with_page_size(path: String, per_page: Option<u32>, has_query: bool) -> String {
    match per_page {
        Some(n) if has_query => format!("{}&per_page={}", path, n),
        Some(n) => format!("{}?per_page={}", path, n),
        None => path,
    }
}

/// `GET /users/{username}`
pub async fn get_user(client: &GitHubClient, username: &str) -> Result<User, FetchError> {
    client
        .get_json(&format!("/users/{}", username), &format!("User {}", username))
        .await
}

/// `GET /users/{username}/repos?sort=stars&per_page=100`
pub async fn list_user_repos(
    client: &GitHubClient,
    username: &str,
) -> Result<Vec<UserRepository>, FetchError> {
    let path = format!("/users/{}/repos?sort=stars&per_page={}", username, PAGE_SIZE);
    client
        .get_list(&path, &format!("Repositories of {}", username))
        .await
}

/// `GET /repos/{owner}/{repo}`
pub async fn get_repository(
    client: &GitHubClient,
    repo: &RepoRef,
) -> Result<RepositorySummary, FetchError> {
    client
        .get_json(&format!("/repos/{}", repo), &format!("Repository {}", repo))
        .await
}

/// `GET /repos/{owner}/{repo}/contributors[?per_page=N]`
pub async fn list_contributors(
    client: &GitHubClient,
    repo: &RepoRef,
    per_page: Option<u32>,
) -> Result<Vec<Contributor>, FetchError> {
    let path = with_page_size(format!("/repos/{}/contributors", repo), per_page, false);
    client
        .get_list(&path, &format!("Contributors of {}", repo))
        .await
}

/// `GET /repos/{owner}/{repo}/pulls?state=all[&per_page=N]`
pub async fn list_pulls(
    client: &GitHubClient,
    repo: &RepoRef,
    per_page: Option<u32>,
) -> Result<Vec<PullRequest>, FetchError> {
    let path = with_page_size(format!("/repos/{}/pulls?state=all", repo), per_page, true);
    client
        .get_list(&path, &format!("Pull requests of {}", repo))
        .await
}

/// `GET /repos/{owner}/{repo}/pulls/{number}/reviews`
///
/// Each returned review is tagged with `number`.
pub async fn list_reviews(
    client: &GitHubClient,
    repo: &RepoRef,
    number: u64,
) -> Result<Vec<Review>, FetchError> {
    let path = format!("/repos/{}/pulls/{}/reviews", repo, number);
    let mut reviews: Vec<Review> = client
        .get_list(&path, &format!("Reviews of {}#{}", repo, number))
        .await?;
    for review in &mut reviews {
        review.pull_number = number;
    }
    Ok(reviews)
}

/// `GET /repos/{owner}/{repo}/commits`
pub async fn list_commits(
    client: &GitHubClient,
    repo: &RepoRef,
) -> Result<Vec<Commit>, FetchError> {
    client
        .get_list(&format!("/repos/{}/commits", repo), &format!("Commits of {}", repo))
        .await
}

/// `GET /repos/{owner}/{repo}/languages`
pub async fn get_languages(
    client: &GitHubClient,
    repo: &RepoRef,
) -> Result<LanguageBytes, FetchError> {
    client
        .get_json(&format!("/repos/{}/languages", repo), &format!("Languages of {}", repo))
        .await
}

/// `GET /repos/{owner}/{repo}/issues?state=all`
pub async fn list_issues(client: &GitHubClient, repo: &RepoRef) -> Result<Vec<Issue>, FetchError> {
    client
        .get_list(
            &format!("/repos/{}/issues?state=all", repo),
            &format!("Issues of {}", repo),
        )
        .await
}

/// `GET /repos/{owner}/{repo}/stats/commit_activity`
///
/// Empty while GitHub is still computing the statistics (202).
pub async fn get_commit_activity(
    client: &GitHubClient,
    repo: &RepoRef,
) -> Result<Vec<CommitActivityWeek>, FetchError> {
    client
        .get_list(
            &format!("/repos/{}/stats/commit_activity", repo),
            &format!("Commit activity of {}", repo),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::client::create_client;
    use crate::github::types::ReviewState;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GitHubClient {
        create_client(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_with_page_size() {
        assert_eq!(with_page_size("/a".to_string(), None, false), "/a");
        assert_eq!(with_page_size("/a".to_string(), Some(100), false), "/a?per_page=100");
        assert_eq!(
            with_page_size("/a?state=all".to_string(), Some(100), true),
            "/a?state=all&per_page=100"
        );
    }

    #[tokio::test]
    async fn test_list_user_repos_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat/repos"))
            .and(query_param("sort", "stars"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name": "hello", "stargazers_count": 10, "forks_count": 2 }
            ])))
            .mount(&server)
            .await;

        let repos = list_user_repos(&client_for(&server), "octocat").await.unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "hello");
        assert_eq!(repos[0].stars, 10);
    }

    #[tokio::test]
    async fn test_list_pulls_state_all_with_page_size() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/pulls"))
            .and(query_param("state", "all"))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "number": 7,
                    "title": "Add feature",
                    "state": "closed",
                    "created_at": "2024-01-01T00:00:00Z",
                    "merged_at": "2024-01-02T00:00:00Z"
                }
            ])))
            .mount(&server)
            .await;

        let prs = list_pulls(&client_for(&server), &RepoRef::new("o", "r"), Some(PAGE_SIZE))
            .await
            .unwrap();
        assert_eq!(prs.len(), 1);
        assert!(prs[0].is_merged());
    }

    #[tokio::test]
    async fn test_list_reviews_tags_pull_number() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/pulls/12/reviews"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": 1, "state": "APPROVED" },
                { "id": 2, "state": "COMMENTED" }
            ])))
            .mount(&server)
            .await;

        let reviews = list_reviews(&client_for(&server), &RepoRef::new("o", "r"), 12)
            .await
            .unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().all(|r| r.pull_number == 12));
        assert_eq!(reviews[0].state, ReviewState::Approved);
        assert_eq!(reviews[1].state, ReviewState::Other);
    }

    #[tokio::test]
    async fn test_get_languages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/languages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Rust": 9000, "Shell": 100
            })))
            .mount(&server)
            .await;

        let langs = get_languages(&client_for(&server), &RepoRef::new("o", "r")).await.unwrap();
        assert_eq!(langs.get("Rust"), Some(&9000));
        assert_eq!(langs.len(), 2);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/ghost-user"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "message": "Not Found"
            })))
            .mount(&server)
            .await;

        let err = get_user(&client_for(&server), "ghost-user").await.unwrap_err();
        assert_eq!(err.to_string(), "User ghost-user not found");
    }
}
