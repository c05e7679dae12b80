use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::error::Elapsed;

use crate::fetch::{fetch_repository_report, fetch_user_repositories, FetchOptions};
use crate::github::types::UserRepository;
use crate::github::{GitHubClient, RepoRef};
use crate::report::RepositoryReport;

/// A data load requested by the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    UserRepositories(String),
    Report(RepoRef),
}

/// Result of a finished load, errors already rendered for display
#[derive(Debug)]
pub enum LoadOutcome {
    UserRepositories(Result<Vec<UserRepository>, String>),
    Report(Result<Box<RepositoryReport>, String>),
}

impl LoadRequest {
    /// Outcome for a load that never produced a result (panic, cancellation)
    pub fn failed(&self, message: String) -> LoadOutcome {
        match self {
            LoadRequest::UserRepositories(_) => LoadOutcome::UserRepositories(Err(message)),
            LoadRequest::Report(_) => LoadOutcome::Report(Err(message)),
        }
    }
}

/// A spawned load tagged with the view generation that requested it
pub struct PendingLoad {
    pub generation: u64,
    pub request: LoadRequest,
    pub handle: JoinHandle<LoadOutcome>,
}

impl PendingLoad {
    pub fn abort(self) {
        tracing::debug!(generation = self.generation, request = ?self.request, "aborting load");
        self.handle.abort();
    }

    /// Wait for the task; join errors become a failed outcome
    pub async fn finish(self) -> (u64, LoadOutcome) {
        let outcome = match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => self.request.failed(format!("Load task failed: {}", e)),
        };
        (self.generation, outcome)
    }
}

fn settle<T>(result: Result<anyhow::Result<T>, Elapsed>, limit: Duration) -> Result<T, String> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!(
            "Request timed out after {}",
            humantime::format_duration(limit)
        )),
    }
}

/// Run `request` on the runtime under `limit`
pub fn spawn_load(
    request: LoadRequest,
    generation: u64,
    client: GitHubClient,
    options: FetchOptions,
    limit: Duration,
) -> PendingLoad {
    tracing::debug!(generation, request = ?request, "spawning load");
    let task_request = request.clone();

    let handle = tokio::spawn(async move {
        match task_request {
            LoadRequest::UserRepositories(username) => {
                let result =
                    tokio::time::timeout(limit, fetch_user_repositories(&client, &username)).await;
                LoadOutcome::UserRepositories(settle(result, limit))
            }
            LoadRequest::Report(repo) => {
                let result =
                    tokio::time::timeout(limit, fetch_repository_report(&client, &repo, options))
                        .await;
                LoadOutcome::Report(settle(result, limit).map(Box::new))
            }
        }
    });

    PendingLoad {
        generation,
        request,
        handle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::create_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_settle_timeout_message() {
        let limit = Duration::from_millis(5);
        let never = std::future::pending::<anyhow::Result<()>>();
        let result = tokio::time::timeout(limit, never).await;
        assert_eq!(settle(result, limit), Err("Request timed out after 5ms".to_string()));
    }

    #[tokio::test]
    async fn test_settle_error_message() {
        let result: Result<anyhow::Result<()>, Elapsed> = Ok(Err(anyhow::anyhow!("boom")));
        assert_eq!(settle(result, Duration::from_secs(1)), Err("boom".to_string()));
    }

    #[tokio::test]
    async fn test_spawn_load_reports_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let client = create_client(&server.uri(), Duration::from_secs(5)).unwrap();

        let pending = spawn_load(
            LoadRequest::UserRepositories("ghost".to_string()),
            7,
            client,
            FetchOptions::default(),
            Duration::from_secs(5),
        );
        let (generation, outcome) = pending.finish().await;

        assert_eq!(generation, 7);
        match outcome {
            LoadOutcome::UserRepositories(Err(msg)) => assert_eq!(msg, "User ghost not found"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_aborted_load_finishes_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
            .mount(&server)
            .await;
        let client = create_client(&server.uri(), Duration::from_secs(60)).unwrap();

        let pending = spawn_load(
            LoadRequest::Report(RepoRef::new("octocat", "hello")),
            1,
            client,
            FetchOptions::default(),
            Duration::from_secs(60),
        );
        pending.handle.abort();
        let (_, outcome) = pending.finish().await;

        assert!(matches!(
            outcome,
            LoadOutcome::Report(Err(msg)) if msg.starts_with("Load task failed")
        ));
    }
}
