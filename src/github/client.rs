use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::error::FetchError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Unauthenticated client for the public GitHub REST API
#[derive(Clone, Debug)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
}

/// Create a GitHub client pointed at `base_url` (no trailing slash needed)
pub fn create_client(base_url: &str, timeout: Duration) -> Result<GitHubClient> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert(
        "X-GitHub-Api-Version",
        HeaderValue::from_static("2022-11-28"),
    );

    let http = reqwest::Client::builder()
        .user_agent(concat!("repo-lens/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .context("Failed to create GitHub client")?;

    Ok(GitHubClient {
        http,
        base_url: base_url.trim_end_matches('/').to_string(),
    })
}

impl GitHubClient {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and decode the body as `T`.
    ///
    /// `what` names the resource in error messages ("Repository owner/repo").
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> Result<T, FetchError> {
        let (_, body) = self.get_raw(path, what).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(format!("{}: {}", what, e)))
    }

    /// GET `path` and decode the body as a list of `T`.
    ///
    /// 202 (GitHub still computing statistics), 204 (empty repository), an
    /// empty body and a non-array body all decode to an empty list.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> Result<Vec<T>, FetchError> {
        let (status, body) = self.get_raw(path, what).await?;
        if status == StatusCode::ACCEPTED
            || status == StatusCode::NO_CONTENT
            || body.trim().is_empty()
        {
            tracing::debug!(path, status = status.as_u16(), "no list content");
            return Ok(Vec::new());
        }

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| FetchError::Decode(format!("{}: {}", what, e)))?;
        if !value.is_array() {
            tracing::debug!(path, "expected a list, got another JSON shape");
            return Ok(Vec::new());
        }

        serde_json::from_value(value).map_err(|e| FetchError::Decode(format!("{}: {}", what, e)))
    }

    async fn get_raw(&self, path: &str, what: &str) -> Result<(StatusCode, String), FetchError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "request failed");
            return Err(FetchError::from_status(status.as_u16(), what, &body));
        }

        Ok((status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GitHubClient {
        create_client(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_sends_github_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .and(header("accept", "application/vnd.github+json"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "login": "octocat"
            })))
            .mount(&server)
            .await;

        let value: serde_json::Value = client_for(&server)
            .get_json("/users/octocat", "User octocat")
            .await
            .unwrap();
        assert_eq!(value["login"], "octocat");
    }

    #[tokio::test]
    async fn test_get_json_maps_404_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/nobody/nothing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "message": "Not Found"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_json::<serde_json::Value>("/repos/nobody/nothing", "Repository nobody/nothing")
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::NotFound("Repository nobody/nothing".to_string()));
    }

    #[tokio::test]
    async fn test_get_list_accepted_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/stats/commit_activity"))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let weeks: Vec<serde_json::Value> = client_for(&server)
            .get_list("/repos/o/r/stats/commit_activity", "Commit activity")
            .await
            .unwrap();
        assert!(weeks.is_empty());
    }

    #[tokio::test]
    async fn test_get_list_no_content_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/contributors"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let contributors: Vec<serde_json::Value> = client_for(&server)
            .get_list("/repos/o/r/contributors", "Contributors")
            .await
            .unwrap();
        assert!(contributors.is_empty());
    }

    #[tokio::test]
    async fn test_get_list_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/issues"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "message": "Server Error"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_list::<serde_json::Value>("/repos/o/r/issues", "Issues")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::Upstream {
                status: 500,
                message: "Server Error".to_string()
            }
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = create_client("https://example.test/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "https://example.test/api");
    }
}
