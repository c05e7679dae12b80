use anyhow::{Context, Result};

use crate::github::types::Contributor;
use crate::github::RepoRef;

/// Open a URL in the user's default browser
///
/// # Errors
/// Returns error if browser cannot be opened (e.g., no browser available)
pub fn open_url(url: &str) -> Result<()> {
    tracing::debug!(url, "opening browser");
    webbrowser::open(url).with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}

pub fn open_repository(repo: &RepoRef) -> Result<()> {
    open_url(&repo.html_url())
}

/// Open a contributor's GitHub profile
pub fn open_profile(contributor: &Contributor) -> Result<()> {
    open_url(&profile_url(contributor))
}

/// The API sometimes omits `html_url` for anonymous contributors
pub fn profile_url(contributor: &Contributor) -> String {
    if contributor.html_url.is_empty() {
        format!("https://github.com/{}", contributor.login)
    } else {
        contributor.html_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_url_fallback() {
        let mut contributor = Contributor {
            login: "octocat".to_string(),
            avatar_url: String::new(),
            contributions: 1,
            html_url: String::new(),
        };
        assert_eq!(profile_url(&contributor), "https://github.com/octocat");

        contributor.html_url = "https://github.example/octocat".to_string();
        assert_eq!(profile_url(&contributor), "https://github.example/octocat");
    }
}
