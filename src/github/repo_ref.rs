use anyhow::{bail, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

const GITHUB_HOST_PREFIX: &str = "github.com/";

/// An `owner/repo` pair identifying a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/repo`, `github.com/owner/repo` or a full GitHub URL.
    ///
    /// Extra path segments after the repository (`/pull/3`, `/tree/main`),
    /// a trailing `.git`, query strings and fragments are ignored.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let without_query = trimmed
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default();

        let (path, is_url) = match without_query.find(GITHUB_HOST_PREFIX) {
            Some(idx) => (&without_query[idx + GITHUB_HOST_PREFIX.len()..], true),
            None if without_query.contains("://") => {
                bail!("Not a GitHub repository URL: '{}'", trimmed)
            }
            None => (without_query, false),
        };

        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() < 2 || (!is_url && parts.len() != 2) {
            bail!("Expected owner/repo or a GitHub URL, got '{}'", trimmed);
        }

        let owner = parts[0];
        let name = parts[1].strip_suffix(".git").unwrap_or(parts[1]);

        for segment in [owner, name] {
            if !is_valid_segment(segment) {
                bail!("Invalid repository segment '{}' in '{}'", segment, trimmed);
            }
        }

        Ok(Self::new(owner, name))
    }

    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// GitHub logins are ASCII letters, digits and hyphens
pub fn is_valid_login(login: &str) -> bool {
    !login.is_empty() && login.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
