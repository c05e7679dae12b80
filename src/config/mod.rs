mod schema;
mod validation;

pub use schema::{Config, ThemeMode};
pub use validation::validate_config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/repo-lens/)
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("repo-lens"))
}

/// Get the default config file path (~/.config/repo-lens/config.yaml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional explicit path. If None, the default path is tried and
///   a missing file yields the default configuration.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            read_config(&path)
        }
        None => match get_config_path() {
            Some(path) if path.exists() => read_config(&path),
            _ => {
                tracing::debug!("no config file, using defaults");
                Ok(Config::default())
            }
        },
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    // An empty file means "all defaults"
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", path.display()))?;

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "repo-lens-{}-{}.yaml",
            name,
            std::process::id()
        ));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let path = std::env::temp_dir().join("repo-lens-definitely-missing.yaml");
        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().starts_with("Config file not found at"));
    }

    #[test]
    fn test_load_explicit_file() {
        let path = temp_file("explicit", "review_concurrency: 4\ntheme: dark\n");
        let config = load_config(Some(path.clone())).unwrap();
        fs::remove_file(path).ok();

        assert_eq!(config.review_concurrency, 4);
        assert_eq!(config.theme, ThemeMode::Dark);
        assert_eq!(config.fetch_timeout, "20s");
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let path = temp_file("empty", "\n");
        let config = load_config(Some(path.clone())).unwrap();
        fs::remove_file(path).ok();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let path = temp_file("invalid", "review_concurrency: [oops\n");
        let err = load_config(Some(path.clone())).unwrap_err();
        fs::remove_file(path).ok();
        assert!(err.to_string().starts_with("Failed to parse config"));
    }

    #[test]
    fn test_config_path_shape() {
        if let Some(path) = get_config_path() {
            assert!(path.ends_with(".config/repo-lens/config.yaml"));
        }
    }
}
