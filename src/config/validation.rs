use super::schema::Config;

/// Upper bound for `review_concurrency`; GitHub throttles heavier bursts
const MAX_REVIEW_CONCURRENCY: usize = 50;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let base = config.api_base_url.trim();
    if base.is_empty() {
        errors.push("api_base_url: must not be empty".to_string());
    } else if !(base.starts_with("http://") || base.starts_with("https://")) {
        errors.push(format!(
            "api_base_url: '{}' must start with http:// or https://",
            base
        ));
    }

    if config.review_concurrency == 0 || config.review_concurrency > MAX_REVIEW_CONCURRENCY {
        errors.push(format!(
            "review_concurrency: must be between 1 and {}, got {}",
            MAX_REVIEW_CONCURRENCY, config.review_concurrency
        ));
    }

    match humantime::parse_duration(&config.fetch_timeout) {
        Ok(d) if d.is_zero() => {
            errors.push("fetch_timeout: must be greater than zero".to_string());
        }
        Ok(_) => {}
        Err(e) => {
            errors.push(format!(
                "fetch_timeout: invalid duration '{}' - {}",
                config.fetch_timeout, e
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
