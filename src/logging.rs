use tracing_subscriber::EnvFilter;

use crate::stderr_buffer::BufferedStderr;

const DEFAULT_FILTER: &str = "repo_lens=warn";
const VERBOSE_FILTER: &str = "repo_lens=debug";

/// Directive used when `RUST_LOG` is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over the verbosity flag. Output goes through the stderr
/// buffer so the TUI can hold log lines until the terminal is restored.
/// Returns false if a subscriber was already installed.
pub fn init_logging(verbose: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(|| BufferedStderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "repo_lens=warn");
        assert_eq!(default_directive(true), "repo_lens=debug");
    }
}
