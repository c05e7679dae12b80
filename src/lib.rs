//! Public GitHub repository statistics in the terminal.
//!
//! The `github` module talks to the REST API, `fetch` runs the per-view
//! request batches, `metrics` turns raw payloads into chart series and
//! scores, and `report` assembles them into the models the `tui` and
//! `output` layers render.

pub mod browser;
pub mod config;
pub mod fetch;
pub mod github;
pub mod logging;
pub mod metrics;
pub mod output;
pub mod report;
pub mod stderr_buffer;
pub mod tui;

use std::sync::Once;

static INIT: Once = Once::new();

/// One-time process setup: TLS crypto provider and the log subscriber.
///
/// Safe to call any number of times; only the first call has an effect.
pub fn init(verbose: bool) {
    INIT.call_once(|| {
        // Err means another provider is already installed
        let _ = rustls::crypto::ring::default_provider().install_default();
        if !logging::init_logging(verbose) {
            tracing::debug!("log subscriber already installed");
        }
    });
}
