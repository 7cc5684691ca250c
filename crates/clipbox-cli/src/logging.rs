//! Tracing setup
//!
//! Logs go to stderr, or to `log_file` when configured. `RUST_LOG` overrides
//! the configured level.

use std::fs::File;
use std::sync::Mutex;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use clipbox_core::Config;

const DEFAULT_LEVEL: &str = "warn";

/// Initialize logging (ignored if already initialized)
pub fn init(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config)));

    match &config.log_file {
        Some(path) => {
            let file = match File::options().create(true).append(true).open(path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", path, e);
                    return;
                }
            };

            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }

    debug!("Logging initialized");
}

fn default_directives(config: &Config) -> String {
    let level = config.log_level.as_deref().unwrap_or(DEFAULT_LEVEL);
    format!("clipbox_core={},clipbox_cli={}", level, level)
}
