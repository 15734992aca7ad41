use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, Once};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "fintrack=info";

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber, appending to `log_file`. The terminal is
/// left alone since the TUI draws over it. Only the first call has an effect.
pub(crate) fn init_tracing(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        // Another subscriber may already be installed (tests); keep it.
        let _ = fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    });
    Ok(())
}
