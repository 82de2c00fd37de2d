//! Logging setup
//!
//! stdout carries the MCP transport, so console output always goes to stderr.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info,autoapprove_mcp=debug";

/// Initialize logging
///
/// # Arguments
/// * `log_level` - filter directive (trace, debug, info, warn, error); `None` reads `RUST_LOG`
/// * `log_file` - extra log file; the daemon needs it because its stderr is discarded
///
/// # Examples
/// ```no_run
/// use autoapprove_mcp::utils::logger::init_logger;
///
/// init_logger(None, None).unwrap();
///
/// use std::path::PathBuf;
/// init_logger(Some("debug"), Some(PathBuf::from("autoapprove-mcp.log"))).unwrap();
/// ```
pub fn init_logger(log_level: Option<&str>, log_file: Option<PathBuf>) -> Result<()> {
    let env_filter = build_filter(log_level)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_level(true)
        .with_ansi(false)
        .compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if let Some(log_path) = log_file {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(std::sync::Arc::new(file))
            .with_target(true)
            .with_ansi(false)
            .with_level(true);

        registry.with(file_layer).try_init()?;
    } else {
        registry.try_init()?;
    }

    tracing::debug!("Logger initialized");
    Ok(())
}

fn build_filter(log_level: Option<&str>) -> Result<EnvFilter> {
    Ok(match log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    })
}
