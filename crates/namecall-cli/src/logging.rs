//! Diagnostic logging to stderr

use anyhow::{anyhow, Result};
use namecall_config::LogLevel;
use std::io::IsTerminal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber
///
/// `directive` (from `--log` or `NAMECALL_LOG`) wins over the configured
/// level; an unparsable directive falls back to the configured level.
pub fn init(level: LogLevel, directive: Option<&str>) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_ansi(should_emit_colors())
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter(level, directive))
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

fn filter(level: LogLevel, directive: Option<&str>) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_str()))
}

fn should_emit_colors() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}
