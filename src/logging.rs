use tracing_subscriber::EnvFilter;

use crate::error::{Result, ToolError};

/// Environment variable selecting the log threshold.
pub const LOG_LEVEL_ENV: &str = "LOGLEVEL";
/// Threshold used when [`LOG_LEVEL_ENV`] is unset or empty.
pub const DEFAULT_LOG_LEVEL: &str = "ERROR";

/// Translates a level name (`DEBUG`, `WARNING`, ...) into a filter directive.
/// Anything that is not a known level name is passed through unchanged so full
/// `EnvFilter` directives keep working.
pub fn filter_directive(level: Option<&str>) -> String {
    let level = level
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let directive = match level.to_ascii_uppercase().as_str() {
        "CRITICAL" | "FATAL" | "ERROR" => "error",
        "WARNING" | "WARN" => "warn",
        "INFO" => "info",
        "DEBUG" => "debug",
        "NOTSET" | "TRACE" => "trace",
        _ => return level.to_string(),
    };
    directive.to_string()
}

/// Installs the global subscriber writing to standard error.
pub fn init(level: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_new(filter_directive(level))
        .map_err(|err| ToolError::Logging(err.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}
