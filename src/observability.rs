//! Logging setup.
//!
//! Logs go to stderr: stdout belongs to the JSON-RPC transport, and any
//! stray byte there corrupts the protocol stream.

use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Text,
    /// JSON lines, for log shippers.
    Json,
}

impl LogFormat {
    /// Reads `BLUEBUBBLES_LOG_FORMAT` (`text` or `json`).
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("BLUEBUBBLES_LOG_FORMAT").as_deref() {
            Ok("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Initializes the tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set; `--verbose` lowers the
/// default from `info` to `debug`. Safe to call once per process.
pub fn init(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    match LogFormat::from_env() {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_default() {
        assert_eq!(LogFormat::default(), LogFormat::Text);
    }
}
