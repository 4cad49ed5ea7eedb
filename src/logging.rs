//! Logging bootstrap: diagnostics go to stderr, stdout stays clean for
//! command output.

use flexi_logger::{Logger, LoggerHandle};

/// Start the stderr logger at the given level.
///
/// `RUST_LOG` overrides the configured level when set. The returned handle
/// must stay alive for the duration of the process.
pub fn init(level: &str) -> Result<LoggerHandle, String> {
    Logger::try_with_env_or_str(level)
        .map_err(|e| format!("invalid log level '{level}': {e}"))?
        .log_to_stderr()
        .start()
        .map_err(|e| format!("failed to start logger: {e}"))
}
