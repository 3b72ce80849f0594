//! Shared HTTP client configuration.

use std::sync::OnceLock;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(60);
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Return a shared HTTP agent with consistent timeouts.
///
/// The read timeout bounds every remote lookup, so one stuck collaborator
/// call surfaces as that call's failure instead of stalling the batch.
pub(crate) fn agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .timeout_write(WRITE_TIMEOUT)
            .build()
    })
}

/// Render a request failure for diagnostics without dragging the response
/// body along.
pub(crate) fn describe_error(err: &ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, _) => format!("HTTP status {}", code),
        ureq::Error::Transport(transport) => transport.to_string(),
    }
}
