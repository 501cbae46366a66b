use std::sync::OnceLock;
use std::time::Duration;

/// Timeout applied to a pending request when the caller does not supply one.
pub fn default_issue_timeout() -> Duration {
    *ISSUE_TIMEOUT.get_or_init(|| read_secs("CERTREQ_ISSUE_TIMEOUT_SECS", 3600))
}

/// Per-request timeout for the HTTP driver.
pub fn api_client_timeout() -> Duration {
    *API_CLIENT_TIMEOUT.get_or_init(|| read_ms("CERTREQ_API_TIMEOUT_MS", 30000))
}

/// Pre-populate all OnceLocks with fixed test values.
///
/// Must be called before any accessor is used. Uses `OnceLock::get_or_init`
/// semantics: if called first, env vars are never read.
pub fn init_test_defaults() {
    ISSUE_TIMEOUT.get_or_init(|| Duration::from_secs(3600));
    API_CLIENT_TIMEOUT.get_or_init(|| Duration::from_secs(5));
}

static ISSUE_TIMEOUT: OnceLock<Duration> = OnceLock::new();
static API_CLIENT_TIMEOUT: OnceLock<Duration> = OnceLock::new();

fn read_ms(var: &str, default: u64) -> Duration {
    match std::env::var(var) {
        Ok(val) => Duration::from_millis(val.parse().unwrap_or(default)),
        Err(_) => Duration::from_millis(default),
    }
}

fn read_secs(var: &str, default: u64) -> Duration {
    match std::env::var(var) {
        Ok(val) => Duration::from_secs(val.parse().unwrap_or(default)),
        Err(_) => Duration::from_secs(default),
    }
}
