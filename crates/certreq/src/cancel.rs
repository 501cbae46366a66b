use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Cooperative cancellation for an issuance workflow, with a cause.
///
/// Clones share state. The first cause passed to [`CancelSignal::cancel`]
/// wins; later calls are no-ops.
#[derive(Clone, Default)]
pub struct CancelSignal {
    token: CancellationToken,
    cause: Arc<OnceLock<String>>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing token, e.g. a process-wide shutdown token. Cancelling
    /// the token directly reports a generic cause.
    pub fn from_token(token: CancellationToken) -> Self {
        Self { token, cause: Arc::default() }
    }

    pub fn cancel(&self, cause: impl Into<String>) {
        // Cause must be visible before waiters wake.
        let _ = self.cause.set(cause.into());
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cause(&self) -> String {
        self.cause.get().cloned().unwrap_or_else(|| "operation cancelled".to_string())
    }

    /// Resolves once cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Sleep for `duration` unless cancelled first. Returns `false` when
    /// cancelled; cancellation wins if both are ready.
    pub async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}
