use std::time::Duration;

use tokio::time::Instant;

use crate::api::{CertificateApi, StatusResponse};
use crate::cancel::CancelSignal;
use crate::error::{IssueError, Result};
use crate::hydrate::hydrate;
use crate::types::{Certificate, PollStatus};

/// Fixed delay between status queries. Not configurable, no backoff.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Poll a pending request until it is issued, fails, times out, or is
/// cancelled.
///
/// The deadline is wall-clock from the first call. A "not found" answer is
/// treated as the backend not having indexed the request yet and retried
/// after one interval; every other query error is terminal. On success the
/// certificate is hydrated before it is returned.
pub async fn poll(
    api: &dyn CertificateApi,
    request_id: &str,
    timeout: Duration,
    cancel: &CancelSignal,
) -> Result<Certificate> {
    let start = Instant::now();
    // Overflow means the deadline is unreachable.
    let deadline = start.checked_add(timeout);
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(cancelled(request_id, cancel));
        }
        if let Some(deadline) = deadline
            && Instant::now() > deadline
        {
            let elapsed_secs = start.elapsed().as_secs();
            tracing::warn!(request_id = %request_id, elapsed_secs, "certificate request timed out");
            return Err(IssueError::TimedOut { request_id: request_id.to_string(), elapsed_secs });
        }

        attempt += 1;
        let response = match api.request_status(request_id).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                tracing::debug!(
                    request_id = %request_id,
                    attempt,
                    "certificate request not visible yet, retrying"
                );
                if !cancel.sleep(POLL_INTERVAL).await {
                    return Err(cancelled(request_id, cancel));
                }
                continue;
            }
            Err(e) => {
                return Err(IssueError::Failed {
                    request_id: request_id.to_string(),
                    message: format!("status query failed: {e}"),
                    source: Some(e),
                });
            }
        };

        tracing::debug!(request_id = %request_id, attempt, status = %response.status, "polled");

        match PollStatus::parse(&response.status) {
            PollStatus::Issued => return Ok(finish(api, request_id, response).await),
            PollStatus::Failed => {
                let message = response
                    .error_message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "certificate issuance failed".to_string());
                tracing::warn!(request_id = %request_id, "certificate request failed: {message}");
                return Err(IssueError::Failed {
                    request_id: request_id.to_string(),
                    message,
                    source: None,
                });
            }
            PollStatus::Unknown if response.looks_issued() => {
                tracing::warn!(
                    request_id = %request_id,
                    status = %response.status,
                    "unrecognized request status carries a certificate, treating as issued"
                );
                return Ok(finish(api, request_id, response).await);
            }
            PollStatus::Pending | PollStatus::Unknown => {
                if !cancel.sleep(POLL_INTERVAL).await {
                    return Err(cancelled(request_id, cancel));
                }
            }
        }
    }
}

async fn finish(
    api: &dyn CertificateApi,
    request_id: &str,
    response: StatusResponse,
) -> Certificate {
    let mut cert = certificate_from_status(response);
    tracing::info!(
        request_id = %request_id,
        certificate_id = %cert.certificate_id,
        "certificate issued"
    );
    if !cert.certificate_id.is_empty() {
        let certificate_id = cert.certificate_id.clone();
        hydrate(api, &certificate_id, &mut cert).await;
    }
    cert
}

/// Only called on success, so the status is normalized to "issued" even when
/// the backend reported an unrecognized one.
fn certificate_from_status(response: StatusResponse) -> Certificate {
    Certificate {
        certificate_id: response.certificate_id.unwrap_or_default(),
        status: "issued".to_string(),
        certificate: response.certificate.unwrap_or_default(),
        private_key: response.private_key.unwrap_or_default(),
        certificate_chain: response.certificate_chain.unwrap_or_default(),
        serial_number: response.serial_number.unwrap_or_default(),
        ..Default::default()
    }
}

fn cancelled(request_id: &str, cancel: &CancelSignal) -> IssueError {
    let cause = cancel.cause();
    tracing::info!(request_id = %request_id, "stopped polling certificate request: {cause}");
    IssueError::Cancelled { request_id: request_id.to_string(), cause }
}
