use crate::api::ApiError;

/// Terminal errors from a certificate issuance workflow.
///
/// Exactly one of these reaches the caller per failed operation. Transient
/// conditions (a status query that cannot find the request yet, a failed
/// detail fetch during hydration) are absorbed before they get here.
#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    /// The initial submission was rejected or never reached the backend.
    #[error("certificate request failed: {0}")]
    Request(#[source] ApiError),

    /// The backend reported the request as failed, or a status query failed
    /// with anything other than "not found".
    #[error("certificate request {request_id} failed: {message}")]
    Failed {
        request_id: String,
        message: String,
        #[source]
        source: Option<ApiError>,
    },

    /// The request was still pending when the deadline passed.
    #[error(
        "timed out after {elapsed_secs}s waiting for certificate request {request_id}; \
         it may still complete, resume tracking with this request id"
    )]
    TimedOut { request_id: String, elapsed_secs: u64 },

    /// The caller cancelled the operation while the request was pending.
    #[error("cancelled while waiting for certificate request {request_id}: {cause}")]
    Cancelled { request_id: String, cause: String },

    /// Reading an existing certificate failed.
    #[error("failed to read certificate {certificate_id}: {source}")]
    DetailFetch {
        certificate_id: String,
        #[source]
        source: ApiError,
    },
}

impl IssueError {
    /// The backend request identifier this error concerns, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            IssueError::Failed { request_id, .. }
            | IssueError::TimedOut { request_id, .. }
            | IssueError::Cancelled { request_id, .. } => Some(request_id),
            IssueError::Request(_) | IssueError::DetailFetch { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, IssueError>;
