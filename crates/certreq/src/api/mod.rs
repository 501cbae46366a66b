pub mod http;

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use crate::alt_names::AltNamesInput;
use crate::types::IssuanceRequest;

/// Boxed future for async trait methods that need `dyn` dispatch.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors from the certificate backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The backend does not know the identifier (yet).
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The backend could not be reached (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not the expected JSON.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The response or request violates the issuance protocol.
    #[error("malformed: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

/// Remote certificate-management endpoints consumed by the issuance workflow.
pub trait CertificateApi: Send + Sync {
    /// Submit an issuance request.
    fn submit<'a>(
        &'a self,
        request: &'a IssuanceRequest,
    ) -> BoxFuture<'a, Result<SubmitResponse, ApiError>>;

    /// Query the status of a previously submitted request.
    fn request_status<'a>(
        &'a self,
        request_id: &'a str,
    ) -> BoxFuture<'a, Result<StatusResponse, ApiError>>;

    /// Fetch subject, validity and algorithm detail for an issued certificate.
    fn certificate_detail<'a>(
        &'a self,
        certificate_id: &'a str,
    ) -> BoxFuture<'a, Result<CertificateDetail, ApiError>>;
}

/// Response to a submission. Carries either a realized certificate or a
/// request id to poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitResponse {
    pub request_id: Option<String>,
    pub status: Option<String>,
    pub certificate_id: Option<String>,
    pub certificate: Option<String>,
    pub certificate_chain: Option<String>,
    pub private_key: Option<String>,
    pub serial_number: Option<String>,
}

/// Response from the request-status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusResponse {
    pub status: String,
    pub certificate_id: Option<String>,
    pub certificate: Option<String>,
    pub private_key: Option<String>,
    pub certificate_chain: Option<String>,
    pub serial_number: Option<String>,
    pub error_message: Option<String>,
}

impl StatusResponse {
    /// Whether the response already carries a usable certificate, regardless
    /// of the status string.
    pub fn looks_issued(&self) -> bool {
        non_empty(&self.certificate_id).is_some() && non_empty(&self.certificate).is_some()
    }
}

/// Response from the certificate detail endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateDetail {
    pub certificate_id: Option<String>,
    pub status: Option<String>,
    pub common_name: Option<String>,
    pub key_algorithm: Option<String>,
    pub signature_algorithm: Option<String>,
    pub alt_names: Option<AltNamesInput>,
    pub not_before: Option<String>,
    pub not_after: Option<String>,
    pub certificate: Option<String>,
    pub certificate_chain: Option<String>,
    pub serial_number: Option<String>,
}

/// `Some(s)` only when the field is present and non-empty.
pub(crate) fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
