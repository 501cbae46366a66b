use crate::api::{ApiError, CertificateApi, SubmitResponse, non_empty};
use crate::error::{IssueError, Result};
use crate::types::{Certificate, IssuanceOutcome, IssuanceRequest};

/// Send the issuance request and classify the response.
///
/// Any backend error is fatal here; nothing is retried.
pub async fn submit(
    api: &dyn CertificateApi,
    request: &IssuanceRequest,
) -> Result<IssuanceOutcome> {
    let response = api.submit(request).await.map_err(IssueError::Request)?;
    let outcome = classify(response).map_err(IssueError::Request)?;

    match &outcome {
        IssuanceOutcome::Immediate(cert) => {
            tracing::info!(
                profile = %request.profile_id,
                certificate_id = %cert.certificate_id,
                "certificate issued synchronously"
            );
        }
        IssuanceOutcome::Pending(request_id) => {
            tracing::info!(
                profile = %request.profile_id,
                request_id = %request_id,
                "certificate request accepted, pending"
            );
        }
    }
    Ok(outcome)
}

/// A response is immediate only when it carries both a certificate id and
/// the certificate itself.
pub(crate) fn classify(response: SubmitResponse) -> std::result::Result<IssuanceOutcome, ApiError> {
    if let (Some(certificate_id), Some(certificate)) =
        (non_empty(&response.certificate_id), non_empty(&response.certificate))
    {
        return Ok(IssuanceOutcome::Immediate(Certificate {
            certificate_id: certificate_id.to_string(),
            certificate: certificate.to_string(),
            status: response.status.clone().unwrap_or_else(|| "issued".to_string()),
            certificate_chain: response.certificate_chain.clone().unwrap_or_default(),
            private_key: response.private_key.clone().unwrap_or_default(),
            serial_number: response.serial_number.clone().unwrap_or_default(),
            ..Default::default()
        }));
    }

    match non_empty(&response.request_id) {
        Some(request_id) => Ok(IssuanceOutcome::Pending(request_id.to_string())),
        None => Err(ApiError::Malformed(
            "submission response carried neither a certificate nor a request id".to_string(),
        )),
    }
}
