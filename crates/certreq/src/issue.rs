use std::sync::Arc;
use std::time::Duration;

use crate::api::CertificateApi;
use crate::cancel::CancelSignal;
use crate::env;
use crate::error::{IssueError, Result};
use crate::hydrate::{apply_detail, hydrate};
use crate::poll::poll;
use crate::submit::submit;
use crate::types::{Certificate, IssuanceOutcome, IssuanceRequest};

/// Drives certificate issuance against a backend.
///
/// Each call is an independent workflow; the issuer holds no per-request
/// state and can be shared.
#[derive(Clone)]
pub struct Issuer {
    api: Arc<dyn CertificateApi>,
}

impl Issuer {
    pub fn new(api: Arc<dyn CertificateApi>) -> Self {
        Self { api }
    }

    /// Submit `request` and return the issued, hydrated certificate.
    ///
    /// Pending requests are polled for up to `timeout`, or the configured
    /// default when `None`. Errors from submission and polling are returned
    /// as-is.
    pub async fn issue(
        &self,
        request: &IssuanceRequest,
        timeout: Option<Duration>,
        cancel: &CancelSignal,
    ) -> Result<Certificate> {
        match submit(self.api.as_ref(), request).await? {
            IssuanceOutcome::Immediate(mut cert) => {
                let certificate_id = cert.certificate_id.clone();
                hydrate(self.api.as_ref(), &certificate_id, &mut cert).await;
                Ok(cert)
            }
            IssuanceOutcome::Pending(request_id) => {
                self.resume(&request_id, timeout, cancel).await
            }
        }
    }

    /// Resume tracking a request submitted earlier, e.g. after a timeout.
    pub async fn resume(
        &self,
        request_id: &str,
        timeout: Option<Duration>,
        cancel: &CancelSignal,
    ) -> Result<Certificate> {
        let timeout = timeout.unwrap_or_else(env::default_issue_timeout);
        poll(self.api.as_ref(), request_id, timeout, cancel).await
    }

    /// Read an existing certificate by id. Unlike hydration during issuance,
    /// a failed detail fetch is an error here.
    pub async fn refresh(&self, certificate_id: &str) -> Result<Certificate> {
        let detail = self.api.certificate_detail(certificate_id).await.map_err(|source| {
            IssueError::DetailFetch { certificate_id: certificate_id.to_string(), source }
        })?;

        let mut cert = Certificate {
            certificate_id: detail
                .certificate_id
                .clone()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| certificate_id.to_string()),
            status: detail.status.clone().unwrap_or_default(),
            certificate: detail.certificate.clone().unwrap_or_default(),
            serial_number: detail.serial_number.clone().unwrap_or_default(),
            ..Default::default()
        };
        apply_detail(&detail, &mut cert);
        Ok(cert)
    }
}
