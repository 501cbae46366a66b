use std::collections::VecDeque;

use parking_lot::Mutex;

use certreq::{
    ApiError, BoxFuture, CertificateApi, CertificateDetail, IssuanceRequest, StatusResponse,
    SubmitResponse,
};

/// In-memory certificate backend that replays scripted responses.
///
/// Status responses are consumed in order; the last one repeats forever, so
/// a script of `[pending()]` never completes.
pub struct ScriptedApi {
    inner: Mutex<ScriptedInner>,
}

struct ScriptedInner {
    submit: Result<SubmitResponse, ApiError>,
    statuses: VecDeque<Result<StatusResponse, ApiError>>,
    detail: Result<CertificateDetail, ApiError>,
    submitted: Vec<IssuanceRequest>,
    status_calls: usize,
    detail_calls: usize,
}

impl ScriptedApi {
    /// Backend that accepts submissions as pending under `request_id`.
    pub fn pending(request_id: &str) -> Self {
        Self::with_submit(Ok(SubmitResponse {
            request_id: Some(request_id.into()),
            status: Some("pending".into()),
            ..Default::default()
        }))
    }

    /// Backend that issues synchronously on submission.
    pub fn immediate(certificate_id: &str, certificate: &str) -> Self {
        Self::with_submit(Ok(SubmitResponse {
            request_id: Some(format!("req-{certificate_id}")),
            status: Some("issued".into()),
            certificate_id: Some(certificate_id.into()),
            certificate: Some(certificate.into()),
            ..Default::default()
        }))
    }

    /// Backend whose submission fails with `err`.
    pub fn failing_submit(err: ApiError) -> Self {
        Self::with_submit(Err(err))
    }

    fn with_submit(submit: Result<SubmitResponse, ApiError>) -> Self {
        certreq::env::init_test_defaults();
        Self {
            inner: Mutex::new(ScriptedInner {
                submit,
                statuses: VecDeque::new(),
                detail: Ok(CertificateDetail::default()),
                submitted: Vec::new(),
                status_calls: 0,
                detail_calls: 0,
            }),
        }
    }

    /// Append status responses to the script.
    pub fn statuses(
        self,
        statuses: impl IntoIterator<Item = Result<StatusResponse, ApiError>>,
    ) -> Self {
        self.inner.lock().statuses.extend(statuses);
        self
    }

    /// Answer detail fetches with `detail`.
    pub fn detail(self, detail: CertificateDetail) -> Self {
        self.inner.lock().detail = Ok(detail);
        self
    }

    /// Fail every detail fetch with `err`.
    pub fn failing_detail(self, err: ApiError) -> Self {
        self.inner.lock().detail = Err(err);
        self
    }

    pub fn submit_calls(&self) -> usize {
        self.inner.lock().submitted.len()
    }

    pub fn status_calls(&self) -> usize {
        self.inner.lock().status_calls
    }

    pub fn detail_calls(&self) -> usize {
        self.inner.lock().detail_calls
    }

    /// Requests received by `submit`, in order.
    pub fn submitted(&self) -> Vec<IssuanceRequest> {
        self.inner.lock().submitted.clone()
    }
}

impl CertificateApi for ScriptedApi {
    fn submit<'a>(
        &'a self,
        request: &'a IssuanceRequest,
    ) -> BoxFuture<'a, Result<SubmitResponse, ApiError>> {
        let mut inner = self.inner.lock();
        inner.submitted.push(request.clone());
        let result = inner.submit.clone();
        Box::pin(std::future::ready(result))
    }

    fn request_status<'a>(
        &'a self,
        request_id: &'a str,
    ) -> BoxFuture<'a, Result<StatusResponse, ApiError>> {
        let mut inner = self.inner.lock();
        inner.status_calls += 1;
        let result = if inner.statuses.len() > 1 {
            inner.statuses.pop_front()
        } else {
            inner.statuses.front().cloned()
        };
        let result = result.unwrap_or_else(|| Err(ApiError::NotFound(request_id.into())));
        Box::pin(std::future::ready(result))
    }

    fn certificate_detail<'a>(
        &'a self,
        _certificate_id: &'a str,
    ) -> BoxFuture<'a, Result<CertificateDetail, ApiError>> {
        let mut inner = self.inner.lock();
        inner.detail_calls += 1;
        let result = inner.detail.clone();
        Box::pin(std::future::ready(result))
    }
}

pub fn pending() -> Result<StatusResponse, ApiError> {
    Ok(StatusResponse { status: "pending".into(), ..Default::default() })
}

pub fn issued(certificate_id: &str, certificate: &str) -> Result<StatusResponse, ApiError> {
    Ok(StatusResponse {
        status: "issued".into(),
        certificate_id: Some(certificate_id.into()),
        certificate: Some(certificate.into()),
        ..Default::default()
    })
}

pub fn failed(message: Option<&str>) -> Result<StatusResponse, ApiError> {
    Ok(StatusResponse {
        status: "failed".into(),
        error_message: message.map(String::from),
        ..Default::default()
    })
}

/// A status response with an arbitrary status string.
pub fn with_status(status: &str) -> StatusResponse {
    StatusResponse { status: status.into(), ..Default::default() }
}

pub fn not_found(request_id: &str) -> Result<StatusResponse, ApiError> {
    Err(ApiError::NotFound(request_id.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_status_repeats() {
        let api = ScriptedApi::pending("req-1").statuses([not_found("req-1"), pending()]);

        assert!(api.request_status("req-1").await.is_err());
        for _ in 0..3 {
            let status = api.request_status("req-1").await.unwrap();
            assert_eq!(status.status, "pending");
        }
        assert_eq!(api.status_calls(), 4);
    }

    #[tokio::test]
    async fn empty_script_is_not_found() {
        let api = ScriptedApi::pending("req-1");
        let err = api.request_status("req-1").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
