use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{ApiError, BoxFuture, CertificateApi, CertificateDetail, StatusResponse, SubmitResponse};
use crate::env;
use crate::types::{IssuanceRequest, RequestMode, SubjectAttributes};

/// Connection settings for [`HttpCertificateApi`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Backend base URL, e.g. `https://secrets.example.com`.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
}

/// Certificate backend driver over HTTP/JSON.
///
/// Endpoints:
/// - `POST /v1/certificates/requests` submits a request
/// - `GET /v1/certificates/requests/{id}` reports request status
/// - `GET /v1/certificates/{id}` returns certificate detail
pub struct HttpCertificateApi {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCertificateApi {
    pub fn new(config: HttpConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(env::api_client_timeout())
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token {
            Some(ref token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn submit_impl(&self, request: &IssuanceRequest) -> Result<SubmitResponse, ApiError> {
        let body = IssueBody::from_request(request);
        let resp = self
            .authorize(self.http.post(self.url("/v1/certificates/requests")))
            .json(&body)
            .send()
            .await
            .map_err(map_err)?;

        handle_json_response(resp, &request.profile_id).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, id: &str) -> Result<T, ApiError> {
        let resp =
            self.authorize(self.http.get(self.url(path))).send().await.map_err(map_err)?;

        handle_json_response(resp, id).await
    }

    async fn request_status_impl(&self, request_id: &str) -> Result<StatusResponse, ApiError> {
        let id = path_segment(request_id)?;
        self.get_json(&format!("/v1/certificates/requests/{id}"), id).await
    }

    async fn certificate_detail_impl(
        &self,
        certificate_id: &str,
    ) -> Result<CertificateDetail, ApiError> {
        let id = path_segment(certificate_id)?;
        self.get_json(&format!("/v1/certificates/{id}"), id).await
    }
}

impl CertificateApi for HttpCertificateApi {
    fn submit<'a>(
        &'a self,
        request: &'a IssuanceRequest,
    ) -> BoxFuture<'a, Result<SubmitResponse, ApiError>> {
        Box::pin(self.submit_impl(request))
    }

    fn request_status<'a>(
        &'a self,
        request_id: &'a str,
    ) -> BoxFuture<'a, Result<StatusResponse, ApiError>> {
        Box::pin(self.request_status_impl(request_id))
    }

    fn certificate_detail<'a>(
        &'a self,
        certificate_id: &'a str,
    ) -> BoxFuture<'a, Result<CertificateDetail, ApiError>> {
        Box::pin(self.certificate_detail_impl(certificate_id))
    }
}

async fn handle_json_response<T: DeserializeOwned>(
    resp: reqwest::Response,
    id: &str,
) -> Result<T, ApiError> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await.map_err(map_err)?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    } else if status == reqwest::StatusCode::NOT_FOUND {
        Err(ApiError::NotFound(id.to_string()))
    } else {
        let body = resp.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(err) => err.error,
            Err(_) => body,
        };
        Err(ApiError::Rejected { status: status.as_u16(), message })
    }
}

fn map_err(e: reqwest::Error) -> ApiError {
    if e.is_decode() { ApiError::Decode(e.to_string()) } else { ApiError::Transport(e.to_string()) }
}

/// Identifiers are interpolated into URL paths verbatim.
fn path_segment(id: &str) -> Result<&str, ApiError> {
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(ApiError::Malformed(format!("invalid identifier '{id}'")));
    }
    Ok(id)
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueBody<'a> {
    profile_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    csr: Option<&'a str>,
    #[serde(flatten)]
    attributes: Option<AttributesBody<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttributesBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    common_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organizational_unit: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    locality: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    province: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    alt_names: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    key_usages: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    key_algorithm: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signature_algorithm: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl_seconds: Option<u64>,
}

impl<'a> IssueBody<'a> {
    fn from_request(request: &'a IssuanceRequest) -> Self {
        match &request.mode {
            RequestMode::Csr(csr) => {
                Self { profile_id: &request.profile_id, csr: Some(csr.as_str()), attributes: None }
            }
            RequestMode::Attributes(attrs) => Self {
                profile_id: &request.profile_id,
                csr: None,
                attributes: Some(AttributesBody::from(attrs)),
            },
        }
    }
}

impl<'a> From<&'a SubjectAttributes> for AttributesBody<'a> {
    fn from(attrs: &'a SubjectAttributes) -> Self {
        Self {
            common_name: attrs.common_name.as_deref(),
            organization: attrs.organization.as_deref(),
            organizational_unit: attrs.organizational_unit.as_deref(),
            country: attrs.country.as_deref(),
            locality: attrs.locality.as_deref(),
            province: attrs.province.as_deref(),
            alt_names: &attrs.alt_names,
            key_usages: &attrs.key_usages,
            key_algorithm: attrs.key_algorithm.as_deref(),
            signature_algorithm: attrs.signature_algorithm.as_deref(),
            ttl_seconds: attrs.ttl.map(|ttl| ttl.as_secs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::Router;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use serde_json::{Value, json};
    use yare::parameterized;

    use super::*;

    const TOKEN: &str = "s3cret";

    async fn serve(router: Router) -> String {
        crate::env::init_test_defaults();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{addr}/")
    }

    fn authorized(headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {TOKEN}");
        headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(expected.as_str())
    }

    fn backend() -> Router {
        Router::new()
            .route(
                "/v1/certificates/requests",
                post(|headers: HeaderMap, axum::Json(body): axum::Json<Value>| async move {
                    if !authorized(&headers) {
                        let body = json!({"error": "bad token"});
                        return (StatusCode::UNAUTHORIZED, axum::Json(body));
                    }
                    let profile = body["profileId"].as_str().unwrap_or_default();
                    let body = json!({"requestId": format!("req-{profile}")});
                    (StatusCode::ACCEPTED, axum::Json(body))
                }),
            )
            .route(
                "/v1/certificates/requests/{id}",
                get(|Path(id): Path<String>| async move {
                    match id.as_str() {
                        "missing" => (StatusCode::NOT_FOUND, String::new()),
                        "garbled" => (StatusCode::OK, "not json".to_string()),
                        _ => (
                            StatusCode::OK,
                            json!({
                                "status": "ISSUED",
                                "certificateId": "cert-1",
                                "certificate": "-----BEGIN CERTIFICATE-----",
                            })
                            .to_string(),
                        ),
                    }
                }),
            )
            .route(
                "/v1/certificates/{id}",
                get(|Path(id): Path<String>| async move {
                    match id.as_str() {
                        "broken" => (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            json!({"error": "CA unreachable"}).to_string(),
                        ),
                        "plain" => (StatusCode::SERVICE_UNAVAILABLE, "try later".to_string()),
                        _ => (
                            StatusCode::OK,
                            json!({
                                "commonName": "a.example.com",
                                "altNames": "a.example.com, b.example.com",
                                "notAfter": "2027-01-01T00:00:00Z",
                            })
                            .to_string(),
                        ),
                    }
                }),
            )
    }

    async fn client(token: Option<&str>) -> HttpCertificateApi {
        let base_url = serve(backend()).await;
        HttpCertificateApi::new(HttpConfig { base_url, token: token.map(String::from) })
    }

    #[tokio::test]
    async fn submit_returns_request_id() {
        let api = client(Some(TOKEN)).await;
        let request = IssuanceRequest::csr("web", "-----BEGIN CERTIFICATE REQUEST-----");

        let resp = api.submit(&request).await.unwrap();
        assert_eq!(resp.request_id.as_deref(), Some("req-web"));
        assert_eq!(resp.certificate_id, None);
    }

    #[tokio::test]
    async fn submit_without_token_is_rejected_with_backend_message() {
        let api = client(None).await;
        let request = IssuanceRequest::csr("web", "csr");

        let err = api.submit(&request).await.unwrap_err();
        assert_eq!(err, ApiError::Rejected { status: 401, message: "bad token".into() });
    }

    #[tokio::test]
    async fn status_decodes_camel_case() {
        let api = client(Some(TOKEN)).await;

        let resp = api.request_status("req-1").await.unwrap();
        assert_eq!(resp.status, "ISSUED");
        assert_eq!(resp.certificate_id.as_deref(), Some("cert-1"));
        assert!(resp.looks_issued());
        assert_eq!(resp.private_key, None);
    }

    #[tokio::test]
    async fn detail_decodes_alt_names() {
        let api = client(Some(TOKEN)).await;

        let detail = api.certificate_detail("cert-1").await.unwrap();
        assert_eq!(detail.common_name.as_deref(), Some("a.example.com"));
        assert_eq!(
            crate::alt_names::parse_alt_names(detail.alt_names.as_ref()),
            vec!["a.example.com", "b.example.com"]
        );
        assert_eq!(detail.not_before, None);
    }

    #[parameterized(
        not_found = { "missing", ApiError::NotFound("missing".into()) },
        invalid_id = { "a/b", ApiError::Malformed("invalid identifier 'a/b'".into()) },
        empty_id = { "", ApiError::Malformed("invalid identifier ''".into()) },
    )]
    #[test_macro(tokio::test)]
    async fn status_errors(id: &str, expected: ApiError) {
        let api = client(Some(TOKEN)).await;
        assert_eq!(api.request_status(id).await.unwrap_err(), expected);
    }

    #[tokio::test]
    async fn status_with_garbled_body_is_decode_error() {
        let api = client(Some(TOKEN)).await;
        let err = api.request_status("garbled").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)), "got {err:?}");
    }

    #[parameterized(
        json_error = { "broken", 500, "CA unreachable" },
        plain_text = { "plain", 503, "try later" },
    )]
    #[test_macro(tokio::test)]
    async fn detail_rejections(id: &str, status: u16, message: &str) {
        let api = client(Some(TOKEN)).await;
        let err = api.certificate_detail(id).await.unwrap_err();
        assert_eq!(err, ApiError::Rejected { status, message: message.into() });
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        crate::env::init_test_defaults();
        let api = HttpCertificateApi::new(HttpConfig {
            base_url: format!("http://{addr}"),
            token: None,
        });
        let err = api.request_status("req-1").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    }

    #[test]
    fn csr_body_omits_attributes() {
        let request = IssuanceRequest::csr("web", "CSR");
        let body = serde_json::to_value(IssueBody::from_request(&request)).unwrap();
        assert_eq!(body, json!({"profileId": "web", "csr": "CSR"}));
    }

    #[test]
    fn attribute_body_is_camel_case_and_sparse() {
        let request = IssuanceRequest::attributes(
            "web",
            SubjectAttributes {
                common_name: Some("a.example.com".into()),
                alt_names: vec!["b.example.com".into()],
                key_algorithm: Some("EC_P256".into()),
                ttl: Some(Duration::from_secs(86400)),
                ..Default::default()
            },
        );
        let body = serde_json::to_value(IssueBody::from_request(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "profileId": "web",
                "commonName": "a.example.com",
                "altNames": ["b.example.com"],
                "keyAlgorithm": "EC_P256",
                "ttlSeconds": 86400,
            })
        );
    }
}
