use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A single certificate issuance request. Built once per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceRequest {
    /// Issuance profile (template) on the backend.
    pub profile_id: String,
    pub mode: RequestMode,
}

/// How the certificate subject and key are supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestMode {
    /// A PEM-encoded CSR; the caller holds the private key.
    Csr(String),
    /// Subject attributes; the backend generates the key pair and returns
    /// the private key alongside the certificate.
    Attributes(SubjectAttributes),
}

/// Attribute-based request fields. All optional; the caller validates that
/// enough of them are set for the chosen profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectAttributes {
    pub common_name: Option<String>,
    pub organization: Option<String>,
    pub organizational_unit: Option<String>,
    pub country: Option<String>,
    pub locality: Option<String>,
    pub province: Option<String>,
    pub alt_names: Vec<String>,
    pub key_usages: Vec<String>,
    pub key_algorithm: Option<String>,
    pub signature_algorithm: Option<String>,
    pub ttl: Option<Duration>,
}

impl IssuanceRequest {
    pub fn csr(profile_id: impl Into<String>, csr_pem: impl Into<String>) -> Self {
        Self { profile_id: profile_id.into(), mode: RequestMode::Csr(csr_pem.into()) }
    }

    pub fn attributes(profile_id: impl Into<String>, attributes: SubjectAttributes) -> Self {
        Self { profile_id: profile_id.into(), mode: RequestMode::Attributes(attributes) }
    }
}

/// An issued certificate, filled in progressively: identity and PEM material
/// first (from the submission or status response), then subject and validity
/// detail from hydration.
///
/// Empty strings mean "not known"; `alt_names: None` means alternative names
/// were never fetched, while `Some(vec![])` means the backend has none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub certificate_id: String,
    pub status: String,
    pub certificate: String,
    pub certificate_chain: String,
    /// Only present for attribute-based issuance.
    pub private_key: String,
    pub serial_number: String,
    pub common_name: String,
    pub key_algorithm: String,
    pub signature_algorithm: String,
    pub alt_names: Option<Vec<String>>,
    pub not_before: String,
    pub not_after: String,
}

/// Classified result of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuanceOutcome {
    /// The backend issued synchronously.
    Immediate(Certificate),
    /// The backend accepted the request; poll this request id.
    Pending(String),
}

/// Status of a pending request as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Pending,
    Issued,
    Failed,
    /// Any status string outside the known vocabulary.
    Unknown,
}

impl PollStatus {
    /// Classify a backend status string, case-insensitively.
    pub fn parse(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "pending" => PollStatus::Pending,
            "issued" => PollStatus::Issued,
            "failed" => PollStatus::Failed,
            _ => PollStatus::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use yare::parameterized;

    use super::*;

    #[parameterized(
        pending = { "pending", PollStatus::Pending },
        issued_upper = { "ISSUED", PollStatus::Issued },
        failed_mixed = { "Failed", PollStatus::Failed },
        padded = { " issued ", PollStatus::Issued },
        revoked = { "revoked", PollStatus::Unknown },
        completed = { "completed", PollStatus::Unknown },
        empty = { "", PollStatus::Unknown },
    )]
    fn parse_status(input: &str, expected: PollStatus) {
        assert_eq!(PollStatus::parse(input), expected);
    }

    #[test]
    fn request_constructors_pick_mode() {
        let csr = IssuanceRequest::csr("web", "-----BEGIN CERTIFICATE REQUEST-----");
        assert!(matches!(csr.mode, RequestMode::Csr(_)));
        assert_eq!(csr.profile_id, "web");

        let attrs = IssuanceRequest::attributes(
            "web",
            SubjectAttributes { common_name: Some("a.example.com".into()), ..Default::default() },
        );
        assert!(matches!(attrs.mode, RequestMode::Attributes(ref a) if a.common_name.is_some()));
    }
}
