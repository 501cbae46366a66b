#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod alt_names;
pub mod api;
mod cancel;
pub mod env;
mod error;
mod hydrate;
mod issue;
mod poll;
mod submit;
mod types;

pub use alt_names::{AltNamesInput, TypedAltName, parse_alt_names};
pub use api::http::{HttpCertificateApi, HttpConfig};
pub use api::{
    ApiError, BoxFuture, CertificateApi, CertificateDetail, StatusResponse, SubmitResponse,
};
pub use cancel::CancelSignal;
pub use error::{IssueError, Result};
pub use hydrate::hydrate;
pub use issue::Issuer;
pub use poll::{POLL_INTERVAL, poll};
pub use submit::submit;
pub use types::{
    Certificate, IssuanceOutcome, IssuanceRequest, PollStatus, RequestMode, SubjectAttributes,
};
