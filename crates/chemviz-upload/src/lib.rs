#![warn(missing_docs)]
//! # chemviz-upload
//!
//! ## Purpose
//! Implements the upload and history clients that talk to the external
//! analysis service.
//!
//! ## Responsibilities
//! - Validate upload/history endpoint policy (path suffix, transport scheme).
//! - Submit file envelopes with a bearer-style token through an injectable
//!   transport abstraction.
//! - Parse responses through the analysis contract before they reach state.
//! - Classify failures so the presentation layer can phrase notifications.
//!
//! ## Data flow
//! Session file selection -> [`UploadClient::upload`] sends an
//! [`UploadEnvelope`] through [`UploadTransport`] -> response body parsed
//! into a [`chemviz_core::Summary`]. [`HistoryClient::fetch_history`]
//! refreshes the server-ordered history list the same way.
//!
//! ## Ownership and lifetimes
//! Envelopes own their file bytes so a failed attempt can be re-triggered
//! manually without re-reading the source file.
//!
//! ## Error model
//! Endpoint violations, transport failures, non-success statuses, and
//! contract violations surface as [`UploadError`]/[`HistoryError`]. No retry
//! happens here; re-triggering is an operator action.
//!
//! ## Security and privacy notes
//! Token values are passed through to transports and never logged. The
//! idempotency key digests file content for traceability only; the client
//! never deduplicates uploads by content.

use std::sync::Arc;

use chemviz_analysis_contract::{
    AnalysisContractError, parse_history_response, parse_summary_response,
};
use chemviz_core::{HistoryItem, Summary};
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

/// Required upload path suffix for v1 of the analysis service.
pub const REQUIRED_UPLOAD_PATH: &str = "/api/upload/";
/// Required history path suffix for v1 of the analysis service.
pub const REQUIRED_HISTORY_PATH: &str = "/api/history/";

/// File payload forwarded to the upload transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEnvelope {
    /// File name as shown to the operator.
    pub file_name: String,
    /// Raw spreadsheet bytes.
    pub content: Vec<u8>,
    /// Stable digest of name and content, for server-side traceability.
    pub idempotency_key: String,
}

impl UploadEnvelope {
    /// Builds an envelope and derives its idempotency key.
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let idempotency_key = idempotency_key_for(&file_name, &content);
        Self {
            file_name,
            content,
            idempotency_key,
        }
    }
}

/// Computes the stable idempotency key for one file payload.
///
/// Identical name and content always produce the same key. The key is a
/// diagnostic aid; the client re-submits identical files without question.
pub fn idempotency_key_for(file_name: &str, content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file_name.as_bytes());
    hasher.update([0]);
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Abstract transport used by the upload client.
///
/// Implementations send the envelope as a binary/multipart payload with the
/// token as a bearer-style credential and return the raw response body.
pub trait UploadTransport: Send + Sync {
    /// Sends one envelope to the upload endpoint.
    ///
    /// # Errors
    /// Returns [`UploadError::Transport`] or [`UploadError::Status`] on
    /// failure.
    fn send(
        &self,
        endpoint: &str,
        envelope: &UploadEnvelope,
        bearer_token: &str,
    ) -> Result<String, UploadError>;
}

/// Abstract transport used by the history client.
pub trait HistoryTransport: Send + Sync {
    /// Fetches the history list body for the given token.
    ///
    /// # Errors
    /// Returns [`HistoryError::Transport`] or [`HistoryError::Status`] on
    /// failure.
    fn fetch(&self, endpoint: &str, bearer_token: &str) -> Result<String, HistoryError>;
}

/// Upload client that validates endpoint policy and executes one submission.
#[derive(Clone)]
pub struct UploadClient {
    endpoint: String,
    transport: Arc<dyn UploadTransport>,
}

impl UploadClient {
    /// Creates a validated upload client.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidEndpoint`] when the URL violates the
    /// endpoint policy.
    pub fn new(
        endpoint: impl Into<String>,
        transport: Arc<dyn UploadTransport>,
    ) -> Result<Self, UploadError> {
        let endpoint = endpoint.into();
        validate_endpoint(&endpoint, REQUIRED_UPLOAD_PATH)
            .map_err(UploadError::InvalidEndpoint)?;
        Ok(Self {
            endpoint,
            transport,
        })
    }

    /// Submits one envelope and parses the response into a summary.
    ///
    /// Re-triggering with the same file re-submits it; nothing is
    /// deduplicated here.
    ///
    /// # Errors
    /// Returns [`UploadError::MissingToken`] for a blank token (no request is
    /// sent). Transport and status failures propagate as-is; malformed
    /// response bodies return [`UploadError::Contract`]. The caller's prior
    /// summary stays untouched on every error path.
    pub fn upload(
        &self,
        envelope: &UploadEnvelope,
        bearer_token: &str,
    ) -> Result<Summary, UploadError> {
        if bearer_token.trim().is_empty() {
            return Err(UploadError::MissingToken);
        }

        let body = self.transport.send(&self.endpoint, envelope, bearer_token)?;
        let summary = parse_summary_response(&body).map_err(UploadError::Contract)?;

        log::info!(
            "upload accepted: file={} key={} total_count={}",
            envelope.file_name,
            &envelope.idempotency_key[..12.min(envelope.idempotency_key.len())],
            summary.total_count
        );
        Ok(summary)
    }

    /// Returns the configured upload endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// History client that validates endpoint policy and fetches the list.
#[derive(Clone)]
pub struct HistoryClient {
    endpoint: String,
    transport: Arc<dyn HistoryTransport>,
}

impl HistoryClient {
    /// Creates a validated history client.
    ///
    /// # Errors
    /// Returns [`HistoryError::InvalidEndpoint`] when the URL violates the
    /// endpoint policy.
    pub fn new(
        endpoint: impl Into<String>,
        transport: Arc<dyn HistoryTransport>,
    ) -> Result<Self, HistoryError> {
        let endpoint = endpoint.into();
        validate_endpoint(&endpoint, REQUIRED_HISTORY_PATH)
            .map_err(HistoryError::InvalidEndpoint)?;
        Ok(Self {
            endpoint,
            transport,
        })
    }

    /// Fetches the server-ordered history list for the given token.
    ///
    /// # Errors
    /// Returns [`HistoryError::MissingToken`] for a blank token (no request
    /// is sent). Transport, status, and contract failures propagate; the
    /// caller keeps its prior list on any error.
    pub fn fetch_history(&self, bearer_token: &str) -> Result<Vec<HistoryItem>, HistoryError> {
        if bearer_token.trim().is_empty() {
            return Err(HistoryError::MissingToken);
        }

        let body = self.transport.fetch(&self.endpoint, bearer_token)?;
        parse_history_response(&body).map_err(HistoryError::Contract)
    }

    /// Returns the configured history endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Validates one analysis-service endpoint against policy.
///
/// # Semantics
/// The path must end with the required v1 suffix. The scheme must be `https`,
/// or `http` only for loopback hosts (the local analysis backend).
///
/// # Errors
/// Returns a human-readable policy violation message.
pub fn validate_endpoint(endpoint: &str, required_path: &str) -> Result<(), String> {
    let parsed =
        Url::parse(endpoint).map_err(|error| format!("invalid endpoint url: {error}"))?;

    match parsed.scheme() {
        "https" => {}
        "http" => {
            let loopback = matches!(parsed.host_str(), Some("127.0.0.1") | Some("localhost"));
            if !loopback {
                return Err("plain http is allowed for loopback hosts only".to_string());
            }
        }
        other => return Err(format!("unsupported endpoint scheme: {other}")),
    }

    if !parsed.path().ends_with(required_path) {
        return Err(format!("endpoint path must end with {required_path}"));
    }

    Ok(())
}

/// Coarse failure class for operator-facing notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// A manual re-trigger may succeed (network fault, server-side error).
    Retriable,
    /// Re-triggering the same request will fail again.
    Permanent,
}

/// Classifies an upload failure for notification phrasing.
pub fn classify_upload_error(error: &UploadError) -> FailureClass {
    match error {
        UploadError::Transport(_) => FailureClass::Retriable,
        UploadError::Status(status) if *status >= 500 => FailureClass::Retriable,
        _ => FailureClass::Permanent,
    }
}

/// Errors produced by the upload client.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Endpoint violates policy.
    #[error("invalid upload endpoint: {0}")]
    InvalidEndpoint(String),
    /// Token is absent or blank; no request was sent.
    #[error("upload requires a non-blank token")]
    MissingToken,
    /// Network-level failure from the transport.
    #[error("upload transport failure: {0}")]
    Transport(String),
    /// Non-success HTTP status from the analysis service.
    #[error("upload rejected with status {0}")]
    Status(u16),
    /// Response body violated the analysis contract.
    #[error("upload response violated contract: {0}")]
    Contract(AnalysisContractError),
}

/// Errors produced by the history client.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Endpoint violates policy.
    #[error("invalid history endpoint: {0}")]
    InvalidEndpoint(String),
    /// Token is absent or blank; no request was sent.
    #[error("history fetch requires a non-blank token")]
    MissingToken,
    /// Network-level failure from the transport.
    #[error("history transport failure: {0}")]
    Transport(String),
    /// Non-success HTTP status from the analysis service.
    #[error("history fetch rejected with status {0}")]
    Status(u16),
    /// Response body violated the analysis contract.
    #[error("history response violated contract: {0}")]
    Contract(AnalysisContractError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for endpoint policy, keys, and classification.

    use super::*;

    struct StaticTransport {
        body: String,
    }

    impl UploadTransport for StaticTransport {
        fn send(
            &self,
            _endpoint: &str,
            _envelope: &UploadEnvelope,
            _bearer_token: &str,
        ) -> Result<String, UploadError> {
            Ok(self.body.clone())
        }
    }

    #[test]
    fn endpoint_policy_accepts_loopback_http_only() {
        validate_endpoint("http://127.0.0.1:8000/api/upload/", REQUIRED_UPLOAD_PATH)
            .expect("loopback http should pass");
        validate_endpoint("https://analysis.example.test/api/upload/", REQUIRED_UPLOAD_PATH)
            .expect("https should pass");
        assert!(
            validate_endpoint("http://analysis.example.test/api/upload/", REQUIRED_UPLOAD_PATH)
                .is_err()
        );
        assert!(
            validate_endpoint("https://analysis.example.test/api/other/", REQUIRED_UPLOAD_PATH)
                .is_err()
        );
    }

    #[test]
    fn idempotency_key_is_stable_and_content_sensitive() {
        let first = idempotency_key_for("plant.csv", b"a,b,c");
        let second = idempotency_key_for("plant.csv", b"a,b,c");
        let changed = idempotency_key_for("plant.csv", b"a,b,d");
        assert_eq!(first, second);
        assert_ne!(first, changed);
    }

    #[test]
    fn blank_token_fails_fast_without_transport_call() {
        let client = UploadClient::new(
            "http://127.0.0.1:8000/api/upload/",
            Arc::new(StaticTransport {
                body: "{}".to_string(),
            }),
        )
        .expect("client should build");

        let envelope = UploadEnvelope::new("plant.csv", vec![1, 2, 3]);
        assert!(matches!(
            client.upload(&envelope, "   "),
            Err(UploadError::MissingToken)
        ));
    }

    #[test]
    fn malformed_body_is_a_contract_error() {
        let client = UploadClient::new(
            "http://127.0.0.1:8000/api/upload/",
            Arc::new(StaticTransport {
                body: "not json".to_string(),
            }),
        )
        .expect("client should build");

        let envelope = UploadEnvelope::new("plant.csv", vec![1]);
        assert!(matches!(
            client.upload(&envelope, "abc123"),
            Err(UploadError::Contract(_))
        ));
    }

    #[test]
    fn classification_distinguishes_transient_and_permanent() {
        assert_eq!(
            classify_upload_error(&UploadError::Status(503)),
            FailureClass::Retriable
        );
        assert_eq!(
            classify_upload_error(&UploadError::Status(401)),
            FailureClass::Permanent
        );
        assert_eq!(
            classify_upload_error(&UploadError::Transport("reset".to_string())),
            FailureClass::Retriable
        );
    }
}
