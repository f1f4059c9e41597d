//! Shared fixtures for app integration tests.
//!
//! Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chemviz_session::{InMemoryTokenStore, SelectedFile, Session};
use chemviz_upload::{
    HistoryClient, HistoryError, HistoryTransport, UploadClient, UploadEnvelope, UploadError,
    UploadTransport,
};

/// Upload endpoint used by all test clients.
pub const TEST_UPLOAD_ENDPOINT: &str = "http://127.0.0.1:8000/api/upload/";
/// History endpoint used by all test clients.
pub const TEST_HISTORY_ENDPOINT: &str = "http://127.0.0.1:8000/api/history/";

/// Summary response body for the Pump/Valve fixture.
pub const SUMMARY_BODY: &str =
    "{\"total_count\":3,\"type_distribution\":{\"Pump\":2,\"Valve\":1}}";

/// One recorded upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub endpoint: String,
    pub file_name: String,
    pub bearer_token: String,
}

/// Upload transport that records requests and replays a scripted outcome.
pub struct ScriptedUploadTransport {
    pub calls: Mutex<Vec<RecordedUpload>>,
    pub outcome: Mutex<Result<String, UploadError>>,
}

impl ScriptedUploadTransport {
    /// Creates a transport that answers every request with `body`.
    pub fn replying(body: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            outcome: Mutex::new(Ok(body.to_string())),
        })
    }

    /// Creates a transport that fails every request with `error`.
    pub fn failing(error: UploadError) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            outcome: Mutex::new(Err(error)),
        })
    }

    /// Returns how many requests the transport has seen.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("call lock should work").len()
    }
}

impl UploadTransport for ScriptedUploadTransport {
    fn send(
        &self,
        endpoint: &str,
        envelope: &UploadEnvelope,
        bearer_token: &str,
    ) -> Result<String, UploadError> {
        self.calls
            .lock()
            .expect("call lock should work")
            .push(RecordedUpload {
                endpoint: endpoint.to_string(),
                file_name: envelope.file_name.clone(),
                bearer_token: bearer_token.to_string(),
            });

        match &*self.outcome.lock().expect("outcome lock should work") {
            Ok(body) => Ok(body.clone()),
            Err(UploadError::Transport(message)) => Err(UploadError::Transport(message.clone())),
            Err(UploadError::Status(status)) => Err(UploadError::Status(*status)),
            Err(other) => Err(UploadError::Transport(other.to_string())),
        }
    }
}

/// History transport that records bearer tokens and replays a scripted body.
pub struct ScriptedHistoryTransport {
    pub tokens: Mutex<Vec<String>>,
    pub outcome: Mutex<Result<String, ()>>,
}

impl ScriptedHistoryTransport {
    /// Creates a transport that answers every fetch with `body`.
    pub fn replying(body: &str) -> Arc<Self> {
        Arc::new(Self {
            tokens: Mutex::new(Vec::new()),
            outcome: Mutex::new(Ok(body.to_string())),
        })
    }

    /// Creates a transport that fails every fetch.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            tokens: Mutex::new(Vec::new()),
            outcome: Mutex::new(Err(())),
        })
    }

    /// Returns how many fetches the transport has seen.
    pub fn call_count(&self) -> usize {
        self.tokens.lock().expect("token lock should work").len()
    }
}

impl HistoryTransport for ScriptedHistoryTransport {
    fn fetch(&self, _endpoint: &str, bearer_token: &str) -> Result<String, HistoryError> {
        self.tokens
            .lock()
            .expect("token lock should work")
            .push(bearer_token.to_string());

        match &*self.outcome.lock().expect("outcome lock should work") {
            Ok(body) => Ok(body.clone()),
            Err(()) => Err(HistoryError::Transport("scripted failure".to_string())),
        }
    }
}

/// Builds an upload client over the given transport.
pub fn upload_client(transport: Arc<ScriptedUploadTransport>) -> UploadClient {
    UploadClient::new(TEST_UPLOAD_ENDPOINT, transport).expect("upload client should build")
}

/// Builds a history client over the given transport.
pub fn history_client(transport: Arc<ScriptedHistoryTransport>) -> HistoryClient {
    HistoryClient::new(TEST_HISTORY_ENDPOINT, transport).expect("history client should build")
}

/// Creates an authenticated session with a selected fixture file.
pub fn ready_session(store: &InMemoryTokenStore) -> Session {
    let mut session = Session::new();
    session
        .submit_token("abc123", store)
        .expect("submit should succeed");
    session
        .select_file(SelectedFile::new("plant.csv", b"id,type\n1,Pump\n".to_vec()))
        .expect("select should succeed");
    session
}
