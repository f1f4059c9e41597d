#![warn(missing_docs)]
//! # chemviz-session
//!
//! ## Purpose
//! Implements the single-operator session state machine and token
//! persistence for `chemviz`.
//!
//! ## Responsibilities
//! - Model the `Unauthenticated`/`Authenticated` phases with explicit legal
//!   transitions.
//! - Persist the submitted API token through an injectable [`TokenStore`].
//! - Hold the current file selection, summary, history, and the
//!   one-upload-in-flight guard.
//!
//! ## Data flow
//! Operator submits a token -> [`Session::submit_token`] persists it and
//! enters `Authenticated` -> file selection and upload gating run against the
//! session -> a successful upload installs a new summary and replaces
//! history.
//!
//! ## Ownership and lifetimes
//! The session owns all of its state (`String`/`Vec` values) so transports
//! and the report engine never borrow from it across suspension points.
//!
//! ## Error model
//! Illegal transitions and store failures surface as [`SessionError`];
//! every error leaves the session in its prior valid state.
//!
//! ## Security and privacy notes
//! Token values are never logged by this crate. The persisted slot holds the
//! token verbatim; protecting the backing file is the host's concern.
//!
//! ## Example
//! ```rust
//! use chemviz_session::{InMemoryTokenStore, Session, SessionPhase};
//!
//! let store = InMemoryTokenStore::default();
//! let mut session = Session::new();
//! session.submit_token("abc123", &store).unwrap();
//! assert_eq!(session.phase(), SessionPhase::Authenticated);
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chemviz_core::{HistoryItem, Summary};
use thiserror::Error;

/// Key-value slot name for the persisted API token.
pub const TOKEN_STORE_KEY: &str = "apiToken";

/// Client-local persistent storage for the API token.
///
/// Read once at startup and written on every successful token submission.
pub trait TokenStore: Send + Sync {
    /// Loads the persisted token, if any.
    ///
    /// # Errors
    /// Returns [`SessionError::Store`] when the backing storage is unreadable.
    fn load(&self) -> Result<Option<String>, SessionError>;

    /// Persists the token for future process start-ups.
    ///
    /// # Errors
    /// Returns [`SessionError::Store`] when the backing storage is unwritable.
    fn save(&self, token: &str) -> Result<(), SessionError>;
}

/// Volatile token store for tests and ephemeral shells.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| SessionError::Store("token slot lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| SessionError::Store("token slot lock poisoned".to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }
}

/// File-backed token store holding a single JSON object with the
/// [`TOKEN_STORE_KEY`] slot.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(SessionError::Store(format!(
                    "token store read failed: {error}"
                )));
            }
        };

        let parsed: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|error| SessionError::Store(format!("token store decode failed: {error}")))?;

        Ok(parsed
            .get(TOKEN_STORE_KEY)
            .and_then(|value| value.as_str())
            .map(|token| token.to_string()))
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        let document = serde_json::json!({ TOKEN_STORE_KEY: token });
        let encoded = serde_json::to_string_pretty(&document)
            .map_err(|error| SessionError::Store(format!("token store encode failed: {error}")))?;

        fs::write(&self.path, encoded)
            .map_err(|error| SessionError::Store(format!("token store write failed: {error}")))
    }
}

/// Session phases with explicit legal transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No token submitted yet, or the operator forced re-authentication.
    Unauthenticated,
    /// A non-blank token is held; protected operations are permitted.
    Authenticated,
}

/// Spreadsheet file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name as shown to the operator and sent to the server.
    pub name: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
}

impl SelectedFile {
    /// Creates a selected-file handle.
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

/// Single mutable state container for the running client.
///
/// One instance exists for the lifetime of the UI. All mutation goes through
/// the named transitions below; reads go through accessor methods so the
/// phase/token invariant cannot be broken from outside.
#[derive(Debug)]
pub struct Session {
    phase: SessionPhase,
    token: Option<String>,
    selected_file: Option<SelectedFile>,
    current_summary: Option<Summary>,
    history: Vec<HistoryItem>,
    upload_in_progress: bool,
}

impl Session {
    /// Creates a session in the initial `Unauthenticated` phase.
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            token: None,
            selected_file: None,
            current_summary: None,
            history: Vec::new(),
            upload_in_progress: false,
        }
    }

    /// Restores a session from persisted storage at process start.
    ///
    /// When a previously persisted token exists the session starts directly
    /// in `Authenticated` with that token. No backend validation happens
    /// here; the first request using the token validates it implicitly.
    ///
    /// # Errors
    /// Returns [`SessionError::Store`] when the store cannot be read.
    pub fn restore(store: &dyn TokenStore) -> Result<Self, SessionError> {
        let mut session = Self::new();
        if let Some(token) = store.load()?
            && !token.trim().is_empty()
        {
            session.token = Some(token);
            session.phase = SessionPhase::Authenticated;
        }
        Ok(session)
    }

    /// Returns the current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Returns `true` while the session is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }

    /// Returns the held token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the current file selection, if any.
    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    /// Returns the current summary, if an upload succeeded since the last
    /// reset.
    pub fn current_summary(&self) -> Option<&Summary> {
        self.current_summary.as_ref()
    }

    /// Returns the history list in server order.
    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    /// Returns `true` while an upload is in flight.
    pub fn upload_in_progress(&self) -> bool {
        self.upload_in_progress
    }

    /// Applies the submit-token transition.
    ///
    /// A non-blank value is trimmed, persisted through `store`, and moves the
    /// session to `Authenticated`. Entering `Authenticated` obliges the
    /// caller to refresh history.
    ///
    /// # Errors
    /// Returns [`SessionError::BlankToken`] for blank input (phase
    /// unchanged). Returns [`SessionError::Store`] when persistence fails; in
    /// that case the phase is also left unchanged.
    pub fn submit_token(
        &mut self,
        raw: &str,
        store: &dyn TokenStore,
    ) -> Result<(), SessionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SessionError::BlankToken);
        }

        store.save(trimmed)?;
        self.token = Some(trimmed.to_string());
        self.phase = SessionPhase::Authenticated;
        Ok(())
    }

    /// Applies the explicit re-authenticate transition.
    ///
    /// Forces `Authenticated -> Unauthenticated` and tears down session
    /// state: in-memory token, file selection, current summary, and history
    /// are cleared. The persisted token slot is deliberately left intact so
    /// the operator can resubmit the same value.
    pub fn reauthenticate(&mut self) {
        self.phase = SessionPhase::Unauthenticated;
        self.token = None;
        self.selected_file = None;
        self.current_summary = None;
        self.history.clear();
        self.upload_in_progress = false;
    }

    /// Sets the file selection. Permitted only while `Authenticated`; has no
    /// other side effect.
    ///
    /// # Errors
    /// Returns [`SessionError::NotAuthenticated`] outside the
    /// `Authenticated` phase.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), SessionError> {
        if !self.is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }
        self.selected_file = Some(file);
        Ok(())
    }

    /// Returns `true` when an upload may be triggered: a file is selected, a
    /// token is held, and no upload is already in flight.
    pub fn can_trigger_upload(&self) -> bool {
        self.selected_file.is_some()
            && self.token.as_deref().is_some_and(|token| !token.trim().is_empty())
            && !self.upload_in_progress
    }

    /// Marks an upload as in flight.
    ///
    /// # Errors
    /// Returns [`SessionError::UploadInFlight`] when one is already pending;
    /// a second upload is rejected, not queued.
    pub fn begin_upload(&mut self) -> Result<(), SessionError> {
        if self.upload_in_progress {
            return Err(SessionError::UploadInFlight);
        }
        self.upload_in_progress = true;
        Ok(())
    }

    /// Clears the in-flight flag. Called on success and failure alike.
    pub fn finish_upload(&mut self) {
        self.upload_in_progress = false;
    }

    /// Installs a new current summary, replacing any prior one entirely.
    pub fn install_summary(&mut self, summary: Summary) {
        self.current_summary = Some(summary);
    }

    /// Replaces the history list wholesale with the server's ordering.
    pub fn replace_history(&mut self, history: Vec<HistoryItem>) {
        self.history = history;
    }

    /// Returns `true` when report export is available.
    pub fn can_export(&self) -> bool {
        self.current_summary.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors produced by session transitions and token persistence.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Submitted token was blank.
    #[error("token must be non-blank")]
    BlankToken,
    /// Operation requires the `Authenticated` phase.
    #[error("operation requires an authenticated session")]
    NotAuthenticated,
    /// A second upload was requested while one is pending.
    #[error("an upload is already in progress")]
    UploadInFlight,
    /// Token store read/write failure.
    #[error("token store failure: {0}")]
    Store(String),
}
