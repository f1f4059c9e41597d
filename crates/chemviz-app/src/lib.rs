#![warn(missing_docs)]
//! # chemviz-app
//!
//! ## Purpose
//! Orchestrates session, upload, history, chart, and report subsystems for
//! `chemviz`.
//!
//! ## Responsibilities
//! - Drive the authenticate/restore flow, including the history refresh that
//!   follows every entry into the authenticated phase.
//! - Gate and execute the upload trigger with the one-in-flight guard.
//! - Keep history refresh failures silent and upload failures loud.
//! - Run the export flow: chart capability, pagination, timestamped save.
//!
//! ## Data flow
//! Token submission -> session transition + history refresh. File selection +
//! upload trigger -> upload client -> summary installation -> history
//! refresh. Export -> chart surface -> pagination engine -> report sink.
//!
//! ## Ownership and lifetimes
//! Orchestration functions borrow the session mutably for exactly one
//! transition at a time; transports and sinks are shared, immutable
//! collaborators.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Gated no-ops are not
//! errors; they are reported as [`UploadTrigger::Skipped`] values.
//!
//! ## Security and privacy notes
//! Diagnostics pass through [`redact_token`] so bearer tokens never reach
//! the log.

use chemviz_chart::ChartSurface;
use chemviz_report::{PageGeometry, ReportError, ReportSink, paginate, report_file_name};
use chemviz_session::{Session, SessionError, TokenStore};
use chemviz_ui::{ViewModel, project_view};
use chemviz_upload::{HistoryClient, UploadClient, UploadEnvelope, UploadError};
use thiserror::Error;
use time::OffsetDateTime;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("CHEMVIZ_VERSION");

/// Default upload endpoint of the local analysis backend.
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "http://127.0.0.1:8000/api/upload/";
/// Default history endpoint of the local analysis backend.
pub const DEFAULT_HISTORY_ENDPOINT: &str = "http://127.0.0.1:8000/api/history/";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Outcome of one upload trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTrigger {
    /// The trigger was a gated no-op; no request was issued.
    Skipped(SkipReason),
    /// The upload succeeded and the new summary is installed.
    Completed {
        /// Total count reported by the freshly installed summary.
        total_count: u64,
    },
}

/// Why an upload trigger was a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No file is selected.
    NoFileSelected,
    /// No non-blank token is held.
    MissingToken,
    /// An upload is already in flight; the request is rejected, not queued.
    UploadInFlight,
}

/// Outcome of one report export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    /// File name the document was saved under.
    pub file_name: String,
    /// Number of pages in the exported document.
    pub page_count: usize,
}

/// Restores the session from persisted storage at process start.
///
/// When a persisted token exists the session starts authenticated and
/// history is refreshed immediately, mirroring the submit path.
///
/// # Errors
/// Returns [`AppError::Session`] when the token store cannot be read.
pub fn restore_session(
    store: &dyn TokenStore,
    history_client: &HistoryClient,
) -> Result<Session, AppError> {
    let mut session = Session::restore(store)?;
    if session.is_authenticated() {
        refresh_history(&mut session, history_client);
    }
    Ok(session)
}

/// Applies the submit-token transition and the history refresh that follows
/// entering the authenticated phase.
///
/// # Errors
/// Returns [`AppError::Session`] for blank tokens or store failures; the
/// session phase is unchanged in that case.
pub fn authenticate(
    session: &mut Session,
    store: &dyn TokenStore,
    raw_token: &str,
    history_client: &HistoryClient,
) -> Result<(), AppError> {
    session.submit_token(raw_token, store)?;
    log::info!("session authenticated");
    refresh_history(session, history_client);
    Ok(())
}

/// Refreshes the history list for the current token.
///
/// On success the list is replaced wholesale with the server's order. On
/// failure the prior list is kept and the failure is logged silently;
/// history is auxiliary and never blocks the operator. A session without a
/// token makes this a no-op.
pub fn refresh_history(session: &mut Session, client: &HistoryClient) {
    let Some(token) = session.token().map(|token| token.to_string()) else {
        return;
    };

    match client.fetch_history(&token) {
        Ok(history) => session.replace_history(history),
        Err(error) => {
            log::warn!(
                "history refresh failed: {}",
                redact_token(&error.to_string(), &token)
            );
        }
    }
}

/// Executes one upload trigger against the session.
///
/// # Semantics
/// A missing file, missing token, or in-flight upload makes the trigger a
/// no-op (`Skipped`; no request is issued and the in-flight flag is
/// untouched). Otherwise the flag is set for the duration of the request and
/// cleared regardless of outcome. On success the parsed summary replaces the
/// current one entirely and history is refreshed exactly once. On failure
/// the prior summary is untouched and the error is returned for blocking
/// presentation.
///
/// # Errors
/// Returns [`AppError::Upload`] for transport, status, and contract
/// failures. No automatic retry happens; re-triggering is manual.
pub fn trigger_upload(
    session: &mut Session,
    upload_client: &UploadClient,
    history_client: &HistoryClient,
) -> Result<UploadTrigger, AppError> {
    let (file_name, content) = match session.selected_file() {
        Some(file) => (file.name.clone(), file.content.clone()),
        None => return Ok(UploadTrigger::Skipped(SkipReason::NoFileSelected)),
    };
    let token = match session.token() {
        Some(token) if !token.trim().is_empty() => token.to_string(),
        _ => return Ok(UploadTrigger::Skipped(SkipReason::MissingToken)),
    };
    if session.upload_in_progress() {
        return Ok(UploadTrigger::Skipped(SkipReason::UploadInFlight));
    }

    let envelope = UploadEnvelope::new(file_name, content);
    session.begin_upload()?;
    let result = upload_client.upload(&envelope, &token);
    session.finish_upload();

    match result {
        Ok(summary) => {
            let total_count = summary.total_count;
            session.install_summary(summary);
            refresh_history(session, history_client);
            Ok(UploadTrigger::Completed { total_count })
        }
        Err(error) => {
            log::error!(
                "upload failed: {}",
                redact_token(&error.to_string(), &token)
            );
            Err(AppError::Upload(error))
        }
    }
}

/// Runs the export flow for the current summary.
///
/// The chart surface may report no raster; pagination then proceeds without
/// the image. The document is saved under a name derived from `now_ms`.
///
/// # Errors
/// Returns [`AppError::ExportUnavailable`] when no summary exists (the UI
/// gate normally prevents this call) and [`AppError::Report`] for geometry,
/// codec, or sink failures.
pub fn export_report(
    session: &Session,
    surface: &dyn ChartSurface,
    geometry: &PageGeometry,
    now_ms: u64,
    sink: &dyn ReportSink,
) -> Result<ExportOutcome, AppError> {
    let Some(summary) = session.current_summary() else {
        return Err(AppError::ExportUnavailable);
    };

    let chart = surface.render(summary);
    if chart.is_none() {
        log::info!("no chart surface available; exporting without chart image");
    }

    let generated_at = format_generated_at(now_ms);
    let document = paginate(summary, chart.as_ref(), &generated_at, geometry)?;
    let file_name = report_file_name(now_ms);
    sink.save(&file_name, &document)?;

    log::info!(
        "report exported: file={file_name} pages={}",
        document.page_count()
    );
    Ok(ExportOutcome {
        file_name,
        page_count: document.page_count(),
    })
}

/// Projects the session into the view model shown by the shell.
pub fn project_runtime_view(session: &Session) -> ViewModel {
    project_view(session, app_version())
}

/// Formats a unix-epoch-millisecond timestamp for the report header.
pub fn format_generated_at(unix_ms: u64) -> String {
    let seconds = (unix_ms / 1_000) as i64;
    let stamp = OffsetDateTime::from_unix_timestamp(seconds)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
        stamp.year(),
        stamp.month() as u8,
        stamp.day(),
        stamp.hour(),
        stamp.minute(),
        stamp.second()
    )
}

/// Strips the bearer token from a diagnostic message.
pub fn redact_token(message: &str, token: &str) -> String {
    if token.trim().is_empty() {
        return message.to_string();
    }
    message.replace(token, "<redacted>")
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session transition or token store error.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    /// Upload pipeline error.
    #[error("upload error: {0}")]
    Upload(UploadError),
    /// Report engine or sink error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),
    /// Export requested without a current summary.
    #[error("export requires a current summary")]
    ExportUnavailable,
}
