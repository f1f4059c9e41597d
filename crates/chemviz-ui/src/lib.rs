#![warn(missing_docs)]
//! # chemviz-ui
//!
//! ## Purpose
//! Projects session state into a display-safe view model.
//!
//! ## Responsibilities
//! - Decide which screen is shown (token entry vs. workspace).
//! - Expose the gates that enable the upload and export actions.
//! - Flatten history entries into the list rows the shell renders.
//!
//! ## Data flow
//! Named session transitions mutate [`chemviz_session::Session`];
//! [`project_view`] is a pure function from that state to the rendered view,
//! so no UI runtime is involved in the state machine itself.
//!
//! ## Ownership and lifetimes
//! The view model owns all of its strings so render code never borrows
//! session internals.
//!
//! ## Error model
//! Projection is total; invalid combinations are prevented upstream by the
//! session's transition guards.
//!
//! ## Security and privacy notes
//! The view model intentionally excludes the token value and file bytes.

use chemviz_session::Session;

/// Screen selection derived from the session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenView {
    /// Token entry form is shown.
    TokenEntry,
    /// Main workspace (upload, summary, history) is shown.
    Workspace,
}

/// One rendered history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    /// Uploaded file name.
    pub name: String,
    /// Items detected for that upload; absent summaries render as zero.
    pub items_detected: u64,
}

/// Display-safe snapshot of the running client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Which screen the shell shows.
    pub screen: ScreenView,
    /// Selected file name, when one is chosen.
    pub selected_file: Option<String>,
    /// `true` while an upload is in flight (the action shows as busy).
    pub upload_in_progress: bool,
    /// `true` when the upload action is enabled.
    pub can_upload: bool,
    /// `true` when the export action is enabled.
    pub can_export: bool,
    /// Total count of the current summary, when one exists.
    pub summary_total: Option<u64>,
    /// Rendered history rows in server order.
    pub history: Vec<HistoryRow>,
}

/// Projects the session into its view model.
pub fn project_view(session: &Session, version: impl Into<String>) -> ViewModel {
    let screen = if session.is_authenticated() {
        ScreenView::Workspace
    } else {
        ScreenView::TokenEntry
    };

    let history = session
        .history()
        .iter()
        .map(|item| HistoryRow {
            name: item.name.clone(),
            items_detected: item
                .summary
                .as_ref()
                .map(|summary| summary.total_count)
                .unwrap_or(0),
        })
        .collect();

    ViewModel {
        version: version.into(),
        screen,
        selected_file: session
            .selected_file()
            .map(|file| file.name.clone()),
        upload_in_progress: session.upload_in_progress(),
        can_upload: session.can_trigger_upload(),
        can_export: session.can_export(),
        summary_total: session.current_summary().map(|summary| summary.total_count),
        history,
    }
}
