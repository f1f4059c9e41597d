#![warn(missing_docs)]
//! # chemviz-app binary
//!
//! Headless shell entry point for chemviz. Restores the persisted session,
//! prints the projected runtime view, and exits. The interactive widget
//! shell is a separate host concern; everything it needs is exposed by
//! [`chemviz_app`].

use std::sync::Arc;

use chemviz_app::{DEFAULT_HISTORY_ENDPOINT, app_version, project_runtime_view, restore_session};
use chemviz_session::FileTokenStore;
use chemviz_ui::ScreenView;
use chemviz_upload::{HistoryClient, HistoryError, HistoryTransport};

/// Transport placeholder used until an HTTP binding is wired in by the host
/// shell. Every fetch reports the backend as unreachable, which the
/// orchestrator treats as a silent, non-fatal history failure.
#[derive(Debug, Default)]
struct OfflineHistoryTransport;

impl HistoryTransport for OfflineHistoryTransport {
    fn fetch(&self, _endpoint: &str, _bearer_token: &str) -> Result<String, HistoryError> {
        Err(HistoryError::Transport(
            "analysis backend is not reachable from the headless shell".to_string(),
        ))
    }
}

/// Shell entry point.
fn main() {
    env_logger::init();

    let history_client = match HistoryClient::new(
        DEFAULT_HISTORY_ENDPOINT,
        Arc::new(OfflineHistoryTransport),
    ) {
        Ok(client) => client,
        Err(error) => {
            eprintln!("failed to configure history client: {error}");
            std::process::exit(1);
        }
    };

    let store = FileTokenStore::new("chemviz-credentials.json");
    let session = match restore_session(&store, &history_client) {
        Ok(session) => session,
        Err(error) => {
            eprintln!("failed to restore session: {error}");
            std::process::exit(1);
        }
    };

    let view = project_runtime_view(&session);
    println!("chemviz-app {}", app_version());
    match view.screen {
        ScreenView::TokenEntry => println!("state: unauthenticated (token entry)"),
        ScreenView::Workspace => println!(
            "state: authenticated, {} history entries, export {}",
            view.history.len(),
            if view.can_export { "ready" } else { "unavailable" }
        ),
    }
}
