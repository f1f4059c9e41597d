//! Integration tests for runtime view projection.

mod common;

use chemviz_app::{app_version, project_runtime_view, trigger_upload};
use chemviz_session::InMemoryTokenStore;
use chemviz_ui::ScreenView;

#[test]
fn runtime_view_projection_tests_reflects_session_state() {
    let store = InMemoryTokenStore::default();
    let upload = common::upload_client(common::ScriptedUploadTransport::replying(
        common::SUMMARY_BODY,
    ));
    let history_body = serde_json::json!([
        {
            "name": "plant.csv",
            "summary": { "total_count": 3, "type_distribution": { "Pump": 2, "Valve": 1 } }
        }
    ]);
    let history = common::history_client(common::ScriptedHistoryTransport::replying(
        &history_body.to_string(),
    ));

    let mut session = common::ready_session(&store);
    trigger_upload(&mut session, &upload, &history).expect("upload should succeed");

    let view = project_runtime_view(&session);
    assert_eq!(view.version, app_version());
    assert_eq!(view.screen, ScreenView::Workspace);
    assert_eq!(view.summary_total, Some(3));
    assert!(view.can_export);
    assert_eq!(view.history.len(), 1);
    assert_eq!(view.history[0].items_detected, 3);
}
