//! Integration tests for the authenticate transition and its history side
//! effect.

mod common;

use chemviz_app::authenticate;
use chemviz_session::{InMemoryTokenStore, Session, SessionPhase};

#[test]
fn auth_state_machine_tests_non_blank_token_authenticates_and_fetches_history() {
    let store = InMemoryTokenStore::default();
    let transport = common::ScriptedHistoryTransport::replying("[]");
    let client = common::history_client(transport.clone());

    let mut session = Session::new();
    authenticate(&mut session, &store, "abc123", &client).expect("authenticate should succeed");

    assert_eq!(session.phase(), SessionPhase::Authenticated);
    let tokens = transport.tokens.lock().expect("token lock should work");
    assert_eq!(tokens.as_slice(), ["abc123"]);
}

#[test]
fn auth_state_machine_tests_blank_token_stays_unauthenticated() {
    let store = InMemoryTokenStore::default();
    let transport = common::ScriptedHistoryTransport::replying("[]");
    let client = common::history_client(transport.clone());

    let mut session = Session::new();
    assert!(authenticate(&mut session, &store, "   ", &client).is_err());
    assert_eq!(session.phase(), SessionPhase::Unauthenticated);
    assert_eq!(transport.call_count(), 0);
}
