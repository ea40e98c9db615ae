use std::sync::{Arc, Mutex};

use career_chat_model::{Role, User};
use career_chat_test_backend::{FakeBackend, PresetReply};
use tokio::sync::watch;

use super::*;
use crate::session::{TURN_FAILED_MESSAGE, WELCOME_MESSAGE};
use crate::{BackendClient, ErrorKind, UserContext};

fn signed_in() -> UserContext {
    UserContext::signed_in(User {
        id: "u-1".to_owned(),
        email: "priya@example.com".to_owned(),
        name: Some("Priya".to_owned()),
    })
}

/// Builds a session over the backend, and returns a counter of finished
/// turns along with it.
fn session(
    backend: &FakeBackend,
    user: UserContext,
) -> (ChatSession, watch::Receiver<usize>) {
    let (idle_tx, idle_rx) = watch::channel(0);
    let session =
        ChatSessionBuilder::new(BackendClient::new(backend.clone()), user)
            .on_idle(move || {
                idle_tx.send_modify(|n| *n += 1);
            })
            .build();
    (session, idle_rx)
}

async fn wait_for_turns(idle_rx: &mut watch::Receiver<usize>, turns: usize) {
    idle_rx.wait_for(|n| *n >= turns).await.unwrap();
}

#[tokio::test]
async fn test_conversation() {
    let backend = FakeBackend::default();
    backend.add_reply(
        PresetReply::with_text("I found 3 job opportunities.")
            .with_intent("DYNAMIC-JOB_LISTINGS", "Job search: tech")
            .with_conversation_id("c-1"),
    );
    backend.add_reply(PresetReply::with_text("Here are some events."));

    let (session, mut idle_rx) = session(&backend, signed_in());
    session.submit("Any software developer jobs?").await.unwrap();
    wait_for_turns(&mut idle_rx, 1).await;
    session.submit("And events?").await.unwrap();
    wait_for_turns(&mut idle_rx, 2).await;

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.stage, Stage::Idle);
    assert_eq!(snapshot.session_id.as_deref(), Some("c-1"));
    let contents: Vec<_> = snapshot
        .messages
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .collect();
    assert_eq!(
        contents,
        [
            (Role::Assistant, WELCOME_MESSAGE),
            (Role::User, "Any software developer jobs?"),
            (Role::Assistant, "I found 3 job opportunities."),
            (Role::User, "And events?"),
            (Role::Assistant, "Here are some events."),
        ]
    );

    let requests = backend.turn_requests();
    assert_eq!(requests[0].session_id, None);
    assert_eq!(requests[1].session_id.as_deref(), Some("c-1"));
}

#[tokio::test]
async fn test_submit_while_sending() {
    let backend = FakeBackend::default();
    let gate = backend.hold_turns();
    let (session, mut idle_rx) = session(&backend, signed_in());

    session.submit("first").await.unwrap();
    let err = session.submit("second").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationRejected);

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.stage, Stage::Sending);
    assert_eq!(snapshot.messages.len(), 2);

    gate.release();
    wait_for_turns(&mut idle_rx, 1).await;

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.stage, Stage::Idle);
    assert_eq!(snapshot.messages.len(), 3);
    assert_eq!(snapshot.messages[2].content, "You asked: first");
    assert_eq!(backend.calls().submit_turn, 1);
}

#[tokio::test]
async fn test_failed_turn() {
    let backend = FakeBackend::default();
    backend.add_failure("Service unavailable");
    let (session, mut idle_rx) = session(&backend, signed_in());

    session.submit("Any mentorship programs?").await.unwrap();
    wait_for_turns(&mut idle_rx, 1).await;

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.stage, Stage::Idle);
    assert_eq!(snapshot.session_id, None);
    assert_eq!(snapshot.messages.len(), 3);
    assert_eq!(snapshot.messages[2].content, TURN_FAILED_MESSAGE);

    // The session recovers on the next turn.
    session.submit("Retry").await.unwrap();
    wait_for_turns(&mut idle_rx, 2).await;
    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.messages.len(), 5);
    assert_eq!(snapshot.messages[4].content, "You asked: Retry");
    assert!(snapshot.session_id.is_some());
}

#[tokio::test]
async fn test_rejected_submissions() {
    let backend = FakeBackend::default();
    let (session, _) = session(&backend, UserContext::signed_out());

    let err = session.submit("hello").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationRejected);

    let (session, _) = self::session(&backend, signed_in());
    let err = session.submit("   ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationRejected);

    assert_eq!(session.snapshot().await.unwrap().messages.len(), 1);
    assert_eq!(backend.calls().submit_turn, 0);
}

#[tokio::test]
async fn test_many_turns() {
    const TURNS: usize = 8;

    let backend = FakeBackend::default();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (idle_tx, mut idle_rx) = watch::channel(0);
    let session =
        ChatSessionBuilder::new(BackendClient::new(backend.clone()), signed_in())
            .on_message({
                let seen = seen.clone();
                move |msg| seen.lock().unwrap().push(msg.role)
            })
            .on_idle(move || {
                idle_tx.send_modify(|n| *n += 1);
            })
            .build();

    for n in 0..TURNS {
        session.submit(format!("turn {n}")).await.unwrap();
        wait_for_turns(&mut idle_rx, n + 1).await;
    }

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.messages.len(), 1 + 2 * TURNS);
    assert!(
        snapshot
            .messages
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2 * TURNS);
    assert!(seen.chunks(2).all(|pair| pair == [Role::User, Role::Assistant]));
}
