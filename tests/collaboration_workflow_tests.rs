use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use canvas_collab::{
    build_router,
    messages::{ChatMessage, ComponentMutation, MutationKind, PresenceAction, PresenceEvent},
    InMemoryPublisher,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tower::ServiceExt; // for `oneshot`

mod utils;

use utils::*;

fn in_memory_setup() -> TestSetup<InMemoryPublisher> {
    TestSetupBuilder::new()
        .with_demo_directory()
        .build(Arc::new(InMemoryPublisher::new(64)))
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn next_presence(receiver: &mut broadcast::Receiver<String>) -> PresenceEvent {
    let frame = receiver.try_recv().expect("expected a presence event");
    serde_json::from_str(&frame).unwrap()
}

#[tokio::test]
async fn test_join_sequence_publishes_presence_in_order() {
    let setup = in_memory_setup();
    let mut presence = setup.publisher.subscribe("project/1/presence").await;
    let registry = &setup.state.session_registry;

    let first = registry.join(1, "alice", "Alice").await.unwrap();
    let second = registry.join(1, "bob", "Bob").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.participant_count(), 2);
    assert_eq!(second.session_name, "Collaboration Session - Demo Canvas");

    let alice = next_presence(&mut presence);
    assert_eq!(alice.user_id, "alice");
    assert_eq!(alice.action, PresenceAction::Join);
    let bob = next_presence(&mut presence);
    assert_eq!(bob.user_id, "bob");
    assert_eq!(bob.display_name, "Bob");
    assert!(matches!(presence.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_rejoin_and_unknown_leave_are_silent() {
    let setup = in_memory_setup();
    let registry = &setup.state.session_registry;
    registry.join(1, "alice", "Alice").await.unwrap();

    let mut presence = setup.publisher.subscribe("project/1/presence").await;

    let again = registry.join(1, "alice", "Alice").await.unwrap();
    registry.leave(1, "mallory").await.unwrap();

    assert_eq!(again.participant_count(), 1);
    assert!(matches!(presence.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_session_lifecycle_keeps_history() {
    let setup = in_memory_setup();
    let registry = &setup.state.session_registry;

    let first = registry.join(1, "alice", "Alice").await.unwrap();
    registry.join(1, "bob", "Bob").await.unwrap();
    registry.leave(1, "alice").await.unwrap();

    let still_active = registry.active_session(1).await.unwrap().unwrap();
    assert_eq!(still_active.id, first.id);
    assert!(still_active.has_participant("bob"));

    registry.leave(1, "bob").await.unwrap();
    assert!(registry.active_session(1).await.unwrap().is_none());

    let second = registry.join(1, "alice", "Alice").await.unwrap();
    assert_ne!(second.id, first.id);

    let history = registry.sessions(1).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(!history[0].active);
    assert!(history[0].participants.is_empty());
    assert!(history[1].active);
}

#[tokio::test]
async fn test_projects_do_not_share_sessions_or_presence() {
    let setup = in_memory_setup();
    let mut sandbox_presence = setup.publisher.subscribe("project/2/presence").await;
    let registry = &setup.state.session_registry;

    let demo = registry.join(1, "alice", "Alice").await.unwrap();
    let sandbox = registry.join(2, "alice", "Alice").await.unwrap();

    assert_ne!(demo.id, sandbox.id);
    assert_eq!(next_presence(&mut sandbox_presence).project_id, 2);
    assert!(matches!(
        sandbox_presence.try_recv(),
        Err(TryRecvError::Empty)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_share_one_session() {
    let setup = in_memory_setup();
    let mut presence = setup.publisher.subscribe("project/1/presence").await;
    let registry = setup.state.session_registry.clone();

    let joins = (0..10).map(|i| {
        let registry = registry.clone();
        tokio::spawn(async move {
            let user_id = format!("user-{}", i);
            registry.join(1, &user_id, &user_id).await.unwrap()
        })
    });
    let sessions: Vec<_> = futures::future::join_all(joins)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let session_id = sessions[0].id;
    assert!(sessions.iter().all(|s| s.id == session_id));

    let active = registry.active_session(1).await.unwrap().unwrap();
    assert_eq!(active.participant_count(), 10);
    assert_eq!(registry.sessions(1).await.unwrap().len(), 1);

    let mut announced = 0;
    while presence.try_recv().is_ok() {
        announced += 1;
    }
    assert_eq!(announced, 10);
}

#[tokio::test]
async fn test_presence_failure_does_not_block_join() {
    let publisher = Arc::new(MockPublisher::new());
    publisher.set_fail_topics(true);
    let setup = TestSetupBuilder::new()
        .with_demo_directory()
        .build(publisher);

    let session = setup
        .state
        .session_registry
        .join(1, "alice", "Alice")
        .await
        .unwrap();

    assert!(session.active);
    assert!(setup
        .publisher
        .get_topic_messages("project/1/presence")
        .await
        .is_empty());
}

#[tokio::test]
async fn test_mutation_reaches_only_its_project() {
    let setup = in_memory_setup();
    let mut demo = setup.publisher.subscribe("project/1/components").await;
    let mut sandbox = setup.publisher.subscribe("project/2/components").await;
    let app = build_router(setup.state.clone());

    let response = app
        .oneshot(post_json(
            "/api/projects/1/components/mutations",
            json!({
                "componentId": 42,
                "projectId": 1,
                "actingUserId": "alice",
                "kind": "MOVE",
                "payload": {"x": 10, "y": -4}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let frame = demo.try_recv().unwrap();
    let mutation: ComponentMutation = serde_json::from_str(&frame).unwrap();
    assert_eq!(mutation.component_id, 42);
    assert_eq!(mutation.kind, MutationKind::Move);
    assert_eq!(mutation.payload, json!({"x": 10, "y": -4}));

    assert!(matches!(demo.try_recv(), Err(TryRecvError::Empty)));
    assert!(matches!(sandbox.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_mutation_delivery_failure_is_bad_gateway() {
    let publisher = Arc::new(MockPublisher::new());
    publisher.set_fail_topics(true);
    let setup = TestSetupBuilder::new()
        .with_demo_directory()
        .build(publisher);
    let app = build_router(setup.state);

    let response = app
        .oneshot(post_json(
            "/api/projects/1/components/mutations",
            json!({
                "componentId": 1,
                "projectId": 1,
                "actingUserId": "alice",
                "kind": "DELETE",
                "payload": null
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_chat_message_is_relayed_with_username() {
    let setup = in_memory_setup();
    let mut chat = setup.publisher.subscribe("project/1/chat").await;
    let app = build_router(setup.state.clone());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/projects/1/chat",
            json!({"userId": "bob", "message": "moved the header"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let relayed: ChatMessage = serde_json::from_str(&chat.try_recv().unwrap()).unwrap();
    assert_eq!(relayed.username, "Bob");
    assert_eq!(relayed.message, "moved the header");

    let unknown_user = app
        .oneshot(post_json(
            "/api/projects/1/chat",
            json!({"userId": "mallory", "message": "hi"}),
        ))
        .await
        .unwrap();
    assert_eq!(unknown_user.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_http_session_flow() {
    let setup = in_memory_setup();
    let app = build_router(setup.state.clone());

    let joined = app
        .clone()
        .oneshot(post_json(
            "/api/projects/2/session/join",
            json!({"userId": "alice", "displayName": "Alice"}),
        ))
        .await
        .unwrap();
    assert_eq!(joined.status(), StatusCode::OK);

    let left = app
        .clone()
        .oneshot(post_json(
            "/api/projects/2/session/leave",
            json!({"userId": "alice"}),
        ))
        .await
        .unwrap();
    assert_eq!(left.status(), StatusCode::NO_CONTENT);

    let active = app
        .oneshot(
            Request::builder()
                .uri("/api/projects/2/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(active.status(), StatusCode::NOT_FOUND);
}
