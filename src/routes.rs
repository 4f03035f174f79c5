use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::collab::{active_session, join_session, leave_session, list_sessions, send_chat};
use crate::mutation::publish_mutation;
use crate::operation::{generate, health, operation_status, start_progress, start_simulation};
use crate::shared::AppState;
use crate::socket::websocket_handler;

/// Builds the HTTP surface over the coordination core
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/operations/health", get(health))
        .route("/api/operations/start", post(start_simulation))
        .route("/api/progress/start", post(start_progress))
        .route("/api/progress/:operation_id", get(operation_status))
        .route("/generate", get(generate))
        .route("/ws", get(websocket_handler))
        .route("/api/projects/:project_id/session", get(active_session))
        .route("/api/projects/:project_id/session/join", post(join_session))
        .route("/api/projects/:project_id/session/leave", post(leave_session))
        .route("/api/projects/:project_id/sessions", get(list_sessions))
        .route("/api/projects/:project_id/chat", post(send_chat))
        .route(
            "/api/projects/:project_id/components/mutations",
            post(publish_mutation),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `address` and serves `app` until the server stops
///
/// A bind failure is returned before anything is served.
pub async fn serve(app: Router, address: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;

    info!("Server running on http://{}", address);
    axum::serve(listener, app).await
}
