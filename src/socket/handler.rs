use axum::{
    extract::{ws::WebSocket, Query, State, WebSocketUpgrade},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::bridge::Subscription;
use super::connection::Connection;
use crate::publisher::InMemoryPublisher;
use crate::shared::{AppError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketQuery {
    pub user_id: String,
    /// Comma-separated topic names, e.g. `system,project/1/components`
    #[serde(default)]
    pub topics: Option<String>,
}

/// GET /ws?userId=&topics=
///
/// Streams the user's point-to-point queues plus every listed topic.
#[instrument(name = "websocket_handler", skip(ws, state))]
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<SocketQuery>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let (hub, user_id, topics) = resolve(&state, query)?;

    info!(user_id = %user_id, topics = ?topics, "Websocket connection requested");

    Ok(ws.on_upgrade(move |socket| handle_socket_connection(socket, hub, user_id, topics)))
}

/// Checks the request against the configured hub before upgrading
fn resolve(
    state: &AppState,
    query: SocketQuery,
) -> Result<(Arc<InMemoryPublisher>, String, Vec<String>), AppError> {
    let hub = state.socket_hub.clone().ok_or_else(|| {
        warn!("Websocket requested but no socket hub is configured");
        AppError::NotFound("Websocket delivery is not enabled".to_string())
    })?;

    let user_id = query.user_id.trim().to_string();
    if user_id.is_empty() {
        return Err(AppError::Validation("user id must not be empty".to_string()));
    }

    Ok((hub, user_id, parse_topics(query.topics.as_deref())))
}

fn parse_topics(raw: Option<&str>) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for topic in raw.unwrap_or_default().split(',').map(str::trim) {
        if !topic.is_empty() && !topics.iter().any(|t| t == topic) {
            topics.push(topic.to_string());
        }
    }
    topics
}

async fn handle_socket_connection(
    socket: WebSocket,
    hub: Arc<InMemoryPublisher>,
    user_id: String,
    topics: Vec<String>,
) {
    let subscription = Subscription::open(&hub, &user_id, &topics).await;
    info!(user_id = %user_id, "Websocket connection established");

    match Connection::new(Box::new(socket), subscription).run().await {
        Ok(()) => info!(user_id = %user_id, "Websocket connection closed cleanly"),
        Err(e) => warn!(user_id = %user_id, error = %e, "Websocket connection error"),
    }

    hub.disconnect_user(&user_id).await;
}
