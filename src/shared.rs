use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::collab::{ChatRelay, PresenceNotifier, SessionRegistry};
use crate::config::Config;
use crate::directory::{ProjectRepository, UserRepository};
use crate::mutation::MutationBroadcaster;
use crate::operation::{FixedDelayExecutor, OperationRunner, ProcessSimulator, StepExecutor};
use crate::publisher::{DeliveryError, InMemoryPublisher, Publisher};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session_registry: Arc<SessionRegistry>,
    pub mutation_broadcaster: Arc<MutationBroadcaster>,
    pub chat_relay: Arc<ChatRelay>,
    pub operation_runner: Arc<OperationRunner>,
    pub process_simulator: Arc<ProcessSimulator>,
    /// Step work used by operations started over HTTP
    pub step_executor: Arc<dyn StepExecutor>,
    /// Channels `/ws` clients attach to; `None` disables the endpoint
    pub socket_hub: Option<Arc<InMemoryPublisher>>,
}

impl AppState {
    /// Wires every core component against one publisher and the repositories
    pub fn new(
        config: Config,
        publisher: Arc<dyn Publisher>,
        project_repository: Arc<dyn ProjectRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        let presence = PresenceNotifier::new(publisher.clone());
        let step_executor: Arc<dyn StepExecutor> =
            Arc::new(FixedDelayExecutor::new(config.step_delay()));

        Self {
            session_registry: Arc::new(SessionRegistry::new(project_repository.clone(), presence)),
            mutation_broadcaster: Arc::new(MutationBroadcaster::new(publisher.clone())),
            chat_relay: Arc::new(ChatRelay::new(
                publisher.clone(),
                project_repository,
                user_repository,
            )),
            operation_runner: Arc::new(
                OperationRunner::new(publisher.clone()).with_retention(config.operation_retention()),
            ),
            process_simulator: Arc::new(ProcessSimulator::new(publisher, config.simulator_delay())),
            step_executor,
            socket_hub: None,
            config: Arc::new(config),
        }
    }

    /// Replaces the step work for HTTP-started operations
    pub fn with_step_executor(mut self, step_executor: Arc<dyn StepExecutor>) -> Self {
        self.step_executor = step_executor;
        self
    }

    /// Serves `/ws` clients from the given in-memory publisher
    ///
    /// Only meaningful when the same publisher was passed to [`AppState::new`].
    pub fn with_socket_hub(mut self, hub: Arc<InMemoryPublisher>) -> Self {
        self.socket_hub = Some(hub);
        self
    }
}

/// Acknowledgement for requests whose effect is asynchronous
#[derive(Debug, Serialize, Deserialize)]
pub struct AcceptedResponse {
    pub status: String,
    pub message: String,
}

impl AcceptedResponse {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            status: "accepted".to_string(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Repository error: {0}")]
    RepositoryError(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Delivery(err) => (
                StatusCode::BAD_GATEWAY,
                format!("Delivery error: {}", err),
            ),
            AppError::RepositoryError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Repository error: {}", msg),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
