use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::{OperationRequest, OperationSnapshot},
    types::{GenerateQuery, GenerationRequest, HealthResponse, StartQuery, StartedResponse},
};
use crate::shared::{AcceptedResponse, AppError, AppState};

/// POST /api/progress/start?userId=&operationId=
///
/// Registers the operation and returns as soon as it is running; progress
/// reaches the user over the publisher.
#[instrument(name = "start_progress", skip(state, request))]
pub async fn start_progress(
    State(state): State<AppState>,
    Query(query): Query<StartQuery>,
    Json(request): Json<GenerationRequest>,
) -> Result<(StatusCode, Json<StartedResponse>), AppError> {
    info!(
        user_id = %query.user_id,
        architecture_type = ?request.architecture_type,
        "Generation requested"
    );

    let mut operation = OperationRequest::new(
        query.user_id,
        request
            .total_steps
            .unwrap_or(state.config.default_total_steps),
    );
    if let Some(operation_id) = query.operation_id {
        operation = operation.with_operation_id(operation_id);
    }

    let started = start(&state, operation).await?;
    Ok((StatusCode::ACCEPTED, Json(started)))
}

/// GET /generate?userId=
#[instrument(name = "generate", skip(state))]
pub async fn generate(
    State(state): State<AppState>,
    Query(query): Query<GenerateQuery>,
) -> Result<(StatusCode, Json<StartedResponse>), AppError> {
    let operation = OperationRequest::new(query.user_id, state.config.default_total_steps);

    let started = start(&state, operation).await?;
    Ok((StatusCode::ACCEPTED, Json(started)))
}

async fn start(state: &AppState, request: OperationRequest) -> Result<StartedResponse, AppError> {
    let user_id = request.user_id.clone();
    let total_steps = request.total_steps;

    let handle = state
        .operation_runner
        .run(request, Arc::clone(&state.step_executor))
        .await?;
    let operation_id = handle.operation_id().to_string();

    // Dropping the handle detaches the operation
    drop(handle);

    Ok(StartedResponse {
        message: format!(
            "Generation started for user: {}, operation: {}",
            user_id, operation_id
        ),
        operation_id,
        user_id,
        total_steps,
    })
}

/// GET /api/progress/:operation_id
#[instrument(name = "operation_status", skip(state))]
pub async fn operation_status(
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
) -> Result<Json<OperationSnapshot>, AppError> {
    let snapshot = state.operation_runner.operation(&operation_id).await?;
    Ok(Json(snapshot))
}

/// POST /api/operations/start
#[instrument(name = "start_simulation", skip(state))]
pub async fn start_simulation(
    State(state): State<AppState>,
) -> (StatusCode, Json<AcceptedResponse>) {
    state.process_simulator.simulate();

    info!("Simulated process launched");

    (
        StatusCode::ACCEPTED,
        Json(AcceptedResponse::accepted(
            "Operation started, listen for notifications on the notifications topic",
        )),
    )
}

/// GET /api/operations/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "canvas-collab".to_string(),
        timestamp: Utc::now().timestamp_millis(),
    })
}
