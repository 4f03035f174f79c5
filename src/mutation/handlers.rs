use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use crate::messages::ComponentMutation;
use crate::shared::{AcceptedResponse, AppError, AppState};

/// POST /api/projects/:project_id/components/mutations
///
/// The path's project id must match the mutation's.
#[instrument(name = "publish_mutation", skip(state, mutation))]
pub async fn publish_mutation(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(mutation): Json<ComponentMutation>,
) -> Result<(StatusCode, Json<AcceptedResponse>), AppError> {
    if mutation.project_id != project_id {
        return Err(AppError::Validation(format!(
            "Mutation targets project {} but was posted to project {}",
            mutation.project_id, project_id
        )));
    }

    let kind = mutation.kind;
    state.mutation_broadcaster.publish_mutation(mutation).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse::accepted(format!("{} published", kind))),
    ))
}
