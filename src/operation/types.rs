use serde::{Deserialize, Serialize};

/// Body of POST /api/progress/start
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub architecture_type: Option<String>,
    pub parameters: Option<serde_json::Value>,
    /// Falls back to the configured default step count
    pub total_steps: Option<u32>,
}

/// Query string of POST /api/progress/start
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuery {
    pub user_id: String,
    pub operation_id: Option<String>,
}

/// Query string of GET /generate
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuery {
    pub user_id: String,
}

/// Returned once an operation has been registered and spawned
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedResponse {
    pub operation_id: String,
    pub user_id: String,
    pub total_steps: u32,
    pub message: String,
}

/// Body of GET /api/operations/health
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}
