use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::messages::Phase;

/// Parameters of one operation run
#[derive(Debug, Clone)]
pub struct OperationRequest {
    /// Generated when absent
    pub operation_id: Option<String>,
    pub user_id: String,
    pub total_steps: u32,
    /// Checked between steps; once cancelled the operation goes silent
    pub cancellation: Option<CancellationToken>,
}

impl OperationRequest {
    pub fn new(user_id: impl Into<String>, total_steps: u32) -> Self {
        Self {
            operation_id: None,
            user_id: user_id.into(),
            total_steps,
            cancellation: None,
        }
    }

    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Latest known state of an operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationSnapshot {
    pub operation_id: String,
    pub user_id: String,
    pub total_steps: u32,
    /// Steps completed so far; never decreases
    pub current_step: u32,
    /// Last phase emitted to the user
    pub phase: Phase,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OperationSnapshot {
    pub fn new(operation_id: &str, user_id: &str, total_steps: u32) -> Self {
        let now = Utc::now();

        Self {
            operation_id: operation_id.to_string(),
            user_id: user_id.to_string(),
            total_steps,
            current_step: 0,
            phase: Phase::Started,
            cancelled: false,
            started_at: now,
            updated_at: now,
        }
    }

    /// floor(step * 100 / total); a zero-step operation counts as done
    pub fn percentage(&self) -> u8 {
        step_percentage(self.current_step, self.total_steps)
    }

    /// Whether the operation will emit nothing more
    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal() || self.cancelled
    }
}

pub fn step_percentage(step: u32, total_steps: u32) -> u8 {
    if total_steps == 0 {
        return 100;
    }
    (u64::from(step.min(total_steps)) * 100 / u64::from(total_steps)) as u8
}

/// How an operation ended, as reported by its handle
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    Completed,
    /// A step failed with this cause
    Failed { message: String },
    /// Stopped by its cancellation token after `completed_steps` steps
    Cancelled { completed_steps: u32 },
}
