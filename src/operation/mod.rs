// Long-running operations and the progress they report

// Public API - what other modules can use
pub use cleanup_task::start_cleanup_task;
pub use executor::{
    FixedDelayExecutor, FnStepExecutor, NoDelayExecutor, StepContext, StepError, StepExecutor,
};
pub use handlers::{generate, health, operation_status, start_progress, start_simulation};
pub use models::{OperationOutcome, OperationRequest, OperationSnapshot};
pub use runner::{OperationHandle, OperationRunner, DEFAULT_RETENTION};
pub use status::ProcessSimulator;

// Internal modules
mod cleanup_task;
mod executor;
mod handlers;
mod models;
mod runner;
mod status;
mod types;
