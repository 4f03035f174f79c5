use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::executor::{StepContext, StepError, StepExecutor};
use super::models::{step_percentage, OperationOutcome, OperationRequest, OperationSnapshot};
use crate::messages::{OutboundMessage, Phase, ProgressEvent};
use crate::publisher::{topics, Publisher};
use crate::shared::AppError;

/// Default time a finished operation stays queryable
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(10 * 60);

/// Runs multi-step operations and streams their progress
///
/// Every operation is its own task. Progress goes point-to-point to the
/// owning user on the `progress` queue; STARTED and COMPLETED are also
/// broadcast on `system`. A failing step ends the operation with a single
/// ERROR event to the user. Delivery failures are logged and never stop an
/// operation.
///
/// Snapshots of finished (terminal or cancelled) operations are kept for the
/// retention window and then dropped by [`OperationRunner::evict_finished`],
/// normally driven by [`super::start_cleanup_task`]. Running operations are
/// never evicted.
pub struct OperationRunner {
    publisher: Arc<dyn Publisher>,
    /// operation_id -> latest snapshot
    operations: Arc<RwLock<HashMap<String, OperationSnapshot>>>,
    retention: Duration,
}

/// Awaitable handle on a running operation
#[derive(Debug)]
pub struct OperationHandle {
    operation_id: String,
    task: JoinHandle<OperationOutcome>,
}

impl OperationHandle {
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Resolves once the operation's terminal event has been emitted
    pub async fn wait(self) -> OperationOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    operation_id = %self.operation_id,
                    error = %e,
                    "Operation task ended abnormally"
                );
                OperationOutcome::Failed {
                    message: format!("operation task aborted: {}", e),
                }
            }
        }
    }
}

impl OperationRunner {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self {
            publisher,
            operations: Arc::new(RwLock::new(HashMap::new())),
            retention: DEFAULT_RETENTION,
        }
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Registers the operation and starts it in the background
    ///
    /// Rejects an empty user id and any operation id the runner still tracks:
    /// a running operation, or a finished one inside the retention window.
    /// Once its snapshot has been evicted the id may be used again.
    #[instrument(skip(self, request, executor), fields(user_id = %request.user_id))]
    pub async fn run(
        &self,
        request: OperationRequest,
        executor: Arc<dyn StepExecutor>,
    ) -> Result<OperationHandle, AppError> {
        if request.user_id.trim().is_empty() {
            return Err(AppError::Validation("user id must not be empty".to_string()));
        }

        let operation_id = match request.operation_id {
            Some(id) if id.trim().is_empty() => {
                return Err(AppError::Validation(
                    "operation id must not be empty".to_string(),
                ));
            }
            Some(id) => id,
            None => Uuid::new_v4().to_string(),
        };

        {
            let mut operations = self.operations.write().await;
            if operations.contains_key(&operation_id) {
                warn!(operation_id = %operation_id, "Rejected reuse of operation id");
                return Err(AppError::Validation(format!(
                    "Operation {} already exists",
                    operation_id
                )));
            }
            operations.insert(
                operation_id.clone(),
                OperationSnapshot::new(&operation_id, &request.user_id, request.total_steps),
            );
        }

        info!(
            operation_id = %operation_id,
            total_steps = request.total_steps,
            "Starting operation"
        );

        let task = OperationTask {
            operation_id: operation_id.clone(),
            user_id: request.user_id,
            total_steps: request.total_steps,
            cancellation: request.cancellation.unwrap_or_default(),
            executor,
            publisher: Arc::clone(&self.publisher),
            operations: Arc::clone(&self.operations),
        };

        Ok(OperationHandle {
            operation_id,
            task: tokio::spawn(task.run()),
        })
    }

    /// Latest snapshot of an operation
    pub async fn operation(&self, operation_id: &str) -> Result<OperationSnapshot, AppError> {
        self.operations
            .read()
            .await
            .get(operation_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Operation not found: {}", operation_id)))
    }

    /// Drops finished snapshots older than the retention window
    #[instrument(skip(self))]
    pub async fn evict_finished(&self) -> usize {
        let now = Utc::now();
        let retention = self.retention;
        let mut operations = self.operations.write().await;
        let before = operations.len();

        operations.retain(|_, snapshot| {
            let expired = now
                .signed_duration_since(snapshot.updated_at)
                .to_std()
                .map(|age| age >= retention)
                .unwrap_or(false);
            !(snapshot.is_finished() && expired)
        });

        let evicted = before - operations.len();
        if evicted > 0 {
            debug!(
                evicted = evicted,
                remaining = operations.len(),
                "Evicted finished operations"
            );
        }
        evicted
    }

    /// Number of snapshots currently held
    pub async fn tracked_operations(&self) -> usize {
        self.operations.read().await.len()
    }
}

/// Why stepping stopped early
enum Interrupt {
    Cancelled,
    Failed(StepError),
}

/// State owned by one running operation
struct OperationTask {
    operation_id: String,
    user_id: String,
    total_steps: u32,
    cancellation: CancellationToken,
    executor: Arc<dyn StepExecutor>,
    publisher: Arc<dyn Publisher>,
    operations: Arc<RwLock<HashMap<String, OperationSnapshot>>>,
}

impl OperationTask {
    async fn run(self) -> OperationOutcome {
        let started = self.event(
            Phase::Started,
            Some(0),
            "init",
            format!("Initializing generation for {}", self.user_id),
        );
        self.send_to_user(started).await;
        self.broadcast(self.event(
            Phase::Started,
            Some(0),
            "init",
            format!("System: Generation started for {}", self.user_id),
        ))
        .await;

        for step in 1..=self.total_steps {
            if self.cancellation.is_cancelled() {
                return self.cancelled(step - 1).await;
            }

            let ctx = StepContext {
                operation_id: self.operation_id.clone(),
                user_id: self.user_id.clone(),
                step,
                total_steps: self.total_steps,
            };

            match self.execute_step(ctx).await {
                Ok(()) => {}
                Err(Interrupt::Cancelled) => return self.cancelled(step - 1).await,
                Err(Interrupt::Failed(cause)) => return self.fail(step - 1, cause).await,
            }

            self.record(Phase::Progressing, step).await;
            self.send_to_user(self.event(
                Phase::Progressing,
                Some(step_percentage(step, self.total_steps)),
                &format!("step_{}", step),
                format!("Step {} completed for {}", step, self.user_id),
            ))
            .await;
        }

        self.send_to_user(self.event(
            Phase::Completed,
            Some(100),
            "completed",
            format!("Generation completed successfully for {}", self.user_id),
        ))
        .await;
        self.broadcast(self.event(
            Phase::Completed,
            Some(100),
            "completed",
            format!("System: Generation completed for {}", self.user_id),
        ))
        .await;
        self.record(Phase::Completed, self.total_steps).await;

        info!(operation_id = %self.operation_id, "Operation completed");
        OperationOutcome::Completed
    }

    /// Runs one step in its own task so a panic surfaces as a step failure
    async fn execute_step(&self, ctx: StepContext) -> Result<(), Interrupt> {
        let executor = Arc::clone(&self.executor);
        let mut work = tokio::spawn(async move { executor.execute(&ctx).await });

        tokio::select! {
            joined = &mut work => match joined {
                Ok(Ok(())) => Ok(()),
                Ok(Err(cause)) => Err(Interrupt::Failed(cause)),
                Err(e) => Err(Interrupt::Failed(StepError::Panicked(join_error_message(e)))),
            },
            _ = self.cancellation.cancelled() => {
                work.abort();
                Err(Interrupt::Cancelled)
            }
        }
    }

    async fn fail(&self, completed_steps: u32, cause: StepError) -> OperationOutcome {
        warn!(
            operation_id = %self.operation_id,
            step = completed_steps + 1,
            error = %cause,
            "Operation step failed"
        );

        self.send_to_user(self.event(
            Phase::Error,
            None,
            "error",
            format!("An error occurred: {}", cause),
        ))
        .await;
        self.record(Phase::Error, completed_steps).await;

        OperationOutcome::Failed {
            message: cause.to_string(),
        }
    }

    async fn cancelled(&self, completed_steps: u32) -> OperationOutcome {
        info!(
            operation_id = %self.operation_id,
            completed_steps = completed_steps,
            "Operation cancelled"
        );

        if let Some(snapshot) = self.operations.write().await.get_mut(&self.operation_id) {
            snapshot.cancelled = true;
            snapshot.updated_at = Utc::now();
        }

        OperationOutcome::Cancelled { completed_steps }
    }

    async fn record(&self, phase: Phase, step: u32) {
        if let Some(snapshot) = self.operations.write().await.get_mut(&self.operation_id) {
            snapshot.phase = phase;
            snapshot.current_step = snapshot.current_step.max(step);
            snapshot.updated_at = Utc::now();
        }
    }

    fn event(
        &self,
        phase: Phase,
        percentage: Option<u8>,
        step_label: &str,
        message: String,
    ) -> ProgressEvent {
        ProgressEvent {
            operation_id: self.operation_id.clone(),
            user_id: self.user_id.clone(),
            phase,
            percentage,
            step_label: step_label.to_string(),
            message,
            timestamp: Utc::now(),
        }
    }

    async fn send_to_user(&self, event: ProgressEvent) {
        let phase = event.phase;
        let message = OutboundMessage::Progress(event);

        match self
            .publisher
            .send_to_user(&self.user_id, topics::PROGRESS_QUEUE, &message)
            .await
        {
            Ok(()) => {
                debug!(operation_id = %self.operation_id, phase = %phase, "Progress sent to user");
            }
            Err(e) if phase.is_terminal() => {
                error!(
                    operation_id = %self.operation_id,
                    phase = %phase,
                    error = %e,
                    "Terminal progress event not delivered"
                );
            }
            Err(e) => {
                warn!(
                    operation_id = %self.operation_id,
                    phase = %phase,
                    error = %e,
                    "Progress event not delivered, continuing"
                );
            }
        }
    }

    async fn broadcast(&self, event: ProgressEvent) {
        let phase = event.phase;

        if let Err(e) = self
            .publisher
            .send_to_topic(topics::SYSTEM_TOPIC, &OutboundMessage::Progress(event))
            .await
        {
            warn!(
                operation_id = %self.operation_id,
                phase = %phase,
                error = %e,
                "System broadcast not delivered"
            );
        }
    }
}

fn join_error_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }

    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
