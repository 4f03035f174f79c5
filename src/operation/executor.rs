use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// What a step knows about its place in the operation
#[derive(Debug, Clone, PartialEq)]
pub struct StepContext {
    pub operation_id: String,
    pub user_id: String,
    /// 1-based index of the step being run
    pub step: u32,
    pub total_steps: u32,
}

/// Errors a unit of step work can report
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StepError {
    #[error("{0}")]
    Failed(String),

    #[error("step panicked: {0}")]
    Panicked(String),
}

impl StepError {
    pub fn failed(msg: impl Into<String>) -> Self {
        StepError::Failed(msg.into())
    }
}

/// Trait for the work performed by each step of an operation
///
/// The runner spawns every call in its own task, so an implementation may
/// sleep or do I/O freely; a panic is reported as a failed step.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute(&self, ctx: &StepContext) -> Result<(), StepError>;
}

/// Simulated work: every step takes the same fixed time
#[derive(Debug, Clone)]
pub struct FixedDelayExecutor {
    delay: Duration,
}

impl FixedDelayExecutor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl StepExecutor for FixedDelayExecutor {
    async fn execute(&self, _ctx: &StepContext) -> Result<(), StepError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Steps that succeed immediately; keeps tests deterministic
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelayExecutor;

#[async_trait]
impl StepExecutor for NoDelayExecutor {
    async fn execute(&self, _ctx: &StepContext) -> Result<(), StepError> {
        Ok(())
    }
}

/// Adapts an async closure into a [`StepExecutor`]
pub struct FnStepExecutor<F> {
    f: F,
}

impl<F, Fut> FnStepExecutor<F>
where
    F: Fn(StepContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), StepError>> + Send,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> StepExecutor for FnStepExecutor<F>
where
    F: Fn(StepContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), StepError>> + Send,
{
    async fn execute(&self, ctx: &StepContext) -> Result<(), StepError> {
        (self.f)(ctx.clone()).await
    }
}
