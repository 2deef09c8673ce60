//! TaskExecutor port - ユーザーのタスクロジック
//!
//! ランナーに渡される「Task -> TaskResult」の唯一の能力です。
//! 失敗は `TaskExecutionError` で返し、ランナー側で FAILED の結果に変換されます。

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Task, TaskExecutionError, TaskResult};

/// Executes one task and produces its result.
///
/// The runner calls this sequentially, never concurrently, so implementations
/// do not need to be reentrant.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute(&self, task: &Task) -> Result<TaskResult, TaskExecutionError>;
}

/// Adapts a synchronous closure into a [`TaskExecutor`].
///
/// The closure runs inline on the runtime thread. Keep it short: a slow or
/// blocking closure holds that thread, and under a `WorkerGroup` stalls every
/// other runner scheduled on it. Use [`BlockingFnExecutor`] for such work.
///
/// ```ignore
/// let executor = FnExecutor::new(|task: &Task| {
///     Ok(TaskResult::from_task(task, None).completed())
/// });
/// ```
pub struct FnExecutor<F> {
    f: F,
}

impl<F> FnExecutor<F>
where
    F: Fn(&Task) -> Result<TaskResult, TaskExecutionError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> TaskExecutor for FnExecutor<F>
where
    F: Fn(&Task) -> Result<TaskResult, TaskExecutionError> + Send + Sync,
{
    async fn execute(&self, task: &Task) -> Result<TaskResult, TaskExecutionError> {
        (self.f)(task)
    }
}

/// Like [`FnExecutor`], but each call runs on tokio's blocking thread pool
/// via `spawn_blocking`, so CPU-heavy or blocking I/O work does not hold up
/// the async runtime. The task is cloned into the blocking call.
///
/// A panic in the closure is resumed on the caller, where the runner reports
/// it as a FAILED result like any other executor panic.
pub struct BlockingFnExecutor<F> {
    f: Arc<F>,
}

impl<F> BlockingFnExecutor<F>
where
    F: Fn(&Task) -> Result<TaskResult, TaskExecutionError> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }
}

#[async_trait]
impl<F> TaskExecutor for BlockingFnExecutor<F>
where
    F: Fn(&Task) -> Result<TaskResult, TaskExecutionError> + Send + Sync + 'static,
{
    async fn execute(&self, task: &Task) -> Result<TaskResult, TaskExecutionError> {
        let f = Arc::clone(&self.f);
        let task = task.clone();
        match tokio::task::spawn_blocking(move || f(&task)).await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => Err(TaskExecutionError::new("cancelled", err.to_string())),
        }
    }
}
