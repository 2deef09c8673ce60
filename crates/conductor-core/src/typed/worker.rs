//! Worker trait - 1 つのタスク定義を処理するワーカー
//!
//! `WorkerGroup` はワーカーごとに TaskRunner を 1 本起動します。

use std::time::Duration;

use async_trait::async_trait;

use crate::config::DEFAULT_POLL_INTERVAL;
use crate::domain::{Task, TaskExecutionError, TaskResult};

/// Task logic bound to one task definition, plus the polling settings its
/// runner should use.
///
/// # 使用例
/// ```ignore
/// struct Greeter;
///
/// #[async_trait]
/// impl Worker for Greeter {
///     fn task_definition_name(&self) -> &str {
///         "greet"
///     }
///
///     async fn execute(&self, task: &Task) -> Result<TaskResult, TaskExecutionError> {
///         Ok(TaskResult::from_task(task, None).completed())
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync {
    fn task_definition_name(&self) -> &str;

    async fn execute(&self, task: &Task) -> Result<TaskResult, TaskExecutionError>;

    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Worker id sent with polls. `None` lets the server pick.
    fn identity(&self) -> Option<String> {
        None
    }

    fn domain(&self) -> Option<String> {
        None
    }
}
