//! Typed handlers - input_data を型にデコードして処理する
//!
//! # 二層構造
//! - **表層（Typed）**: `TaskInput` trait, `Handler<T>` trait - 型安全
//! - **内部（Dyn）**: `Worker` trait - object-safe, type erasure

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::worker::Worker;
use crate::config::DEFAULT_POLL_INTERVAL;
use crate::domain::{Task, TaskExecutionError, TaskResult};

/// Typed task input, bound to the task definition it belongs to.
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct ResizeInput {
///     width: u32,
/// }
///
/// impl TaskInput for ResizeInput {
///     const TASK_DEF_NAME: &'static str = "image_resize";
/// }
/// ```
pub trait TaskInput: DeserializeOwned + Send + Sync + 'static {
    const TASK_DEF_NAME: &'static str;
}

/// Handles a decoded input and returns the task output.
#[async_trait]
pub trait Handler<T: TaskInput>: Send + Sync {
    async fn handle(&self, input: T) -> Result<Value, TaskExecutionError>;
}

/// Adapts a `Handler<T>` into a [`Worker`].
///
/// - input_data that does not decode into `T` fails with kind `DecodeError`
/// - a successful handler call yields a COMPLETED result carrying its output
pub struct TypedWorker<T: TaskInput, H: Handler<T>> {
    handler: H,
    poll_interval: Duration,
    identity: Option<String>,
    domain: Option<String>,
    _marker: PhantomData<T>,
}

impl<T: TaskInput, H: Handler<T>> TypedWorker<T, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            poll_interval: DEFAULT_POLL_INTERVAL,
            identity: None,
            domain: None,
            _marker: PhantomData,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

#[async_trait]
impl<T: TaskInput, H: Handler<T>> Worker for TypedWorker<T, H> {
    fn task_definition_name(&self) -> &str {
        T::TASK_DEF_NAME
    }

    async fn execute(&self, task: &Task) -> Result<TaskResult, TaskExecutionError> {
        let input: T = serde_json::from_value(Value::Object(task.input_data.clone()))
            .map_err(|e| TaskExecutionError::new("DecodeError", format!("input decode: {e}")))?;
        let output = self.handler.handle(input).await?;
        Ok(TaskResult::from_task(task, self.identity.as_deref())
            .completed()
            .with_output(output))
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn identity(&self) -> Option<String> {
        self.identity.clone()
    }

    fn domain(&self) -> Option<String> {
        self.domain.clone()
    }
}
