//! TaskResult: the outcome record reported back for a polled task.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::TaskExecutionError;
use super::task::Task;

/// Status a worker reports for a task.
///
/// Serialized as SCREAMING_SNAKE_CASE to match the server's enum names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskResultStatus {
    #[default]
    InProgress,
    Failed,
    FailedWithTerminalError,
    Completed,
}

/// A single log line attached to a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskExecLog {
    pub log: String,
    pub task_id: String,
    /// Epoch milliseconds.
    pub created_time: i64,
}

/// Result of one execution attempt.
///
/// Built either by user task logic or, when that logic fails, by the runner
/// through [`TaskResult::failed_from`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub task_id: String,

    pub workflow_instance_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,

    #[serde(default)]
    pub status: TaskResultStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_for_incompletion: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_after_seconds: Option<u64>,

    #[serde(default)]
    pub output_data: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<TaskExecLog>,
}

impl TaskResult {
    pub fn new(task_id: impl Into<String>, workflow_instance_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            workflow_instance_id: workflow_instance_id.into(),
            ..Self::default()
        }
    }

    /// Result skeleton for `task`, identified as coming from `worker_id`.
    pub fn from_task(task: &Task, worker_id: Option<&str>) -> Self {
        let mut result = Self::new(task.task_id.clone(), task.workflow_instance_id.clone());
        result.worker_id = worker_id.map(str::to_owned);
        result
    }

    /// FAILED result for a task whose executor returned an error.
    ///
    /// `reason_for_incompletion` is the error's display text, unmodified.
    pub fn failed_from(task: &Task, worker_id: Option<&str>, error: &TaskExecutionError) -> Self {
        Self::from_task(task, worker_id).failed(error.message())
    }

    pub fn completed(mut self) -> Self {
        self.status = TaskResultStatus::Completed;
        self
    }

    pub fn failed(mut self, reason: impl Into<String>) -> Self {
        self.status = TaskResultStatus::Failed;
        self.reason_for_incompletion = Some(reason.into());
        self
    }

    pub fn failed_with_terminal_error(mut self, reason: impl Into<String>) -> Self {
        self.status = TaskResultStatus::FailedWithTerminalError;
        self.reason_for_incompletion = Some(reason.into());
        self
    }

    /// Replace the output with `output` when it is a JSON object; any other
    /// value is stored under the `result` key.
    pub fn with_output(mut self, output: Value) -> Self {
        self.output_data = match output {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                map
            }
        };
        self
    }

    pub fn add_output_data(&mut self, key: impl Into<String>, value: Value) {
        self.output_data.insert(key.into(), value);
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.logs.push(TaskExecLog {
            log: message.into(),
            task_id: self.task_id.clone(),
            created_time: Utc::now().timestamp_millis(),
        });
    }

    /// Size of the JSON body sent to the server.
    pub fn payload_size(&self) -> usize {
        serde_json::to_vec(self).map(|body| body.len()).unwrap_or(0)
    }
}
