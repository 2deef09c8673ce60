//! Task: a unit of work handed out by the queue service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A task polled from a named queue.
///
/// The runner never mutates a `Task`; it is passed by reference to the
/// executor and dropped after its result has been reported.
///
/// Only the fields a worker actually needs are modelled. Anything else the
/// server sends is ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub task_id: String,

    pub workflow_instance_id: String,

    /// Logical task type; doubles as the queue name.
    pub task_def_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,

    #[serde(default)]
    pub input_data: Map<String, Value>,

    #[serde(default)]
    pub poll_count: u32,

    #[serde(default)]
    pub retry_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default)]
    pub callback_after_seconds: u64,
}

impl Task {
    pub fn new(
        task_id: impl Into<String>,
        workflow_instance_id: impl Into<String>,
        task_def_name: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            workflow_instance_id: workflow_instance_id.into(),
            task_def_name: task_def_name.into(),
            ..Self::default()
        }
    }

    pub fn with_input(mut self, key: impl Into<String>, value: Value) -> Self {
        self.input_data.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_server_payload_and_ignores_unknown_fields() {
        let json = serde_json::json!({
            "taskId": "t-1",
            "workflowInstanceId": "wf-1",
            "taskDefName": "resize_image",
            "taskType": "SIMPLE",
            "inputData": {"width": 640},
            "pollCount": 3,
            "status": "IN_PROGRESS",
            "seq": 7
        });

        let task: Task = serde_json::from_value(json).unwrap();
        assert_eq!(task.task_id, "t-1");
        assert_eq!(task.workflow_instance_id, "wf-1");
        assert_eq!(task.task_def_name, "resize_image");
        assert_eq!(task.task_type.as_deref(), Some("SIMPLE"));
        assert_eq!(task.input_data["width"], 640);
        assert_eq!(task.poll_count, 3);
        assert_eq!(task.retry_count, 0);
        assert!(task.domain.is_none());
    }

    #[test]
    fn with_input_adds_entries() {
        let task = Task::new("t", "wf", "echo").with_input("name", serde_json::json!("conductor"));
        assert_eq!(task.input_data.len(), 1);
        assert_eq!(task.input_data["name"], "conductor");
    }
}
