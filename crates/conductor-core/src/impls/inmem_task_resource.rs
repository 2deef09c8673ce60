//! InMemoryTaskResource - 開発用のキューサービス
//!
//! # 実装詳細
//! - (task_name, domain) ごとに VecDeque<Task> でキューを管理
//! - poll したタスクは in-flight として保持し、update で取り除く
//! - IN_PROGRESS の結果はキューの末尾に戻す（再配送）

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use ulid::Ulid;

use crate::domain::{ConductorError, Task, TaskResult, TaskResultStatus};
use crate::ports::TaskResourceApi;

type QueueKey = (String, Option<String>);

#[derive(Default)]
struct State {
    queues: HashMap<QueueKey, VecDeque<Task>>,
    in_flight: HashMap<String, Task>,
    updates: Vec<TaskResult>,
}

/// Queue service living in process memory.
///
/// # 使用例
/// ```ignore
/// let queue = InMemoryTaskResource::new();
/// queue.submit("resize", None, serde_json::Map::new()).await;
/// let tasks = queue.batch_poll("resize", 1, None, None).await?;
/// ```
#[derive(Default)]
pub struct InMemoryTaskResource {
    state: Mutex<State>,
}

impl InMemoryTaskResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a new task and return its generated id.
    pub async fn submit(
        &self,
        task_def_name: &str,
        domain: Option<&str>,
        input_data: Map<String, Value>,
    ) -> String {
        let mut task = Task::new(
            Ulid::new().to_string(),
            format!("wf-{}", Ulid::new()),
            task_def_name,
        );
        task.input_data = input_data;
        task.domain = domain.map(str::to_owned);
        let task_id = task.task_id.clone();
        self.push(task).await;
        task_id
    }

    /// Enqueue an already built task, routed by its `task_def_name` and `domain`.
    pub async fn push(&self, task: Task) {
        let key = (task.task_def_name.clone(), task.domain.clone());
        let mut state = self.state.lock().await;
        state.queues.entry(key).or_default().push_back(task);
    }

    pub async fn pending(&self, task_def_name: &str, domain: Option<&str>) -> usize {
        let key = (task_def_name.to_string(), domain.map(str::to_owned));
        let state = self.state.lock().await;
        state.queues.get(&key).map_or(0, VecDeque::len)
    }

    pub async fn in_flight(&self) -> usize {
        self.state.lock().await.in_flight.len()
    }

    /// All results received so far, in arrival order.
    pub async fn updates(&self) -> Vec<TaskResult> {
        self.state.lock().await.updates.clone()
    }
}

#[async_trait]
impl TaskResourceApi for InMemoryTaskResource {
    async fn batch_poll(
        &self,
        task_name: &str,
        count: usize,
        worker_id: Option<&str>,
        domain: Option<&str>,
    ) -> Result<Vec<Task>, ConductorError> {
        let key = (task_name.to_string(), domain.map(str::to_owned));
        let mut state = self.state.lock().await;

        let mut polled = Vec::new();
        if let Some(queue) = state.queues.get_mut(&key) {
            while polled.len() < count {
                let Some(mut task) = queue.pop_front() else {
                    break;
                };
                task.poll_count += 1;
                task.worker_id = worker_id.map(str::to_owned);
                polled.push(task);
            }
        }
        for task in &polled {
            state.in_flight.insert(task.task_id.clone(), task.clone());
        }
        Ok(polled)
    }

    async fn update_task(&self, result: &TaskResult) -> Result<String, ConductorError> {
        let mut state = self.state.lock().await;
        let Some(task) = state.in_flight.remove(&result.task_id) else {
            return Err(ConductorError::Other(format!(
                "task {} is not in progress",
                result.task_id
            )));
        };
        state.updates.push(result.clone());

        if result.status == TaskResultStatus::InProgress {
            let key = (task.task_def_name.clone(), task.domain.clone());
            state.queues.entry(key).or_default().push_back(task);
        }
        Ok(result.task_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn poll_respects_count_and_name() {
        let queue = InMemoryTaskResource::new();
        queue.submit("a", None, Map::new()).await;
        queue.submit("a", None, Map::new()).await;
        queue.submit("b", None, Map::new()).await;

        let tasks = queue.batch_poll("a", 1, Some("w1"), None).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].task_def_name, "a");
        assert_eq!(tasks[0].worker_id.as_deref(), Some("w1"));
        assert_eq!(tasks[0].poll_count, 1);
        assert_eq!(queue.pending("a", None).await, 1);
        assert_eq!(queue.pending("b", None).await, 1);
    }

    #[tokio::test]
    async fn domains_are_separate_queues() {
        let queue = InMemoryTaskResource::new();
        queue.submit("a", Some("staging"), Map::new()).await;

        assert!(queue.batch_poll("a", 1, None, None).await.unwrap().is_empty());
        let tasks = queue.batch_poll("a", 1, None, Some("staging")).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].domain.as_deref(), Some("staging"));
    }

    #[tokio::test]
    async fn update_completes_in_flight_task() {
        let queue = InMemoryTaskResource::new();
        let id = queue.submit("a", None, Map::new()).await;
        let task = queue.batch_poll("a", 1, None, None).await.unwrap().remove(0);

        let response = queue
            .update_task(&TaskResult::from_task(&task, None).completed())
            .await
            .unwrap();

        assert_eq!(response, id);
        assert_eq!(queue.in_flight().await, 0);
        assert_eq!(queue.updates().await.len(), 1);
    }

    #[tokio::test]
    async fn in_progress_result_requeues() {
        let queue = InMemoryTaskResource::new();
        queue.submit("a", None, Map::new()).await;
        let task = queue.batch_poll("a", 1, None, None).await.unwrap().remove(0);

        queue
            .update_task(&TaskResult::from_task(&task, None))
            .await
            .unwrap();

        let again = queue.batch_poll("a", 1, None, None).await.unwrap();
        assert_eq!(again[0].task_id, task.task_id);
        assert_eq!(again[0].poll_count, 2);
    }

    #[tokio::test]
    async fn update_of_unknown_task_fails() {
        let queue = InMemoryTaskResource::new();
        let err = queue
            .update_task(&TaskResult::new("missing", "wf").completed())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
