//! Demo mode: no server, an in-process queue seeded with a few tasks.

use std::sync::Arc;

use conductor_core::impls::{InMemoryMetrics, InMemoryTaskResource};
use conductor_core::ports::TaskExecutor;
use conductor_core::{TaskResult, TaskRunner, TaskRunnerConfig};
use serde_json::{Map, json};
use tracing::info;

/// Seed `count` tasks into an in-memory queue and run them through one
/// runner until the queue is drained. Returns the reported results in order.
pub async fn run_demo(
    config: TaskRunnerConfig,
    executor: Arc<dyn TaskExecutor>,
    count: usize,
) -> Vec<TaskResult> {
    let queue = Arc::new(InMemoryTaskResource::new());
    for n in 0..count {
        let mut input = Map::new();
        input.insert("n".to_string(), json!(n));
        queue
            .submit(&config.task_name, config.domain.as_deref(), input)
            .await;
    }

    let task_name = config.task_name.clone();
    let domain = config.domain.clone();
    let metrics = Arc::new(InMemoryMetrics::new());
    let runner =
        TaskRunner::new(queue.clone(), config, executor).with_metrics(metrics.clone());

    info!(task_name = %task_name, count, "running demo queue");
    while queue.pending(&task_name, domain.as_deref()).await > 0 {
        runner.run_once().await;
    }

    let updates = queue.updates().await;
    for result in &updates {
        info!(
            task_id = %result.task_id,
            status = ?result.status,
            output = %serde_json::Value::Object(result.output_data.clone()),
            "task updated"
        );
    }
    let snapshot = metrics.snapshot();
    info!(
        polls = snapshot.task_polls,
        execution_errors = snapshot.task_execution_errors.len(),
        update_errors = snapshot.task_update_errors.len(),
        "demo finished"
    );
    updates
}
