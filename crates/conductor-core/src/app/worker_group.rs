use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::info;

use super::task_runner::TaskRunner;
use crate::config::TaskRunnerConfig;
use crate::domain::{ConductorError, Task, TaskExecutionError, TaskResult};
use crate::ports::{MetricsCollector, TaskExecutor, TaskResourceApi};
use crate::typed::Worker;

/// Worker group handle.
/// - ワーカーごとに TaskRunner を 1 本、独立した tokio task として起動する
/// - TaskRunner 自体は停止手段を持たないので、`stop()` は task を abort する
/// - `join()` で全ランナーの終了を待てる
pub struct WorkerGroup {
    runners: Vec<(String, JoinHandle<()>)>,
}

impl WorkerGroup {
    /// Spawn one runner per worker.
    ///
    /// Every worker's configuration is validated before anything is spawned,
    /// so an invalid worker leaves no runner behind.
    pub fn spawn(
        workers: Vec<Arc<dyn Worker>>,
        task_resource: Arc<dyn TaskResourceApi>,
        metrics: Arc<dyn MetricsCollector>,
    ) -> Result<Self, ConductorError> {
        let configs = workers
            .iter()
            .map(|worker| runner_config(worker.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut runners = Vec::with_capacity(workers.len());
        for (worker, config) in workers.into_iter().zip(configs) {
            let task_name = config.task_name.clone();
            let runner = TaskRunner::new(
                Arc::clone(&task_resource),
                config,
                Arc::new(WorkerExecutor(worker)),
            )
            .with_metrics(Arc::clone(&metrics));

            let join = tokio::spawn(async move {
                runner.run().await;
            });
            runners.push((task_name, join));
        }

        info!(count = runners.len(), "started task runners");
        Ok(Self { runners })
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    /// Task names being polled, one per runner.
    pub fn task_names(&self) -> Vec<&str> {
        self.runners.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Abort every runner. A task being executed at that moment is dropped
    /// without an update; the server re-queues it after its timeout.
    pub fn stop(&self) {
        for (task_name, join) in &self.runners {
            info!(task_name = %task_name, "stopping task runner");
            join.abort();
        }
    }

    /// Wait for all runners to finish.
    pub async fn join(self) {
        for (_, join) in self.runners {
            // ignore JoinError: cancelled is the normal way out
            let _ = join.await;
        }
    }

    pub async fn stop_and_join(self) {
        self.stop();
        self.join().await;
    }
}

fn runner_config(worker: &dyn Worker) -> Result<TaskRunnerConfig, ConductorError> {
    let mut builder = TaskRunnerConfig::builder(worker.task_definition_name())
        .poll_interval(worker.poll_interval());
    if let Some(identity) = worker.identity() {
        builder = builder.worker_id(identity);
    }
    if let Some(domain) = worker.domain() {
        builder = builder.domain(domain);
    }
    builder.build()
}

/// Runs a `Worker` as the runner's executor.
struct WorkerExecutor(Arc<dyn Worker>);

#[async_trait]
impl TaskExecutor for WorkerExecutor {
    async fn execute(&self, task: &Task) -> Result<TaskResult, TaskExecutionError> {
        self.0.execute(task).await
    }
}
