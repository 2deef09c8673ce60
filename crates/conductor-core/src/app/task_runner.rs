//! TaskRunner - poll → execute → update ループ
//!
//! # フロー（1 サイクル）
//! 1. TaskResourceApi::batch_poll() でタスクを取得（件数は常に 1）
//! 2. 空なら poll_interval だけ待って終了
//! 3. 取得順に 1 件ずつ execute → update（同一バッチ内で並行実行しない）
//!
//! poll / execute / update の失敗はそれぞれの段階で閉じ込め、
//! ループ自体は決して終了しません。

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::config::TaskRunnerConfig;
use crate::domain::{ConductorError, Task, TaskExecutionError, TaskResult};
use crate::ports::{MetricsCollector, NoopMetrics, TaskExecutor, TaskResourceApi};

/// Polls one named queue forever, executing and reporting each task.
pub struct TaskRunner {
    task_resource: Arc<dyn TaskResourceApi>,
    executor: Arc<dyn TaskExecutor>,
    metrics: Arc<dyn MetricsCollector>,
    config: TaskRunnerConfig,
}

impl TaskRunner {
    pub fn new(
        task_resource: Arc<dyn TaskResourceApi>,
        config: TaskRunnerConfig,
        executor: Arc<dyn TaskExecutor>,
    ) -> Self {
        Self {
            task_resource,
            executor,
            metrics: Arc::new(NoopMetrics),
            config,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &TaskRunnerConfig {
        &self.config
    }

    /// Run polling cycles until the surrounding task is aborted.
    ///
    /// A panic escaping a cycle is counted as an uncaught exception, logged,
    /// and the next cycle starts.
    pub async fn run(&self) {
        info!(
            task_name = %self.config.task_name,
            poll_interval = ?self.config.poll_interval,
            worker_id = ?self.config.worker_id,
            domain = ?self.config.domain,
            "polling task"
        );

        loop {
            let cycle = AssertUnwindSafe(self.run_once()).catch_unwind().await;
            if let Err(panic) = cycle {
                self.metrics.increment_uncaught_exception();
                warn!(
                    task_name = %self.config.task_name,
                    poll_interval = ?self.config.poll_interval,
                    worker_id = ?self.config.worker_id,
                    panic = %panic_message(panic.as_ref()),
                    "uncaught panic in polling cycle"
                );
                tokio::task::yield_now().await;
            }
        }
    }

    /// One polling cycle. Returns the number of tasks processed; `0` means
    /// the idle wait was taken.
    pub async fn run_once(&self) -> usize {
        let tasks = match self.poll_tasks().await {
            Ok(tasks) => tasks,
            Err(err) => {
                self.metrics
                    .increment_task_poll_error(&self.config.task_name, err.kind());
                info!(
                    task_name = %self.config.task_name,
                    error_kind = err.kind(),
                    error = &err as &dyn std::error::Error,
                    "failed to poll task"
                );
                Vec::new()
            }
        };

        if tasks.is_empty() {
            tokio::time::sleep(self.config.poll_interval).await;
            return 0;
        }

        let processed = tasks.len();
        for task in &tasks {
            let result = match self.execute_task(task).await {
                Ok(result) => result,
                Err(err) => {
                    self.metrics
                        .increment_task_execution_error(&task.task_id, err.kind());
                    info!(
                        task_id = %task.task_id,
                        workflow_instance_id = %task.workflow_instance_id,
                        task_def_name = %task.task_def_name,
                        error_kind = err.kind(),
                        error = %err,
                        "failed to execute task"
                    );
                    TaskResult::failed_from(task, self.config.worker_id.as_deref(), &err)
                }
            };

            if let Err(err) = self.update_task(&result).await {
                self.metrics
                    .increment_task_update_error(&self.config.task_name, err.kind());
                info!(
                    task_id = %result.task_id,
                    workflow_instance_id = %result.workflow_instance_id,
                    task_def_name = %self.config.task_name,
                    error_kind = err.kind(),
                    error = &err as &dyn std::error::Error,
                    "failed to update task"
                );
            }
        }
        processed
    }

    /// Poll one batch. The poll counter is bumped before the call; the poll
    /// time only on success.
    pub async fn poll_tasks(&self) -> Result<Vec<Task>, ConductorError> {
        let task_name = &self.config.task_name;
        self.metrics.increment_task_poll(task_name);

        // poll_timeout is not forwarded to the server yet
        let started = Instant::now();
        let tasks = self
            .task_resource
            .batch_poll(
                task_name,
                self.config.batch_size(),
                self.config.worker_id.as_deref(),
                self.config.domain.as_deref(),
            )
            .await?;
        self.metrics.record_task_poll_time(task_name, started.elapsed());

        if !tasks.is_empty() {
            debug!(task_name = %task_name, count = tasks.len(), "polled tasks");
        }
        Ok(tasks)
    }

    /// Run the executor on `task`. A panic inside the executor is reported
    /// as an error of kind `panic`.
    pub async fn execute_task(&self, task: &Task) -> Result<TaskResult, TaskExecutionError> {
        debug!(
            task_id = %task.task_id,
            workflow_instance_id = %task.workflow_instance_id,
            task_def_name = %task.task_def_name,
            "executing task"
        );

        let started = Instant::now();
        let result = match AssertUnwindSafe(self.executor.execute(task))
            .catch_unwind()
            .await
        {
            Ok(result) => result?,
            Err(panic) => {
                return Err(TaskExecutionError::new(
                    "panic",
                    panic_message(panic.as_ref()),
                ));
            }
        };
        let elapsed = started.elapsed();

        self.metrics
            .record_task_execute_time(&task.task_def_name, elapsed);
        self.metrics
            .record_task_result_payload_size(&task.task_def_name, result.payload_size());

        debug!(
            task_id = %task.task_id,
            status = ?result.status,
            elapsed = ?elapsed,
            "executed task"
        );
        Ok(result)
    }

    /// Send `result` to the server.
    pub async fn update_task(&self, result: &TaskResult) -> Result<String, ConductorError> {
        let response = self.task_resource.update_task(result).await?;
        debug!(
            task_id = %result.task_id,
            workflow_instance_id = %result.workflow_instance_id,
            status = ?result.status,
            response = %response,
            "updated task"
        );
        Ok(response)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
