//! MetricsCollector port - テレメトリの抽象化
//!
//! fire-and-forget: 戻り値はなく、ランナーの制御フローに影響しません。

use std::time::Duration;

/// Counters and timers emitted by the task runner.
pub trait MetricsCollector: Send + Sync {
    fn increment_uncaught_exception(&self);

    fn increment_task_poll(&self, task_name: &str);

    fn increment_task_poll_error(&self, task_name: &str, error_kind: &str);

    fn record_task_poll_time(&self, task_name: &str, elapsed: Duration);

    fn increment_task_execution_error(&self, task_id: &str, error_kind: &str);

    fn record_task_execute_time(&self, task_def_name: &str, elapsed: Duration);

    fn record_task_result_payload_size(&self, task_def_name: &str, size_in_bytes: usize);

    fn increment_task_update_error(&self, task_name: &str, error_kind: &str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsCollector for NoopMetrics {
    fn increment_uncaught_exception(&self) {}
    fn increment_task_poll(&self, _task_name: &str) {}
    fn increment_task_poll_error(&self, _task_name: &str, _error_kind: &str) {}
    fn record_task_poll_time(&self, _task_name: &str, _elapsed: Duration) {}
    fn increment_task_execution_error(&self, _task_id: &str, _error_kind: &str) {}
    fn record_task_execute_time(&self, _task_def_name: &str, _elapsed: Duration) {}
    fn record_task_result_payload_size(&self, _task_def_name: &str, _size_in_bytes: usize) {}
    fn increment_task_update_error(&self, _task_name: &str, _error_kind: &str) {}
}
