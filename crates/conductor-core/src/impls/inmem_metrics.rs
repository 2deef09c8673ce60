//! InMemoryMetrics - 開発・テスト用のメトリクス収集
//!
//! カウンタと、時間・サイズの集計値 (件数/合計/最大) を保持し、`snapshot()` で取り出せます。
//! エラーは `(tag, kind)` を記録順にすべて保持するので、長時間の本番運用には向きません。

use std::sync::Mutex;
use std::time::Duration;

use crate::ports::MetricsCollector;

/// Count, sum and maximum of recorded samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregate<T> {
    pub count: u64,
    pub total: T,
    pub max: T,
}

impl Aggregate<Duration> {
    fn record(&mut self, sample: Duration) {
        self.count += 1;
        self.total = self.total.saturating_add(sample);
        self.max = self.max.max(sample);
    }

    pub fn mean(&self) -> Option<Duration> {
        let count = u32::try_from(self.count).ok().filter(|&n| n > 0)?;
        Some(self.total / count)
    }
}

impl Aggregate<u64> {
    fn record(&mut self, sample: u64) {
        self.count += 1;
        self.total = self.total.saturating_add(sample);
        self.max = self.max.max(sample);
    }
}

/// Everything recorded so far.
///
/// Error entries are `(tag, error_kind)` pairs, where the tag is the task
/// name (poll/update errors) or the task id (execution errors).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub uncaught_exceptions: u64,
    pub task_polls: u64,
    pub task_poll_errors: Vec<(String, String)>,
    pub task_execution_errors: Vec<(String, String)>,
    pub task_update_errors: Vec<(String, String)>,
    pub poll_times: Aggregate<Duration>,
    pub execute_times: Aggregate<Duration>,
    pub payload_sizes: Aggregate<u64>,
}

#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    inner: Mutex<MetricsSnapshot>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MetricsSnapshot> {
        // a poisoned lock still holds valid counters
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MetricsCollector for InMemoryMetrics {
    fn increment_uncaught_exception(&self) {
        self.lock().uncaught_exceptions += 1;
    }

    fn increment_task_poll(&self, _task_name: &str) {
        self.lock().task_polls += 1;
    }

    fn increment_task_poll_error(&self, task_name: &str, error_kind: &str) {
        self.lock()
            .task_poll_errors
            .push((task_name.to_string(), error_kind.to_string()));
    }

    fn record_task_poll_time(&self, _task_name: &str, elapsed: Duration) {
        self.lock().poll_times.record(elapsed);
    }

    fn increment_task_execution_error(&self, task_id: &str, error_kind: &str) {
        self.lock()
            .task_execution_errors
            .push((task_id.to_string(), error_kind.to_string()));
    }

    fn record_task_execute_time(&self, _task_def_name: &str, elapsed: Duration) {
        self.lock().execute_times.record(elapsed);
    }

    fn record_task_result_payload_size(&self, _task_def_name: &str, size_in_bytes: usize) {
        self.lock()
            .payload_sizes
            .record(u64::try_from(size_in_bytes).unwrap_or(u64::MAX));
    }

    fn increment_task_update_error(&self, task_name: &str, error_kind: &str) {
        self.lock()
            .task_update_errors
            .push((task_name.to_string(), error_kind.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_counters_and_tags() {
        let metrics = InMemoryMetrics::new();
        metrics.increment_task_poll("resize");
        metrics.increment_task_poll("resize");
        metrics.increment_task_poll_error("resize", "ConnectionError");
        metrics.increment_uncaught_exception();
        metrics.record_task_result_payload_size("resize", 120);

        let snap = metrics.snapshot();
        assert_eq!(snap.task_polls, 2);
        assert_eq!(snap.uncaught_exceptions, 1);
        assert_eq!(
            snap.task_poll_errors,
            vec![("resize".to_string(), "ConnectionError".to_string())]
        );
        assert_eq!(
            snap.payload_sizes,
            Aggregate {
                count: 1,
                total: 120,
                max: 120
            }
        );
        assert!(snap.task_update_errors.is_empty());
    }

    #[test]
    fn timings_are_aggregated_not_retained() {
        let metrics = InMemoryMetrics::new();
        for ms in [10, 30, 20] {
            metrics.record_task_poll_time("resize", Duration::from_millis(ms));
        }
        for _ in 0..10_000 {
            metrics.record_task_execute_time("resize", Duration::from_millis(1));
        }

        let snap = metrics.snapshot();
        assert_eq!(snap.poll_times.count, 3);
        assert_eq!(snap.poll_times.total, Duration::from_millis(60));
        assert_eq!(snap.poll_times.max, Duration::from_millis(30));
        assert_eq!(snap.poll_times.mean(), Some(Duration::from_millis(20)));
        assert_eq!(snap.execute_times.count, 10_000);
        assert_eq!(snap.execute_times.total, Duration::from_secs(10));
        assert_eq!(Aggregate::<Duration>::default().mean(), None);
    }
}
