//! TaskResourceApi port - キューサービス（Task Resource API）の抽象化
//!
//! ランナーはこの trait だけを通してサーバーと通信します。
//!
//! # 実装
//! - `HttpTaskResourceApi`: 本番用（reqwest）
//! - `InMemoryTaskResource`: 開発・テスト用

use async_trait::async_trait;

use crate::domain::{ConductorError, Task, TaskResult};

/// Remote queue operations used by the task runner.
///
/// `worker_id` and `domain` are passed as `None` when the caller has no
/// value for them; implementations must then leave them out of the request
/// entirely so server-side defaults apply.
#[async_trait]
pub trait TaskResourceApi: Send + Sync {
    /// Poll up to `count` tasks from the queue named `task_name`.
    ///
    /// An empty vector means there is nothing to do right now.
    async fn batch_poll(
        &self,
        task_name: &str,
        count: usize,
        worker_id: Option<&str>,
        domain: Option<&str>,
    ) -> Result<Vec<Task>, ConductorError>;

    /// Report a result. The returned body is only logged.
    async fn update_task(&self, result: &TaskResult) -> Result<String, ConductorError>;
}
