//! Domain model (tasks, results, errors).
//!
//! - task: キューから取得したタスク
//! - task_result: サーバーへ報告する実行結果
//! - errors: キューサービスとユーザーロジックのエラー

pub mod errors;
pub mod task;
pub mod task_result;

pub use self::errors::{ConductorError, TaskExecutionError};
pub use self::task::Task;
pub use self::task_result::{TaskExecLog, TaskResult, TaskResultStatus};
