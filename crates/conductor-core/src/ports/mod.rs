//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! ランナーが依存する外部の協調者はすべて trait として注入されます。
//!
//! - **TaskResourceApi**: キューサービス（poll / update）
//! - **MetricsCollector**: テレメトリ（カウンタ・タイマー）
//! - **TaskExecutor**: ユーザーのタスクロジック

pub mod executor;
pub mod metrics;
pub mod task_resource;

// 主要な trait を再エクスポート
pub use self::executor::{BlockingFnExecutor, FnExecutor, TaskExecutor};
pub use self::metrics::{MetricsCollector, NoopMetrics};
pub use self::task_resource::TaskResourceApi;
pub use crate::domain::TaskExecutionError;
