//! conductor-core
//!
//! Worker-side building blocks for a Conductor task queue: poll tasks from a
//! named queue, run user logic on each one, and report the result back.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（Task, TaskResult, errors）
//! - **ports**: 抽象化レイヤー（TaskResourceApi, MetricsCollector, TaskExecutor）
//! - **app**: アプリケーションロジック（TaskRunner, WorkerGroup）
//! - **typed**: ワーカー API（Worker trait, TaskInput, Handler, TypedWorker）
//! - **impls**: 実装（HttpTaskResourceApi, InMemoryTaskResource, InMemoryMetrics）
//! - **config**: 接続設定とランナー設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod typed;

pub use app::{TaskRunner, WorkerGroup};
pub use config::{Configuration, TaskRunnerConfig};
pub use domain::{ConductorError, Task, TaskExecutionError, TaskResult, TaskResultStatus};
