//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **HttpTaskResourceApi**: 本番用のキューサービスクライアント（reqwest）
//! - **InMemoryTaskResource**: 開発・テスト用のキューサービス
//! - **InMemoryMetrics**: 開発・テスト用のメトリクス収集

pub mod http_task_resource;
pub mod inmem_metrics;
pub mod inmem_task_resource;

// 主要な型を再エクスポート
pub use self::http_task_resource::HttpTaskResourceApi;
pub use self::inmem_metrics::{Aggregate, InMemoryMetrics, MetricsSnapshot};
pub use self::inmem_task_resource::InMemoryTaskResource;
