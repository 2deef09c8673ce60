//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてワーカーのロジックを実装します。
//!
//! # 主要コンポーネント
//! - **TaskRunner**: 1 つのキューに対する poll→execute→update ループ
//! - **WorkerGroup**: ワーカーごとに TaskRunner を起動・停止

pub mod task_runner;
pub mod worker_group;

// 主要な型を再エクスポート
pub use self::task_runner::TaskRunner;
pub use self::worker_group::WorkerGroup;
