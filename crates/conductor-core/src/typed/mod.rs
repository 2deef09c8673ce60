//! Typed - ワーカー API
//!
//! - **Worker**: 1 つのタスク定義を処理する object-safe な trait
//! - **TaskInput / Handler<T>**: input_data を型付きで受け取る表層 API
//! - **TypedWorker**: Handler<T> を Worker に変換（type erasure）

pub mod handler;
pub mod worker;

// 主要な trait/型 を再エクスポート
pub use self::handler::{Handler, TaskInput, TypedWorker};
pub use self::worker::Worker;
