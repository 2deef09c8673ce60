//! Errors - ワーカーが扱うエラー型
//!
//! - **ConductorError**: キューサービス（HTTP API）呼び出しの失敗
//! - **TaskExecutionError**: ユーザーのタスクロジックの失敗
//!
//! どちらも `kind()` で「例外の型名」に相当するタグを返し、
//! メトリクスとログで使用します。

use std::fmt;

use thiserror::Error;

/// Failure of a call to the queue service.
#[derive(Debug, Error)]
pub enum ConductorError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl ConductorError {
    /// Type tag used in metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ConductorError::Http { .. } => "HttpError",
            ConductorError::Status { .. } => "StatusError",
            ConductorError::Decode { .. } => "DecodeError",
            ConductorError::Connection(_) => "ConnectionError",
            ConductorError::Config(_) => "ConfigError",
            ConductorError::Other(_) => "Error",
        }
    }
}

/// Failure raised by user task logic.
///
/// Any `std::error::Error` converts into this with `?`, keeping the short
/// type name of the original error as `kind` and its display text as
/// `message`. The message becomes the result's `reason_for_incompletion`.
///
/// This type intentionally does not implement `std::error::Error`, otherwise
/// the blanket `From` impl would overlap with `From<T> for T`.
#[derive(Debug)]
pub struct TaskExecutionError {
    kind: String,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TaskExecutionError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Plain message without a more specific type.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }

    pub fn from_boxed(error: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self {
            kind: "Error".to_string(),
            message: error.to_string(),
            source: Some(error),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }
}

impl fmt::Display for TaskExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<E> From<E> for TaskExecutionError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self {
            kind: short_type_name::<E>().to_string(),
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }
}

/// `my_crate::errors::ValueError<T>` -> `ValueError`
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
