//! Errors surfaced by command actions.
//!
//! Every action returns [`CscError`] to the dispatcher unchanged; the
//! dispatcher decides how each kind is reported and which exit status it maps
//! to.

use thiserror::Error;

/// Failure of a single command invocation.
#[derive(Debug, Error)]
pub enum CscError {
    /// Required positional or flag arguments are missing.  The dispatcher
    /// follows this with the command's usage text.
    #[error("{0}")]
    Usage(String),

    /// An argument was present but outside its representable range.
    #[error("{0}")]
    Validation(String),

    /// The output template failed to compile or to execute.
    #[error("template error: {0}")]
    Template(String),

    /// The controller call itself failed.
    #[error(transparent)]
    Rpc(#[from] tonic::Status),

    /// The invocation was cancelled (interrupt or deadline).
    #[error("operation cancelled")]
    Cancelled,

    /// Writing to the output sink failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// A helper task died without reporting a result.
    #[error("task failed: {0}")]
    TaskFailed(String),
}

impl CscError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub fn template<E: std::fmt::Display>(e: E) -> Self {
        Self::Template(e.to_string())
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}
