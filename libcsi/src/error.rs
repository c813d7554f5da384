//! CSI client error types.
//!
//! RPC failures are surfaced as the verbatim [`tonic::Status`] returned by
//! the controller; [`CsiError`] covers everything that can go wrong before a
//! call is made, such as an unparsable endpoint or version.

use thiserror::Error;

/// Errors raised while preparing to talk to a CSI controller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CsiError {
    /// The endpoint string could not be understood.
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint {
        /// The endpoint as supplied by the caller.
        endpoint: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The caller supplied an invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CsiError {
    pub(crate) fn endpoint(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: reason.into(),
        }
    }
}
