//! Controller command actions.
//!
//! Every command follows the same pipeline: validate its arguments, build the
//! protocol request (leaving out optional sub-objects that have no data),
//! invoke the RPC, and hand the response to the renderer.  Request builders
//! are plain functions so they can be checked without a controller.

use std::future::Future;
use std::sync::Arc;

use libcsi::{CsiController, Status, Version};
use tracing::warn;

use crate::cancel::Cancellation;
use crate::error::CscError;
use crate::render::{CompileFn, Renderer, Sink};

pub mod create_volume;
pub mod delete_volume;
pub mod get_capabilities;
pub mod get_capacity;
pub mod list_volumes;
pub mod publish_volume;
pub mod unpublish_volume;
pub mod validate_volume;

/// Everything an action needs besides its own arguments.
///
/// Built once per invocation by the dispatcher and passed by reference; no
/// state outlives the invocation.
pub struct Invocation {
    /// The already-established controller channel.
    pub controller: Arc<dyn CsiController>,
    /// Protocol version sent with every request.
    pub version: Version,
    /// Output format string (global flag or the command's default).
    pub format: String,
    /// Strategy that compiles `format`.
    pub compile: CompileFn,
    /// Where rendered output goes.
    pub sink: Sink,
    /// Fired on interrupt or deadline.
    pub cancel: Cancellation,
}

impl Invocation {
    /// Compile the format string into a renderer for this invocation.
    pub fn renderer(&self) -> Result<Renderer, CscError> {
        let format = (self.compile)(&self.format)?;
        Ok(Renderer::new(format, Arc::clone(&self.sink)))
    }

    /// Await an RPC, giving up when the invocation is cancelled.
    ///
    /// Controller errors are returned verbatim; nothing is retried.
    pub async fn call<T, F>(&self, rpc: &'static str, call: F) -> Result<T, CscError>
    where
        F: Future<Output = Result<T, Status>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                warn!(rpc, "controller call cancelled");
                Err(CscError::Cancelled)
            }
            res = call => res.map_err(CscError::from),
        }
    }

    /// Write a fixed line to the sink.
    pub fn print_line(&self, line: &str) -> Result<(), CscError> {
        crate::render::write_line(&self.sink, line)
    }
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("version", &self.version)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}
