//! `controllergetcapabilities`: list the RPCs the controller supports.

use clap::{ArgMatches, Command};
use futures::future::BoxFuture;
use libcsi::ControllerGetCapabilitiesRequest;
use tracing::instrument;

use super::Invocation;
use crate::error::CscError;

pub(crate) fn flags(name: &'static str) -> Command {
    Command::new(name).about("Get the capabilities of the controller")
}

pub(crate) fn run<'a>(
    _matches: &'a ArgMatches,
    inv: &'a Invocation,
) -> BoxFuture<'a, Result<(), CscError>> {
    Box::pin(controller_get_capabilities(inv))
}

/// Render every reported capability in response order.
#[instrument(skip_all, fields(rpc = "ControllerGetCapabilities"))]
pub async fn controller_get_capabilities(inv: &Invocation) -> Result<(), CscError> {
    let renderer = inv.renderer()?;
    let req = ControllerGetCapabilitiesRequest {
        version: Some(inv.version),
    };
    let resp = inv
        .call(
            "ControllerGetCapabilities",
            inv.controller.controller_get_capabilities(req),
        )
        .await?;
    renderer.render_all(&resp.capabilities)
}
