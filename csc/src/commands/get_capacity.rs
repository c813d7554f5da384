//! `getcapacity`: report the controller's total capacity.

use clap::{ArgMatches, Command};
use futures::future::BoxFuture;
use libcsi::GetCapacityRequest;
use tracing::instrument;

use super::Invocation;
use crate::error::CscError;

pub(crate) fn flags(name: &'static str) -> Command {
    Command::new(name).about("Get the total capacity available to the controller")
}

pub(crate) fn run<'a>(
    _matches: &'a ArgMatches,
    inv: &'a Invocation,
) -> BoxFuture<'a, Result<(), CscError>> {
    Box::pin(get_capacity(inv))
}

#[instrument(skip_all, fields(rpc = "GetCapacity"))]
pub async fn get_capacity(inv: &Invocation) -> Result<(), CscError> {
    let req = GetCapacityRequest {
        version: Some(inv.version),
    };
    let resp = inv
        .call("GetCapacity", inv.controller.get_capacity(req))
        .await?;
    inv.print_line(&format!("TotalCapacity: {}", resp.total_capacity))
}
