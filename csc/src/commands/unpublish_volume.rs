//! `controllerunpublishvolume`: detach a volume from a node.

use clap::{ArgMatches, Args, Command};
use futures::future::BoxFuture;
use libcsi::{ControllerUnpublishVolumeRequest, NodeId, Version, VolumeId, VolumeMetadata};
use tracing::instrument;

use super::Invocation;
use crate::args::{from_matches, non_empty_map, parse_key_value, require_volume_id};
use crate::error::CscError;

#[derive(Debug, Clone, Default, Args)]
pub struct UnpublishVolumeArgs {
    /// The metadata of the volume (repeatable)
    #[arg(long = "metadata", value_name = "KEY[=VAL]", value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,

    /// The ID of the node on which the volume is published (repeatable)
    #[arg(long = "nodeID", value_name = "KEY[=VAL]", value_parser = parse_key_value)]
    pub node_id: Vec<(String, String)>,

    /// Volume identifier
    #[arg(value_name = "ID_KEY[=ID_VAL]")]
    pub volume_id: Vec<String>,
}

pub(crate) fn flags(name: &'static str) -> Command {
    UnpublishVolumeArgs::augment_args(Command::new(name).about("Unpublish a volume from a node"))
}

pub(crate) fn run<'a>(
    matches: &'a ArgMatches,
    inv: &'a Invocation,
) -> BoxFuture<'a, Result<(), CscError>> {
    Box::pin(async move { controller_unpublish_volume(&from_matches(matches)?, inv).await })
}

pub fn build_request(
    args: &UnpublishVolumeArgs,
    version: Version,
) -> Result<ControllerUnpublishVolumeRequest, CscError> {
    let volume_id = require_volume_id(&args.volume_id)?;
    Ok(ControllerUnpublishVolumeRequest {
        version: Some(version),
        volume_id: Some(VolumeId::new(volume_id)),
        volume_metadata: non_empty_map(&args.metadata).map(|values| VolumeMetadata { values }),
        node_id: non_empty_map(&args.node_id).map(|values| NodeId { values }),
    })
}

#[instrument(skip_all, fields(rpc = "ControllerUnpublishVolume"))]
pub async fn controller_unpublish_volume(
    args: &UnpublishVolumeArgs,
    inv: &Invocation,
) -> Result<(), CscError> {
    let req = build_request(args, inv.version)?;
    inv.call(
        "ControllerUnpublishVolume",
        inv.controller.controller_unpublish_volume(req),
    )
    .await?;
    inv.print_line("Success")
}
