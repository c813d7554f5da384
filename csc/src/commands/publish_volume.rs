//! `controllerpublishvolume`: make a volume available on a node.

use clap::{ArgMatches, Args, Command};
use futures::future::BoxFuture;
use libcsi::{ControllerPublishVolumeRequest, NodeId, Version, VolumeId, VolumeMetadata};
use tracing::instrument;

use super::Invocation;
use crate::args::{from_matches, non_empty_map, parse_key_value, require_volume_id};
use crate::error::CscError;

#[derive(Debug, Clone, Default, Args)]
pub struct PublishVolumeArgs {
    /// The metadata of the volume to be used on a node (repeatable)
    #[arg(long = "metadata", value_name = "KEY[=VAL]", value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,

    /// The ID of the node to which the volume should be published (repeatable)
    #[arg(long = "nodeID", value_name = "KEY[=VAL]", value_parser = parse_key_value)]
    pub node_id: Vec<(String, String)>,

    /// Publish the volume in read-only mode
    #[arg(long = "ro")]
    pub read_only: bool,

    /// Volume identifier
    #[arg(value_name = "ID_KEY[=ID_VAL]")]
    pub volume_id: Vec<String>,
}

pub(crate) fn flags(name: &'static str) -> Command {
    PublishVolumeArgs::augment_args(Command::new(name).about("Publish a volume to a node"))
}

pub(crate) fn run<'a>(
    matches: &'a ArgMatches,
    inv: &'a Invocation,
) -> BoxFuture<'a, Result<(), CscError>> {
    Box::pin(async move { controller_publish_volume(&from_matches(matches)?, inv).await })
}

pub fn build_request(
    args: &PublishVolumeArgs,
    version: Version,
) -> Result<ControllerPublishVolumeRequest, CscError> {
    let volume_id = require_volume_id(&args.volume_id)?;
    Ok(ControllerPublishVolumeRequest {
        version: Some(version),
        volume_id: Some(VolumeId::new(volume_id)),
        volume_metadata: non_empty_map(&args.metadata).map(|values| VolumeMetadata { values }),
        node_id: non_empty_map(&args.node_id).map(|values| NodeId { values }),
        readonly: args.read_only,
    })
}

#[instrument(skip_all, fields(rpc = "ControllerPublishVolume"))]
pub async fn controller_publish_volume(
    args: &PublishVolumeArgs,
    inv: &Invocation,
) -> Result<(), CscError> {
    let req = build_request(args, inv.version)?;
    let renderer = inv.renderer()?;

    let resp = inv
        .call(
            "ControllerPublishVolume",
            inv.controller.controller_publish_volume(req),
        )
        .await?;
    renderer.render(&resp.publish_volume_info.unwrap_or_default())
}
