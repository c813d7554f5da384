//! `deletevolume`: delete a volume by identifier.

use clap::{ArgMatches, Args, Command};
use futures::future::BoxFuture;
use libcsi::{DeleteVolumeRequest, Version, VolumeId, VolumeMetadata};
use tracing::instrument;

use super::Invocation;
use crate::args::{from_matches, non_empty_map, parse_key_value, require_volume_id};
use crate::error::CscError;

#[derive(Debug, Clone, Default, Args)]
pub struct DeleteVolumeArgs {
    /// The metadata of the volume to be deleted (repeatable)
    #[arg(long = "metadata", value_name = "KEY[=VAL]", value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,

    /// Volume identifier
    #[arg(value_name = "ID_KEY[=ID_VAL]")]
    pub volume_id: Vec<String>,
}

pub(crate) fn flags(name: &'static str) -> Command {
    DeleteVolumeArgs::augment_args(Command::new(name).about("Delete a volume"))
}

pub(crate) fn run<'a>(
    matches: &'a ArgMatches,
    inv: &'a Invocation,
) -> BoxFuture<'a, Result<(), CscError>> {
    Box::pin(async move { delete_volume(&from_matches(matches)?, inv).await })
}

pub fn build_request(
    args: &DeleteVolumeArgs,
    version: Version,
) -> Result<DeleteVolumeRequest, CscError> {
    let volume_id = require_volume_id(&args.volume_id)?;
    Ok(DeleteVolumeRequest {
        version: Some(version),
        volume_id: Some(VolumeId::new(volume_id)),
        volume_metadata: non_empty_map(&args.metadata).map(|values| VolumeMetadata { values }),
    })
}

#[instrument(skip_all, fields(rpc = "DeleteVolume"))]
pub async fn delete_volume(args: &DeleteVolumeArgs, inv: &Invocation) -> Result<(), CscError> {
    let req = build_request(args, inv.version)?;
    inv.call("DeleteVolume", inv.controller.delete_volume(req))
        .await?;
    inv.print_line("Success")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_id_is_a_usage_error() {
        let err = build_request(&DeleteVolumeArgs::default(), Version::default()).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn metadata_only_when_supplied() {
        let mut args = DeleteVolumeArgs {
            volume_id: vec!["id=vol-1".into()],
            ..Default::default()
        };
        let req = build_request(&args, Version::default()).unwrap();
        assert_eq!(req.volume_id.unwrap().values["id"], "vol-1");
        assert!(req.volume_metadata.is_none());

        args.metadata = vec![("owner".into(), "ops".into())];
        let req = build_request(&args, Version::default()).unwrap();
        assert_eq!(req.volume_metadata.unwrap().values["owner"], "ops");
    }
}
