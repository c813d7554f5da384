//! `validatevolumecapabilities`: ask whether a volume supports capabilities.

use clap::{ArgMatches, Args, Command};
use futures::future::BoxFuture;
use libcsi::{ValidateVolumeCapabilitiesRequest, Version, VolumeCapability, VolumeId, VolumeInfo};
use tracing::instrument;

use super::Invocation;
use crate::args::{from_matches, require_volume_id};
use crate::error::CscError;

#[derive(Debug, Clone, Default, Args)]
pub struct ValidateVolumeArgs {
    /// The file system type
    #[arg(short = 't', value_name = "FSTYPE", default_value = "")]
    pub fs_type: String,

    /// The mount flags (repeatable)
    #[arg(short = 'o', value_name = "FLAG")]
    pub mount_flags: Vec<String>,

    /// Volume identifier
    #[arg(value_name = "ID_KEY[=ID_VAL]")]
    pub volume_id: Vec<String>,
}

pub(crate) fn flags(name: &'static str) -> Command {
    ValidateVolumeArgs::augment_args(
        Command::new(name).about("Validate the capabilities of a volume"),
    )
}

pub(crate) fn run<'a>(
    matches: &'a ArgMatches,
    inv: &'a Invocation,
) -> BoxFuture<'a, Result<(), CscError>> {
    Box::pin(async move { validate_volume_capabilities(&from_matches(matches)?, inv).await })
}

/// Build the request.
///
/// The file system type and the mount flags become two separate mount
/// capabilities; each is sent only when its source is non-empty.  Both come
/// from this command's own `-t` and `-o`, never from `createvolume`'s flags
/// as older clients did.
pub fn build_request(
    args: &ValidateVolumeArgs,
    version: Version,
) -> Result<ValidateVolumeCapabilitiesRequest, CscError> {
    let volume_id = require_volume_id(&args.volume_id)?;

    let mut volume_capabilities = Vec::with_capacity(2);
    if !args.fs_type.is_empty() {
        volume_capabilities.push(VolumeCapability::mount(args.fs_type.clone(), Vec::new()));
    }
    if !args.mount_flags.is_empty() {
        volume_capabilities.push(VolumeCapability::mount("", args.mount_flags.clone()));
    }

    Ok(ValidateVolumeCapabilitiesRequest {
        version: Some(version),
        volume_info: Some(VolumeInfo {
            id: Some(VolumeId::new(volume_id)),
            ..Default::default()
        }),
        volume_capabilities,
    })
}

#[instrument(skip_all, fields(rpc = "ValidateVolumeCapabilities"))]
pub async fn validate_volume_capabilities(
    args: &ValidateVolumeArgs,
    inv: &Invocation,
) -> Result<(), CscError> {
    let req = build_request(args, inv.version)?;
    let renderer = inv.renderer()?;

    let resp = inv
        .call(
            "ValidateVolumeCapabilities",
            inv.controller.validate_volume_capabilities(req),
        )
        .await?;
    renderer.render(&resp)
}
