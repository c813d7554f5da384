//! `createvolume`: provision a new volume.

use clap::{ArgMatches, Args, Command};
use futures::future::BoxFuture;
use libcsi::{CapacityRange, CreateVolumeRequest, Version, VolumeCapability};
use tracing::{debug, instrument};

use super::Invocation;
use crate::args::{from_matches, parse_key_value, to_map};
use crate::error::CscError;

#[derive(Debug, Clone, Default, Args)]
pub struct CreateVolumeArgs {
    /// The minimum volume size in bytes
    #[arg(long = "requiredBytes", value_name = "BYTES", default_value_t = 0)]
    pub required_bytes: u64,

    /// The maximum volume size in bytes
    #[arg(long = "limitBytes", value_name = "BYTES", default_value_t = 0)]
    pub limit_bytes: u64,

    /// The file system type
    #[arg(short = 't', value_name = "FSTYPE", default_value = "")]
    pub fs_type: String,

    /// The mount flags (repeatable)
    #[arg(short = 'o', value_name = "FLAG")]
    pub mount_flags: Vec<String>,

    /// Additional RPC parameters (repeatable)
    #[arg(long = "params", value_name = "KEY[=VAL]", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Name of the new volume
    #[arg(value_name = "NAME")]
    pub name: Option<String>,
}

pub(crate) fn flags(name: &'static str) -> Command {
    CreateVolumeArgs::augment_args(Command::new(name).about("Create a new volume"))
}

pub(crate) fn run<'a>(
    matches: &'a ArgMatches,
    inv: &'a Invocation,
) -> BoxFuture<'a, Result<(), CscError>> {
    Box::pin(async move { create_volume(&from_matches(matches)?, inv).await })
}

/// Build the request.  The capacity range is sent only when a bound was
/// given, and a single mount capability only when `-t` or `-o` was given.
pub fn build_request(
    args: &CreateVolumeArgs,
    version: Version,
) -> Result<CreateVolumeRequest, CscError> {
    let name = args.name.clone().unwrap_or_default();
    if name.is_empty() {
        return Err(CscError::usage("missing volume name"));
    }

    let capacity_range = (args.required_bytes > 0 || args.limit_bytes > 0).then(|| {
        CapacityRange {
            required_bytes: args.required_bytes,
            limit_bytes: args.limit_bytes,
        }
    });

    let mut volume_capabilities = Vec::new();
    if !args.fs_type.is_empty() || !args.mount_flags.is_empty() {
        volume_capabilities.push(VolumeCapability::mount(
            args.fs_type.clone(),
            args.mount_flags.clone(),
        ));
    }

    Ok(CreateVolumeRequest {
        version: Some(version),
        name,
        capacity_range,
        volume_capabilities,
        parameters: to_map(args.params.iter().map(|(k, v)| (k, v))),
    })
}

#[instrument(skip_all, fields(rpc = "CreateVolume"))]
pub async fn create_volume(args: &CreateVolumeArgs, inv: &Invocation) -> Result<(), CscError> {
    let req = build_request(args, inv.version)?;
    let renderer = inv.renderer()?;

    let resp = inv
        .call("CreateVolume", inv.controller.create_volume(req))
        .await?;
    match resp.volume_info {
        Some(info) => renderer.render(&info),
        None => {
            debug!("controller returned no volume info");
            Ok(())
        }
    }
}
