//! `listvolumes`: list volumes, optionally following continuation tokens.

use std::sync::Arc;

use clap::{ArgMatches, Args, Command};
use futures::future::BoxFuture;
use libcsi::{ListVolumesRequest, VolumeInfo};
use tracing::{debug, instrument};

use super::Invocation;
use crate::args::from_matches;
use crate::error::CscError;
use crate::pagination::{Page, PaginationState, paginate};

#[derive(Debug, Clone, Default, Args)]
pub struct ListVolumesArgs {
    /// The token from which to start listing
    #[arg(
        long = "startingToken",
        value_name = "TOKEN",
        env = "CSI_STARTING_TOKEN",
        default_value = ""
    )]
    pub starting_token: String,

    /// The maximum number of entries per page (0 lets the controller decide)
    #[arg(
        long = "maxEntries",
        value_name = "N",
        env = "CSI_MAX_ENTRIES",
        default_value_t = 0
    )]
    pub max_entries: u64,

    /// Keep fetching pages until the controller returns no token
    #[arg(long = "paging")]
    pub paging: bool,
}

pub(crate) fn flags(name: &'static str) -> Command {
    ListVolumesArgs::augment_args(Command::new(name).about("List volumes"))
}

pub(crate) fn run<'a>(
    matches: &'a ArgMatches,
    inv: &'a Invocation,
) -> BoxFuture<'a, Result<(), CscError>> {
    Box::pin(async move { list_volumes(&from_matches(matches)?, inv).await })
}

/// Turn the arguments into the listing's initial state.
pub fn pagination_state(args: &ListVolumesArgs) -> Result<PaginationState, CscError> {
    let max_entries = u32::try_from(args.max_entries).map_err(|_| {
        CscError::Validation(format!("max entries > uint32: {}", args.max_entries))
    })?;
    Ok(PaginationState {
        starting_token: args.starting_token.clone(),
        max_entries,
        auto_page: args.paging,
    })
}

#[instrument(skip_all, fields(rpc = "ListVolumes", paging = args.paging))]
pub async fn list_volumes(args: &ListVolumesArgs, inv: &Invocation) -> Result<(), CscError> {
    let state = pagination_state(args)?;
    let renderer = inv.renderer()?;

    let controller = Arc::clone(&inv.controller);
    let version = inv.version;
    let max_entries = state.max_entries;
    let fetch = move |starting_token: String| {
        let controller = Arc::clone(&controller);
        async move {
            let resp = controller
                .list_volumes(ListVolumesRequest {
                    version: Some(version),
                    max_entries,
                    starting_token,
                })
                .await?;
            Ok::<_, CscError>(Page {
                items: resp
                    .entries
                    .into_iter()
                    .map(|entry| {
                        entry.volume_info.unwrap_or_else(|| {
                            debug!("list entry without volume info");
                            VolumeInfo::default()
                        })
                    })
                    .collect(),
                next_token: resp.next_token,
            })
        }
    };
    let render = move |info: &VolumeInfo| renderer.render(info);

    paginate(state, fetch, render, &inv.cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_entries_must_fit_in_u32() {
        let args = ListVolumesArgs {
            max_entries: u64::from(u32::MAX) + 1,
            ..Default::default()
        };
        let err = pagination_state(&args).unwrap_err();
        assert!(matches!(&err, CscError::Validation(_)));
        assert_eq!(err.to_string(), "max entries > uint32: 4294967296");

        let args = ListVolumesArgs {
            max_entries: u64::from(u32::MAX),
            starting_token: "t0".into(),
            paging: true,
        };
        let state = pagination_state(&args).unwrap();
        assert_eq!(state.max_entries, u32::MAX);
        assert_eq!(state.starting_token, "t0");
        assert!(state.auto_page);
    }

    #[test]
    fn defaults_fetch_one_page_from_the_start() {
        let state = pagination_state(&ListVolumesArgs::default()).unwrap();
        assert_eq!(state, PaginationState::default());
    }
}
