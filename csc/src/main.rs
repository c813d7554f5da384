use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::FromArgMatches;
use csc::cli::{self, EXIT_USAGE, GlobalArgs};
use csc::render::{compile_template, stdout_sink};
use csc::{Cancellation, CommandDescriptor, Invocation, REGISTRY, logging};
use libcsi::GrpcController;
use libcsi::transport::client::{ControllerEndpoint, connect};
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli::command(&REGISTRY).get_matches();
    let Some((name, sub)) = matches.subcommand() else {
        return ExitCode::from(EXIT_USAGE);
    };
    let Some(descriptor) = REGISTRY.lookup(name) else {
        return ExitCode::from(EXIT_USAGE);
    };
    let globals = GlobalArgs::from_arg_matches(sub).unwrap_or_else(|e| e.exit());
    logging::init(globals.verbose, globals.log_json);

    let inv = match invocation(descriptor, &globals) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    debug!(command = descriptor.name, ?inv, "dispatching");

    let outcome = (descriptor.action)(sub, &inv).await;
    ExitCode::from(cli::report(descriptor, outcome, &mut std::io::stderr()))
}

fn invocation(descriptor: &CommandDescriptor, globals: &GlobalArgs) -> Result<Invocation> {
    let endpoint: ControllerEndpoint = globals
        .endpoint
        .as_deref()
        .ok_or_else(|| anyhow!("missing endpoint: set --endpoint or CSI_ENDPOINT"))?
        .parse()?;
    let channel = connect(&endpoint, globals.deadline())
        .with_context(|| format!("failed to prepare channel to {endpoint}"))?;

    let cancel = Cancellation::new();
    cancel.cancel_on_interrupt();
    if let Some(deadline) = globals.deadline() {
        cancel.cancel_after(deadline);
    }

    Ok(Invocation {
        controller: Arc::new(GrpcController::new(channel)),
        version: globals.csi_version,
        format: globals.format_for(descriptor),
        compile: compile_template,
        sink: stdout_sink(),
        cancel,
    })
}
