//! Top-level command line: global options, the subcommand tree built from the
//! registry, and the mapping from an action's outcome to an exit status.

use std::io::Write;
use std::time::Duration;

use clap::{ArgAction, Args, Command};
use libcsi::Version;

use crate::error::CscError;
use crate::registry::{CommandDescriptor, Registry};

/// Exit status for a failed usage check.
pub const EXIT_USAGE: u8 = 2;
/// Exit status when the invocation was interrupted or timed out.
pub const EXIT_CANCELLED: u8 = 130;

/// Options accepted before or after any subcommand.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// The CSI endpoint (unix://PATH, tcp://HOST:PORT or HOST:PORT)
    #[arg(short = 'e', long, env = "CSI_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// The output template; defaults to a per-command format
    #[arg(short = 'f', long, env = "CSI_FORMAT", global = true)]
    pub format: Option<String>,

    /// The CSI protocol version sent with every request
    #[arg(
        long = "csiVersion",
        value_name = "VERSION",
        env = "CSI_VERSION",
        default_value = "0.1.0",
        global = true
    )]
    pub csi_version: Version,

    /// Cancel the invocation after this many seconds
    #[arg(long, value_name = "SECS", env = "CSI_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,
}

impl GlobalArgs {
    pub fn deadline(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// The template to render with: `--format` or the command's default.
    pub fn format_for(&self, descriptor: &CommandDescriptor) -> String {
        self.format
            .clone()
            .unwrap_or_else(|| descriptor.default_format.to_owned())
    }
}

/// The full `csc` command tree.
pub fn command(registry: &Registry) -> Command {
    let root = Command::new("csc")
        .about("A command line client for CSI controller plugins")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true);
    GlobalArgs::augment_args(root)
        .subcommands(registry.descriptors().iter().map(CommandDescriptor::command))
}

/// Report a finished invocation on `stderr` and pick the exit status.
pub fn report(
    descriptor: &CommandDescriptor,
    outcome: Result<(), CscError>,
    stderr: &mut dyn Write,
) -> u8 {
    let err = match outcome {
        Ok(()) => return 0,
        Err(err) => err,
    };
    // Nothing useful can be done if stderr itself is gone.
    let _ = match &err {
        CscError::Usage(msg) => writeln!(
            stderr,
            "error: {msg}\n{}\n\n{}",
            descriptor.usage_line(),
            descriptor.command().render_help()
        ),
        _ => writeln!(stderr, "error: {err}"),
    };
    exit_code(&err)
}

pub fn exit_code(err: &CscError) -> u8 {
    match err {
        CscError::Usage(_) => EXIT_USAGE,
        CscError::Cancelled => EXIT_CANCELLED,
        _ => 1,
    }
}
