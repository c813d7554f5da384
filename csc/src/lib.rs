//! `csc`: a command line client for CSI controller plugins.
//!
//! | module          | role                                                  |
//! |-----------------|-------------------------------------------------------|
//! | [`registry`]    | static command table, lookup by name or alias         |
//! | [`commands`]    | per-command validate, build, invoke and render         |
//! | [`pagination`]  | token-following listing with concurrent rendering     |
//! | [`task_group`]  | first-error-wins join for the listing's tasks         |
//! | [`render`]      | injected format strategy and the shared output sink   |
//! | [`cli`]         | global options, command tree, exit statuses           |

pub mod args;
pub mod cancel;
pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod pagination;
pub mod registry;
pub mod render;
pub mod task_group;

pub use cancel::Cancellation;
pub use commands::Invocation;
pub use error::CscError;
pub use registry::{CommandDescriptor, REGISTRY, Registry};
