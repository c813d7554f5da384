//! The controller command table.
//!
//! Each [`CommandDescriptor`] binds a subcommand name and its aliases to a
//! flag-set builder and an action.  The table is static; [`Registry::new`]
//! rejects a table in which a name or alias is claimed twice.

use std::collections::HashMap;
use std::sync::LazyLock;

use clap::{ArgMatches, Command};
use futures::future::BoxFuture;
use thiserror::Error;

use crate::commands::{
    Invocation, create_volume, delete_volume, get_capabilities, get_capacity, list_volumes,
    publish_volume, unpublish_volume, validate_volume,
};
use crate::error::CscError;
use crate::render::{
    CAPABILITY_FORMAT, PUBLISH_INFO_FORMAT, VALIDATION_FORMAT, VOLUME_INFO_FORMAT,
};

/// Runs a command with its parsed flags.
pub type ActionFn =
    for<'a> fn(&'a ArgMatches, &'a Invocation) -> BoxFuture<'a, Result<(), CscError>>;

/// Static description of one subcommand.
#[derive(Clone, Copy)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Positional synopsis shown after the flags in usage output.
    pub usage: &'static str,
    /// Format used when no global format was given.  Empty for commands
    /// that print fixed text.
    pub default_format: &'static str,
    /// Builds the subcommand's flag set under the given name.
    pub flags: fn(&'static str) -> Command,
    pub action: ActionFn,
}

impl CommandDescriptor {
    /// The subcommand's flag set, with aliases attached.
    pub fn command(&self) -> Command {
        (self.flags)(self.name).visible_aliases(self.aliases.iter().copied())
    }

    /// `usage: csc NAME USAGE`
    pub fn usage_line(&self) -> String {
        format!("usage: csc {} {}", self.name, self.usage)
            .trim_end()
            .to_owned()
    }
}

impl std::fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

pub const CONTROLLER_COMMANDS: [CommandDescriptor; 8] = [
    CommandDescriptor {
        name: "createvolume",
        aliases: &["new", "create"],
        usage: "[ARGS...] NAME",
        default_format: VOLUME_INFO_FORMAT,
        flags: create_volume::flags,
        action: create_volume::run,
    },
    CommandDescriptor {
        name: "deletevolume",
        aliases: &["d", "rm", "del"],
        usage: "[ARGS...] ID_KEY[=ID_VAL] [ID_KEY[=ID_VAL]...]",
        default_format: "",
        flags: delete_volume::flags,
        action: delete_volume::run,
    },
    CommandDescriptor {
        name: "controllerpublishvolume",
        aliases: &["att", "attach"],
        usage: "[ARGS...] ID_KEY[=ID_VAL] [ID_KEY[=ID_VAL]...]",
        default_format: PUBLISH_INFO_FORMAT,
        flags: publish_volume::flags,
        action: publish_volume::run,
    },
    CommandDescriptor {
        name: "controllerunpublishvolume",
        aliases: &["det", "detach"],
        usage: "[ARGS...] ID_KEY[=ID_VAL] [ID_KEY[=ID_VAL]...]",
        default_format: "",
        flags: unpublish_volume::flags,
        action: unpublish_volume::run,
    },
    CommandDescriptor {
        name: "validatevolumecapabilities",
        aliases: &["v", "validate"],
        usage: "[ARGS...] ID_KEY[=ID_VAL] [ID_KEY[=ID_VAL]...]",
        default_format: VALIDATION_FORMAT,
        flags: validate_volume::flags,
        action: validate_volume::run,
    },
    CommandDescriptor {
        name: "listvolumes",
        aliases: &["l", "ls", "list"],
        usage: "[ARGS...]",
        default_format: VOLUME_INFO_FORMAT,
        flags: list_volumes::flags,
        action: list_volumes::run,
    },
    CommandDescriptor {
        name: "getcapacity",
        aliases: &["getc", "capacity"],
        usage: "",
        default_format: "",
        flags: get_capacity::flags,
        action: get_capacity::run,
    },
    CommandDescriptor {
        name: "controllergetcapabilities",
        aliases: &["cget"],
        usage: "",
        default_format: CAPABILITY_FORMAT,
        flags: get_capabilities::flags,
        action: get_capabilities::run,
    },
];

/// The process-wide registry built from [`CONTROLLER_COMMANDS`].
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    Registry::new(&CONTROLLER_COMMANDS).expect("controller command table is inconsistent")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command name or alias {key:?} is used by both {first} and {second}")]
    Duplicate {
        key: &'static str,
        first: &'static str,
        second: &'static str,
    },
}

/// Name-or-alias lookup over a fixed descriptor table.
#[derive(Debug)]
pub struct Registry {
    descriptors: &'static [CommandDescriptor],
    index: HashMap<&'static str, usize>,
}

impl Registry {
    pub fn new(descriptors: &'static [CommandDescriptor]) -> Result<Self, RegistryError> {
        let mut index = HashMap::new();
        for (pos, d) in descriptors.iter().enumerate() {
            for key in std::iter::once(d.name).chain(d.aliases.iter().copied()) {
                if let Some(prev) = index.insert(key, pos) {
                    return Err(RegistryError::Duplicate {
                        key,
                        first: descriptors[prev].name,
                        second: d.name,
                    });
                }
            }
        }
        Ok(Self { descriptors, index })
    }

    pub fn lookup(&self, name_or_alias: &str) -> Option<&'static CommandDescriptor> {
        let descriptors = self.descriptors;
        self.index.get(name_or_alias).map(|&pos| &descriptors[pos])
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> &'static [CommandDescriptor] {
        self.descriptors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_and_alias() {
        let reg = &*REGISTRY;
        assert_eq!(reg.lookup("listvolumes").unwrap().name, "listvolumes");
        assert_eq!(reg.lookup("ls").unwrap().name, "listvolumes");
        assert_eq!(reg.lookup("attach").unwrap().name, "controllerpublishvolume");
        assert_eq!(reg.lookup("cget").unwrap().name, "controllergetcapabilities");
        assert!(reg.lookup("nodepublishvolume").is_none());
        assert_eq!(reg.descriptors().len(), 8);
    }

    #[test]
    fn duplicate_alias_is_rejected() {
        static CLASH: [CommandDescriptor; 2] = [
            CommandDescriptor {
                aliases: &["x", "d"],
                ..CONTROLLER_COMMANDS[0]
            },
            CONTROLLER_COMMANDS[1],
        ];
        let err = Registry::new(&CLASH).unwrap_err();
        assert_eq!(
            err,
            RegistryError::Duplicate {
                key: "d",
                first: "createvolume",
                second: "deletevolume",
            }
        );
    }

    #[test]
    fn flag_sets_carry_aliases_and_usage() {
        let d = REGISTRY.lookup("rm").unwrap();
        let cmd = d.command();
        assert_eq!(cmd.get_name(), "deletevolume");
        assert!(cmd.get_visible_aliases().any(|a| a == "del"));
        assert_eq!(
            d.usage_line(),
            "usage: csc deletevolume [ARGS...] ID_KEY[=ID_VAL] [ID_KEY[=ID_VAL]...]"
        );
        cmd.debug_assert();
    }
}
