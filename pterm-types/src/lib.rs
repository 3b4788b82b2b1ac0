//! Types shared between the terminal core, the builtin commands and the
//! content collaborators.

pub mod command;
pub mod content;
pub mod error;
pub mod input;
pub mod output;

pub use command::{
    ArgDef, ArgSpec, CommandDescriptor, CommandHandler, CommandLine, CommandOutput,
    CommandSummary, Effect, ExecutionContext, FlagDef, FnHandler, ParsedArgs,
};
pub use content::{ContentSource, Post, Profile, Project};
pub use error::{ArgError, CommandError, CommandResult, RegistryError};
pub use input::{KeyEvent, KeyKind};
pub use output::{BlockKind, OutputBlock};

/// Name used as the prefix of user facing error messages.
pub const PROGRAM_NAME: &str = "pterm";
