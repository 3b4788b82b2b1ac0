use crate::command::CommandOutput;
use thiserror::Error;

/// Errors raised while wiring commands at startup.
///
/// These are programming errors and are meant to abort the bootstrap.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate command name or alias '{name}' (already registered by '{existing}')")]
    DuplicateCommand { name: String, existing: String },

    #[error("invalid command name '{0}'")]
    InvalidName(String),
}

/// Errors a command handler may return.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The handler observed the cancellation token and stopped early.
    #[error("interrupted")]
    Interrupted,

    /// The arguments were well formed but not meaningful for the command.
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

pub type CommandResult = Result<CommandOutput, CommandError>;

/// Argument validation failures against an [`crate::ArgSpec`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    #[error("missing argument <{0}>")]
    Missing(String),

    #[error("unexpected argument '{0}'")]
    Unexpected(String),

    #[error("unknown option '{0}'")]
    UnknownFlag(String),

    #[error("option '--{0}' requires a value")]
    MissingValue(String),

    #[error("option '--{0}' does not take a value")]
    UnexpectedValue(String),

    #[error("unterminated quote")]
    UnterminatedQuote,
}
