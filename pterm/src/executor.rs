//! Turns a submitted line into output.
//!
//! A line goes through tokenizing, command resolution and argument
//! validation before the handler runs. Handlers are polled once; one that
//! finishes on the first poll settles immediately, anything else becomes a
//! [`PendingExecution`] that the controller drives to completion.

use crate::parser::tokenize;
use crate::registry::CommandRegistry;
use futures::FutureExt;
use futures::future::BoxFuture;
use pterm_types::{
    ArgError, CommandError, CommandLine, CommandResult, Effect, ExecutionContext, OutputBlock,
    PROGRAM_NAME,
};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Failures surfaced to the user as an `Error` block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("{0}: command not found")]
    UnknownCommand(String),

    #[error("{command}: {reason}")]
    InvalidArguments {
        command: String,
        reason: String,
        /// Usage line plus help text, when the command is known.
        usage: Option<String>,
    },

    #[error("{command}: {message}")]
    HandlerFailure { command: String, message: String },

    #[error("{command}: interrupted")]
    Interrupted { command: String },
}

impl ExecError {
    /// Render as one `Error` block: the message line, then usage if any.
    pub fn to_block(&self) -> OutputBlock {
        let mut block = OutputBlock::error(format!("{PROGRAM_NAME}: {self}"));
        if let ExecError::InvalidArguments {
            usage: Some(usage), ..
        } = self
        {
            block.lines.extend(usage.lines().map(str::to_string));
        }
        block
    }
}

/// The settled result of one command line.
#[derive(Debug, Default)]
pub struct Settled {
    pub blocks: Vec<OutputBlock>,
    pub effects: Vec<Effect>,
    pub error: Option<ExecError>,
}

impl Settled {
    fn failed(err: ExecError) -> Self {
        debug!("execution failed: {err}");
        Self {
            blocks: vec![err.to_block()],
            effects: Vec::new(),
            error: Some(err),
        }
    }
}

/// What [`CommandExecutor::execute`] hands back.
pub enum Execution {
    /// Finished without suspending.
    Ready(Settled),
    /// Suspended; drive it with [`PendingExecution::wait`].
    Pending(PendingExecution),
}

type Outcome = Result<CommandResult, Box<dyn Any + Send>>;

/// A handler that suspended on its first poll.
pub struct PendingExecution {
    command: String,
    usage: String,
    future: BoxFuture<'static, Outcome>,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl PendingExecution {
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn is_interrupted(&self) -> bool {
        self.deadline.is_some()
    }

    /// Cancel the handler's token. It then has `grace` to settle before its
    /// future is dropped. Repeated interrupts keep the first deadline.
    pub fn interrupt(&mut self, grace: Duration) {
        if self.deadline.is_some() {
            return;
        }
        debug!("interrupt requested: {}", self.command);
        self.cancel.cancel();
        self.deadline = Some(Instant::now() + grace);
    }

    /// Drive the handler until it settles.
    ///
    /// Cancel safe: dropping this future leaves the handler in place, and a
    /// later call picks up where it left off.
    pub async fn wait(&mut self) -> Settled {
        let outcome = match self.deadline {
            Some(deadline) => {
                match tokio::time::timeout_at(deadline, &mut self.future).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!("{} ignored the interrupt; dropping it", self.command);
                        return Settled::failed(ExecError::Interrupted {
                            command: self.command.clone(),
                        });
                    }
                }
            }
            None => (&mut self.future).await,
        };
        settle(&self.command, &self.usage, outcome, self.is_interrupted())
    }
}

/// Runs command lines against a registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Parse, resolve, validate and start `line`.
    ///
    /// `ctx` is the snapshot the handler will see; its `command` field is
    /// filled in here once the command is resolved.
    pub fn execute(
        &self,
        line: &CommandLine,
        registry: &CommandRegistry,
        mut ctx: ExecutionContext,
    ) -> Execution {
        debug!("parsing: {:?}", line.raw());
        let tokens = match tokenize(line.raw()) {
            Ok(tokens) => tokens,
            Err(err) => {
                return Execution::Ready(Settled::failed(syntax_error(line, registry, err)));
            }
        };
        let Some((token, rest)) = tokens.split_first() else {
            return Execution::Ready(Settled::default());
        };

        debug!("resolving: {token}");
        let Some(descriptor) = registry.resolve(token) else {
            return Execution::Ready(Settled::failed(ExecError::UnknownCommand(token.clone())));
        };

        debug!("validating: {} {:?}", descriptor.name, rest);
        let args = match descriptor.arg_spec.parse(rest) {
            Ok(args) => args,
            Err(err) => {
                return Execution::Ready(Settled::failed(ExecError::InvalidArguments {
                    command: descriptor.name.clone(),
                    reason: err.to_string(),
                    usage: Some(usage_text(&descriptor.usage(), &descriptor.help)),
                }));
            }
        };

        debug!("executing: {}", descriptor.name);
        ctx.command = descriptor.name.clone();
        let cancel = ctx.cancel.clone();
        let handler = descriptor.handler.clone();
        let mut future = AssertUnwindSafe(async move { handler.execute(args, ctx).await })
            .catch_unwind()
            .boxed();

        let usage = usage_text(&descriptor.usage(), &descriptor.help);
        match (&mut future).now_or_never() {
            Some(outcome) => Execution::Ready(settle(&descriptor.name, &usage, outcome, false)),
            None => {
                debug!("{} suspended", descriptor.name);
                Execution::Pending(PendingExecution {
                    command: descriptor.name.clone(),
                    usage,
                    future,
                    cancel,
                    deadline: None,
                })
            }
        }
    }
}

fn usage_text(usage: &str, help: &str) -> String {
    if help.is_empty() {
        usage.to_string()
    } else {
        format!("{usage}\n{help}")
    }
}

/// Tokenizing failed, so name the command by its first word if possible.
fn syntax_error(line: &CommandLine, registry: &CommandRegistry, err: ArgError) -> ExecError {
    let first = line
        .raw()
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches('"');
    match registry.resolve(first) {
        Some(descriptor) => ExecError::InvalidArguments {
            command: descriptor.name.clone(),
            reason: err.to_string(),
            usage: Some(usage_text(&descriptor.usage(), &descriptor.help)),
        },
        None => ExecError::InvalidArguments {
            command: first.to_string(),
            reason: err.to_string(),
            usage: None,
        },
    }
}

fn settle(command: &str, usage: &str, outcome: Outcome, interrupted: bool) -> Settled {
    match outcome {
        Ok(Ok(output)) => {
            debug!("settled: {command}");
            let mut settled = Settled {
                blocks: output.blocks,
                effects: output.effects,
                error: None,
            };
            if interrupted {
                settled.blocks.push(OutputBlock::info(&format!(
                    "{PROGRAM_NAME}: {command}: interrupt was not honoured; command completed"
                )));
            }
            settled
        }
        Ok(Err(CommandError::Interrupted)) => Settled::failed(ExecError::Interrupted {
            command: command.to_string(),
        }),
        Ok(Err(CommandError::Usage(reason))) => Settled::failed(ExecError::InvalidArguments {
            command: command.to_string(),
            reason,
            usage: Some(usage.to_string()),
        }),
        Ok(Err(CommandError::Failed(err))) => {
            warn!("{command} failed: {err:?}");
            let message = err.to_string();
            let message = message.lines().next().unwrap_or("failed").to_string();
            Settled::failed(ExecError::HandlerFailure {
                command: command.to_string(),
                message,
            })
        }
        Err(payload) => {
            error!("{command} panicked: {}", panic_message(payload.as_ref()));
            Settled::failed(ExecError::HandlerFailure {
                command: command.to_string(),
                message: "internal error".to_string(),
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
