//! Command descriptors, argument specifications and the handler interface.

use crate::error::{ArgError, CommandResult};
use crate::output::OutputBlock;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The exact text a user submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandLine {
    raw: String,
}

impl CommandLine {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Positional argument definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgDef {
    pub name: String,
    pub required: bool,
}

/// Option definition (`--long`, `-s`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDef {
    pub long: String,
    pub short: Option<char>,
    /// Whether it takes a value (`--limit 5`) or is a plain switch
    pub takes_value: bool,
}

/// Expected arguments of a command.
///
/// Positionals are matched in order; a variadic tail accepts any number of
/// extra positionals. Flags may appear anywhere and `--` ends flag parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgSpec {
    positional: Vec<ArgDef>,
    variadic: Option<String>,
    flags: Vec<FlagDef>,
}

impl ArgSpec {
    /// A command that takes no arguments.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: &str) -> Self {
        self.positional.push(ArgDef {
            name: name.to_string(),
            required: true,
        });
        self
    }

    pub fn optional(mut self, name: &str) -> Self {
        self.positional.push(ArgDef {
            name: name.to_string(),
            required: false,
        });
        self
    }

    pub fn variadic(mut self, name: &str) -> Self {
        self.variadic = Some(name.to_string());
        self
    }

    /// Boolean switch.
    pub fn flag(mut self, long: &str, short: Option<char>) -> Self {
        self.flags.push(FlagDef {
            long: long.to_string(),
            short,
            takes_value: false,
        });
        self
    }

    /// Option that takes a value.
    pub fn option(mut self, long: &str, short: Option<char>) -> Self {
        self.flags.push(FlagDef {
            long: long.to_string(),
            short,
            takes_value: true,
        });
        self
    }

    pub fn positional(&self) -> &[ArgDef] {
        &self.positional
    }

    pub fn flags(&self) -> &[FlagDef] {
        &self.flags
    }

    /// One-line usage string, e.g. `usage: open <section> [--new-tab]`.
    pub fn usage(&self, command: &str) -> String {
        let mut usage = format!("usage: {command}");
        for arg in &self.positional {
            if arg.required {
                usage.push_str(&format!(" <{}>", arg.name));
            } else {
                usage.push_str(&format!(" [{}]", arg.name));
            }
        }
        if let Some(name) = &self.variadic {
            usage.push_str(&format!(" [{name}...]"));
        }
        for flag in &self.flags {
            if flag.takes_value {
                usage.push_str(&format!(" [--{0} <{0}>]", flag.long));
            } else {
                usage.push_str(&format!(" [--{}]", flag.long));
            }
        }
        usage
    }

    /// Validate tokens (command token excluded) against this spec.
    pub fn parse(&self, tokens: &[String]) -> Result<ParsedArgs, ArgError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = tokens.iter();
        let mut flags_done = false;

        while let Some(token) = iter.next() {
            if flags_done {
                parsed.positional.push(token.clone());
                continue;
            }
            if token == "--" {
                flags_done = true;
                continue;
            }
            if let Some(body) = token.strip_prefix("--")
                && !body.is_empty()
            {
                let (name, inline) = match body.split_once('=') {
                    Some((name, value)) => (name, Some(value.to_string())),
                    None => (body, None),
                };
                let flag = self
                    .flags
                    .iter()
                    .find(|f| f.long == name)
                    .ok_or_else(|| ArgError::UnknownFlag(token.clone()))?;
                let value = flag_value(flag, inline, &mut iter)?;
                parsed.flags.insert(flag.long.clone(), value);
                continue;
            }
            if let Some(short) = short_flag(token) {
                let flag = self
                    .flags
                    .iter()
                    .find(|f| f.short == Some(short))
                    .ok_or_else(|| ArgError::UnknownFlag(token.clone()))?;
                let value = flag_value(flag, None, &mut iter)?;
                parsed.flags.insert(flag.long.clone(), value);
                continue;
            }
            parsed.positional.push(token.clone());
        }

        let given = parsed.positional.len();
        if let Some(missing) = self
            .positional
            .iter()
            .skip(given)
            .find(|arg| arg.required)
        {
            return Err(ArgError::Missing(missing.name.clone()));
        }
        if self.variadic.is_none() && given > self.positional.len() {
            return Err(ArgError::Unexpected(
                parsed.positional[self.positional.len()].clone(),
            ));
        }

        Ok(parsed)
    }
}

fn short_flag(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('-'), Some(ch), None) if ch.is_ascii_alphabetic() => Some(ch),
        _ => None,
    }
}

fn flag_value(
    flag: &FlagDef,
    inline: Option<String>,
    rest: &mut std::slice::Iter<'_, String>,
) -> Result<Option<String>, ArgError> {
    match (flag.takes_value, inline) {
        (true, Some(value)) => Ok(Some(value)),
        (true, None) => rest
            .next()
            .map(|value| Some(value.clone()))
            .ok_or_else(|| ArgError::MissingValue(flag.long.clone())),
        (false, Some(_)) => Err(ArgError::UnexpectedValue(flag.long.clone())),
        (false, None) => Ok(None),
    }
}

/// Arguments after validation against an [`ArgSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub positional: Vec<String>,
    /// Keyed by long name; `None` for switches.
    pub flags: BTreeMap<String, Option<String>>,
}

impl ParsedArgs {
    pub fn get(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    pub fn rest(&self, from: usize) -> &[String] {
        self.positional.get(from..).unwrap_or(&[])
    }

    pub fn has_flag(&self, long: &str) -> bool {
        self.flags.contains_key(long)
    }

    pub fn value(&self, long: &str) -> Option<&str> {
        self.flags.get(long).and_then(|v| v.as_deref())
    }
}

/// Side effects a command asks the controller (or the view) to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Drop every block from the scrollback.
    ClearScreen,
    /// Route the page to `path`; handled by the view layer.
    Navigate { path: String, new_tab: bool },
}

/// What a handler produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub blocks: Vec<OutputBlock>,
    pub effects: Vec<Effect>,
}

impl CommandOutput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::empty().with_block(OutputBlock::result(lines))
    }

    pub fn text(text: &str) -> Self {
        Self::empty().with_block(OutputBlock::result_text(text))
    }

    pub fn info(text: &str) -> Self {
        Self::empty().with_block(OutputBlock::info(text))
    }

    pub fn effect(effect: Effect) -> Self {
        Self::empty().with_effect(effect)
    }

    pub fn with_block(mut self, block: OutputBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Read-only description of a registered command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSummary {
    pub name: String,
    pub aliases: Vec<String>,
    pub usage: String,
    pub help: String,
}

/// Snapshot handed to a handler for one execution.
///
/// Handlers never see the live session; everything here is a copy taken at
/// the moment the command started.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Canonical name of the command being run.
    pub command: String,
    pub catalog: Arc<Vec<CommandSummary>>,
    /// Submitted lines, oldest first, including the current one.
    pub history: Vec<String>,
    pub prompt: String,
    pub cancel: CancellationToken,
}

impl ExecutionContext {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once an interrupt was requested.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Case-insensitive lookup by name or alias.
    pub fn lookup(&self, token: &str) -> Option<&CommandSummary> {
        let token = token.to_lowercase();
        self.catalog
            .iter()
            .find(|c| c.name.to_lowercase() == token)
            .or_else(|| {
                self.catalog
                    .iter()
                    .find(|c| c.aliases.iter().any(|a| a.to_lowercase() == token))
            })
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, args: ParsedArgs, ctx: ExecutionContext) -> CommandResult;
}

/// Adapts a plain function into a synchronous handler.
pub struct FnHandler<F>(pub F);

impl<F> FnHandler<F>
where
    F: Fn(ParsedArgs, ExecutionContext) -> CommandResult + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(ParsedArgs, ExecutionContext) -> CommandResult + Send + Sync,
{
    async fn execute(&self, args: ParsedArgs, ctx: ExecutionContext) -> CommandResult {
        (self.0)(args, ctx)
    }
}

/// A registered command.
#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub aliases: Vec<String>,
    pub arg_spec: ArgSpec,
    pub help: String,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        handler: impl CommandHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            arg_spec: ArgSpec::none(),
            help: help.into(),
            handler: Arc::new(handler),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn args(mut self, spec: ArgSpec) -> Self {
        self.arg_spec = spec;
        self
    }

    pub fn usage(&self) -> String {
        self.arg_spec.usage(&self.name)
    }

    pub fn summary(&self) -> CommandSummary {
        CommandSummary {
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            usage: self.usage(),
            help: self.help.clone(),
        }
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("arg_spec", &self.arg_spec)
            .field("help", &self.help)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;

    fn tokens(s: &[&str]) -> Vec<String> {
        s.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_usage_string() {
        let spec = ArgSpec::none()
            .required("section")
            .optional("anchor")
            .flag("new-tab", None)
            .option("limit", Some('n'));
        assert_eq!(
            spec.usage("open"),
            "usage: open <section> [anchor] [--new-tab] [--limit <limit>]"
        );
        assert_eq!(ArgSpec::none().variadic("text").usage("echo"), "usage: echo [text...]");
    }

    #[test]
    fn test_parse_positionals_and_flags() {
        let spec = ArgSpec::none()
            .required("section")
            .flag("new-tab", Some('t'))
            .option("limit", Some('n'));

        let args = spec
            .parse(&tokens(&["blog", "--limit", "3", "-t"]))
            .unwrap();
        assert_eq!(args.get(0), Some("blog"));
        assert_eq!(args.value("limit"), Some("3"));
        assert!(args.has_flag("new-tab"));

        let args = spec.parse(&tokens(&["--limit=7", "about"])).unwrap();
        assert_eq!(args.value("limit"), Some("7"));
        assert_eq!(args.positional, vec!["about"]);
    }

    #[test]
    fn test_parse_errors() {
        let spec = ArgSpec::none()
            .required("section")
            .flag("new-tab", None)
            .option("limit", None);

        assert_eq!(
            spec.parse(&[]),
            Err(ArgError::Missing("section".to_string()))
        );
        assert_eq!(
            spec.parse(&tokens(&["a", "b"])),
            Err(ArgError::Unexpected("b".to_string()))
        );
        assert_eq!(
            spec.parse(&tokens(&["a", "--bogus"])),
            Err(ArgError::UnknownFlag("--bogus".to_string()))
        );
        assert_eq!(
            spec.parse(&tokens(&["a", "--limit"])),
            Err(ArgError::MissingValue("limit".to_string()))
        );
        assert_eq!(
            spec.parse(&tokens(&["a", "--new-tab=yes"])),
            Err(ArgError::UnexpectedValue("new-tab".to_string()))
        );
    }

    #[test]
    fn test_double_dash_and_negative_numbers() {
        let spec = ArgSpec::none().variadic("text");
        let args = spec.parse(&tokens(&["-5", "--", "--not-a-flag"])).unwrap();
        assert_eq!(args.positional, vec!["-5", "--not-a-flag"]);
        assert_eq!(args.rest(1), &["--not-a-flag".to_string()]);
        assert!(args.rest(5).is_empty());
    }

    #[test]
    fn test_context_lookup_is_case_insensitive() {
        let ctx = ExecutionContext {
            catalog: Arc::new(vec![CommandSummary {
                name: "clear".to_string(),
                aliases: vec!["cls".to_string()],
                usage: "usage: clear".to_string(),
                help: "Clear the screen".to_string(),
            }]),
            ..ExecutionContext::default()
        };
        assert_eq!(ctx.lookup("CLEAR").map(|c| c.name.as_str()), Some("clear"));
        assert_eq!(ctx.lookup("Cls").map(|c| c.name.as_str()), Some("clear"));
        assert!(ctx.lookup("nope").is_none());
    }

    #[tokio::test]
    async fn test_fn_handler_runs_closure() {
        let handler = FnHandler::new(|args: ParsedArgs, _ctx: ExecutionContext| {
            if args.positional.is_empty() {
                return Err(CommandError::Usage("nothing to say".to_string()));
            }
            Ok(CommandOutput::lines([args.positional.join(" ")]))
        });

        let args = ParsedArgs {
            positional: tokens(&["hi", "there"]),
            ..ParsedArgs::default()
        };
        let out = handler
            .execute(args, ExecutionContext::default())
            .await
            .unwrap();
        assert_eq!(out.blocks[0].lines, vec!["hi there"]);

        let err = handler
            .execute(ParsedArgs::default(), ExecutionContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "nothing to say");
    }
}
