use pterm_types::{
    ArgSpec, CommandDescriptor, CommandError, CommandOutput, CommandResult, ExecutionContext,
    FnHandler, ParsedArgs,
};

/// Built-in help command description
pub fn description() -> &'static str {
    "List commands, or show usage for one"
}

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new("help", description(), FnHandler::new(command))
        .alias("?")
        .args(ArgSpec::none().optional("command"))
}

/// Built-in help command implementation
///
/// Without arguments lists every command with its one-line description;
/// `help <command>` shows usage, aliases and description of one command.
pub fn command(args: ParsedArgs, ctx: ExecutionContext) -> CommandResult {
    if let Some(name) = args.get(0) {
        let summary = ctx
            .lookup(name)
            .ok_or_else(|| CommandError::Usage(format!("no such command '{name}'")))?;
        let mut lines = vec![summary.usage.clone()];
        if !summary.aliases.is_empty() {
            lines.push(format!("aliases: {}", summary.aliases.join(", ")));
        }
        lines.push(summary.help.clone());
        return Ok(CommandOutput::lines(lines));
    }

    let width = ctx
        .catalog
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(8);
    let mut lines = vec!["Available commands:".to_string(), String::new()];
    for summary in ctx.catalog.iter() {
        lines.push(format!("  {:<width$}  {}", summary.name, summary.help));
    }
    lines.push(String::new());
    lines.push("Type 'help <command>' for details.".to_string());
    Ok(CommandOutput::lines(lines))
}
