use pterm_types::{
    ArgSpec, CommandDescriptor, CommandOutput, CommandResult, ExecutionContext, FnHandler,
    ParsedArgs,
};

/// Built-in echo command description
pub fn description() -> &'static str {
    "Print the arguments"
}

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new("echo", description(), FnHandler::new(command))
        .args(ArgSpec::none().variadic("text"))
}

pub fn command(args: ParsedArgs, _ctx: ExecutionContext) -> CommandResult {
    Ok(CommandOutput::lines([args.positional.join(" ")]))
}
