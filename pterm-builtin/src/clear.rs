use pterm_types::{
    CommandDescriptor, CommandOutput, CommandResult, Effect, ExecutionContext, FnHandler,
    ParsedArgs,
};

/// Built-in clear command description
pub fn description() -> &'static str {
    "Clear the screen"
}

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new("clear", description(), FnHandler::new(command)).alias("cls")
}

pub fn command(_args: ParsedArgs, _ctx: ExecutionContext) -> CommandResult {
    Ok(CommandOutput::effect(Effect::ClearScreen))
}
