use chrono::{Local, Utc};
use pterm_types::{
    ArgSpec, CommandDescriptor, CommandOutput, CommandResult, ExecutionContext, FnHandler,
    ParsedArgs,
};

const DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Built-in date command description
pub fn description() -> &'static str {
    "Print the current date and time"
}

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new("date", description(), FnHandler::new(command))
        .args(ArgSpec::none().flag("utc", Some('u')))
}

pub fn command(args: ParsedArgs, _ctx: ExecutionContext) -> CommandResult {
    let now = if args.has_flag("utc") {
        format!("{} UTC", Utc::now().format(DATE_FORMAT))
    } else {
        let now = Local::now();
        format!("{} {}", now.format(DATE_FORMAT), now.format("%:z"))
    };
    Ok(CommandOutput::lines([now]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::run;

    #[tokio::test]
    async fn test_utc_flag() {
        let out = run(&descriptor(), &["--utc"], ExecutionContext::default())
            .await
            .unwrap();
        let line = &out.blocks[0].lines[0];
        assert!(line.ends_with(" UTC"), "{line}");

        let out = run(&descriptor(), &["-u"], ExecutionContext::default())
            .await
            .unwrap();
        assert!(out.blocks[0].lines[0].ends_with(" UTC"));
    }

    #[tokio::test]
    async fn test_local_time_has_offset() {
        let out = run(&descriptor(), &[], ExecutionContext::default())
            .await
            .unwrap();
        let line = &out.blocks[0].lines[0];
        assert!(line.contains(':'));
        assert!(!line.ends_with(" UTC"));
    }
}
