use pterm_types::{
    ArgSpec, CommandDescriptor, CommandError, CommandOutput, CommandResult, Effect,
    ExecutionContext, FnHandler, ParsedArgs,
};

/// Site sections reachable with `open`.
pub const SECTIONS: &[&str] = &["about", "projects", "blog", "contact"];

/// Built-in open command description
pub fn description() -> &'static str {
    "Go to a section of the site: about, projects, blog, contact"
}

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new("open", description(), FnHandler::new(command))
        .alias("cd")
        .alias("goto")
        .args(
            ArgSpec::none()
                .required("section")
                .flag("new-tab", Some('t')),
        )
}

/// Resolve a section name to its route. `~` and `home` go to the top page.
pub fn route(section: &str) -> Option<String> {
    let section = section.trim_matches('/').to_lowercase();
    match section.as_str() {
        "" | "~" | "home" => Some("/".to_string()),
        s if SECTIONS.contains(&s) => Some(format!("/{s}")),
        _ => None,
    }
}

pub fn command(args: ParsedArgs, _ctx: ExecutionContext) -> CommandResult {
    let section = args.get(0).unwrap_or_default();
    let path = route(section).ok_or_else(|| {
        CommandError::Usage(format!(
            "unknown section '{section}' (try: {})",
            SECTIONS.join(", ")
        ))
    })?;
    let new_tab = args.has_flag("new-tab");
    Ok(CommandOutput::info(&format!("opening {path}"))
        .with_effect(Effect::Navigate { path, new_tab }))
}
