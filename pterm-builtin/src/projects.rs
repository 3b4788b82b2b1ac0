use crate::until_cancelled;
use async_trait::async_trait;
use pterm_types::{
    ArgSpec, CommandDescriptor, CommandHandler, CommandOutput, CommandResult, ContentSource,
    ExecutionContext, OutputBlock, ParsedArgs, Project,
};
use std::sync::Arc;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ProjectEntry {
    name: String,
    title: String,
    tags: String,
    #[tabled(rename = "about")]
    summary: String,
}

impl From<Project> for ProjectEntry {
    fn from(project: Project) -> Self {
        Self {
            name: project.slug,
            title: project.title,
            tags: project.tags.join(", "),
            summary: project.summary,
        }
    }
}

/// Built-in projects command description
pub fn description() -> &'static str {
    "List portfolio projects"
}

pub fn descriptor(content: Arc<dyn ContentSource>) -> CommandDescriptor {
    CommandDescriptor::new("projects", description(), Projects { content })
        .alias("ls")
        .args(ArgSpec::none().option("tag", Some('t')))
}

struct Projects {
    content: Arc<dyn ContentSource>,
}

#[async_trait]
impl CommandHandler for Projects {
    async fn execute(&self, args: ParsedArgs, ctx: ExecutionContext) -> CommandResult {
        let mut projects = until_cancelled(&ctx, self.content.projects()).await?;
        if let Some(tag) = args.value("tag") {
            projects.retain(|p| p.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)));
            if projects.is_empty() {
                return Ok(CommandOutput::info(&format!("no projects tagged '{tag}'")));
            }
        }
        if projects.is_empty() {
            return Ok(CommandOutput::info("no projects yet"));
        }

        let entries: Vec<ProjectEntry> = projects.into_iter().map(ProjectEntry::from).collect();
        let table = Table::new(entries).to_string();
        Ok(CommandOutput::empty().with_block(OutputBlock::result_text(&table)))
    }
}
