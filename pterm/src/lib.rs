use anyhow::Result;
use clap::Parser;
use pterm_content::ContentConfig;
use pterm_types::{ContentSource, RegistryError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

pub mod buffer;
pub mod completion;
pub mod config;
pub mod executor;
pub mod history;
pub mod host;
pub mod input;
pub mod parser;
pub mod registry;
pub mod terminal;

pub use buffer::ScreenBuffer;
pub use completion::{AutocompleteCandidate, AutocompleteEngine};
pub use config::TerminalConfig;
pub use executor::{CommandExecutor, ExecError};
pub use history::HistoryStore;
pub use input::{InputNormalizer, RawInput, RawInputEvent};
pub use registry::CommandRegistry;
pub use terminal::{TerminalController, TerminalSnapshot};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run one command line and exit
    #[arg(short, long)]
    pub command: Option<String>,

    /// Scrollback capacity in blocks
    #[arg(long)]
    pub max_blocks: Option<usize>,

    /// Base URL of the portfolio content API
    #[arg(long)]
    pub content_url: Option<String>,

    #[arg(long, default_value = "./debug.log")]
    pub log_file: PathBuf,
}

/// Registry with every built-in command.
pub fn default_registry(content: Arc<dyn ContentSource>) -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    for descriptor in pterm_builtin::builtin_commands(content) {
        registry.register(descriptor)?;
    }
    Ok(registry)
}

pub fn lib_main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(&cli.log_file) {
        eprintln!("Failed to initialize tracing: {err}");
        return ExitCode::FAILURE;
    }

    setup_panic_handler();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("Failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };
    rt.block_on(run(cli))
}

pub async fn run(cli: Cli) -> ExitCode {
    let mut config = TerminalConfig::from_env();
    if let Some(max_blocks) = cli.max_blocks {
        config = config.with_max_blocks(max_blocks);
    }
    let mut content_config = ContentConfig::from_env();
    if let Some(url) = cli.content_url {
        content_config = content_config.with_base_url(url);
    }
    debug!("config: {config:?} content: {content_config:?}");

    let content = match pterm_content::content_source(&content_config) {
        Ok(content) => content,
        Err(err) => {
            error!("failed to create content source: {err:?}");
            eprintln!("pterm: {err}");
            return ExitCode::FAILURE;
        }
    };
    let registry = match default_registry(content) {
        Ok(registry) => Arc::new(registry),
        Err(err) => {
            error!("failed to register commands: {err}");
            eprintln!("pterm: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(command) = cli.command.as_deref() {
        match host::run_command(registry, config, command).await {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(err) => {
                eprintln!("{err:?}");
                ExitCode::FAILURE
            }
        }
    } else {
        match host::run_interactive(registry, config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{err:?}");
                ExitCode::FAILURE
            }
        }
    }
}

/// Log to `log_file`; the terminal owns stdout. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_tracing(log_file: &Path) -> Result<()> {
    let log_file = Arc::new(std::fs::File::create(log_file)?);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .init();
    Ok(())
}

/// Record panics in the log only. Handler panics are caught by the executor
/// and shown as `internal error`, and the raw-mode guard restores the
/// terminal on unwind, so nothing is written to the terminal here.
pub fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let thread = std::thread::current();
        let report = describe_panic(
            panic_info.payload(),
            panic_info.location(),
            thread.name().unwrap_or("unnamed"),
        );

        let backtrace = std::backtrace::Backtrace::capture();
        match backtrace.status() {
            std::backtrace::BacktraceStatus::Captured => error!("PANIC {report}\n{backtrace}"),
            _ => error!("PANIC {report}"),
        }
    }));
}

fn describe_panic(
    payload: &(dyn std::any::Any + Send),
    location: Option<&std::panic::Location<'_>>,
    thread_name: &str,
) -> String {
    let payload = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic payload".to_string()
    };
    let location = location
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
        .unwrap_or_else(|| "Unknown location".to_string());
    format!("in thread {thread_name}: {payload} at {location}")
}
