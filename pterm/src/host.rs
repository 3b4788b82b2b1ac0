//! Native host for the terminal core.
//!
//! Maps crossterm events onto the raw input schema, feeds them through the
//! normalizer and redraws after every change. The browser view does the same
//! job over the JSON schema; this host makes the core usable from a shell.

use crate::config::TerminalConfig;
use crate::input::{InputNormalizer, Modifiers, RawInput, RawInputEvent};
use crate::registry::CommandRegistry;
use crate::terminal::{TerminalController, TerminalSnapshot};
use anyhow::Result;
use crossterm::cursor::MoveToColumn;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyCode, KeyEventKind,
    KeyModifiers,
};
use crossterm::style::{Color, Print, Stylize};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{cursor, execute, queue};
use futures::StreamExt;
use pterm_types::{BlockKind, Effect, OutputBlock};
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub const DEFAULT_BANNER: &str = "Welcome! Type 'help' to list the available commands.";

/// Suggestion refresh cadence, roughly one display frame.
const FRAME_MS: u64 = 16;

/// Raw mode and bracketed paste for as long as the value lives.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnableBracketedPaste)?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableBracketedPaste);
        let _ = terminal::disable_raw_mode();
    }
}

/// Translate a crossterm key press into a DOM-style `key_down` event.
pub fn raw_from_terminal(event: &crossterm::event::KeyEvent) -> Option<RawInputEvent> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let key = match event.code {
        KeyCode::Char(ch) => ch.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        _ => return None,
    };
    let m = event.modifiers;
    let mods = Modifiers {
        ctrl: m.contains(KeyModifiers::CONTROL),
        alt: m.contains(KeyModifiers::ALT),
        shift: m.contains(KeyModifiers::SHIFT),
        meta: m.contains(KeyModifiers::SUPER) || m.contains(KeyModifiers::META),
    };
    Some(RawInputEvent::new(RawInput::KeyDown {
        key,
        code: String::new(),
        mods,
    }))
}

fn is_exit(event: &crossterm::event::KeyEvent) -> bool {
    event.code == KeyCode::Char('d') && event.modifiers.contains(KeyModifiers::CONTROL)
}

fn describe_effect(effect: &Effect) -> String {
    match effect {
        Effect::ClearScreen => "(screen cleared)".to_string(),
        Effect::Navigate { path, new_tab } if *new_tab => format!("-> {path} (new tab)"),
        Effect::Navigate { path, .. } => format!("-> {path}"),
    }
}

/// Incremental renderer keyed by block `seq`.
struct Renderer<W: Write> {
    out: W,
    last_seq: u64,
    clear_generation: u64,
}

impl<W: Write> Renderer<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            last_seq: 0,
            clear_generation: 0,
        }
    }

    fn render(&mut self, snapshot: &TerminalSnapshot, effects: &[Effect]) -> io::Result<()> {
        let out = &mut self.out;
        queue!(out, Print("\r"), Clear(ClearType::CurrentLine))?;

        if snapshot.clear_generation != self.clear_generation {
            self.clear_generation = snapshot.clear_generation;
            queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
        }

        let last_seq = self.last_seq;
        for block in snapshot.buffer.iter().filter(|b| b.seq > last_seq) {
            print_block(out, block)?;
            self.last_seq = block.seq;
        }
        for effect in effects {
            queue!(out, Print(describe_effect(effect).with(Color::DarkGrey)), Print("\r\n"))?;
        }

        queue!(out, Print(&snapshot.prompt), Print(&snapshot.current_line))?;
        if snapshot.suggestions.len() > 1 {
            let names: Vec<&str> = snapshot.suggestions.iter().map(|c| c.text.as_str()).collect();
            queue!(out, Print(format!("  [{}]", names.join(" ")).with(Color::DarkGrey)))?;
        }
        if snapshot.pending_execution {
            queue!(out, Print(" ⧗".with(Color::DarkGrey)))?;
        }
        let column = snapshot.prompt.chars().count() + snapshot.cursor_position;
        queue!(out, MoveToColumn(column.min(u16::MAX as usize) as u16))?;
        out.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        queue!(self.out, Print("\r\n"))?;
        self.out.flush()
    }
}

fn print_block(out: &mut impl Write, block: &OutputBlock) -> io::Result<()> {
    let color = match block.kind {
        BlockKind::Echo | BlockKind::Result => Color::Reset,
        BlockKind::Error => Color::Red,
        BlockKind::Info => Color::DarkGrey,
    };
    for line in &block.lines {
        queue!(out, Print(line.as_str().with(color)), Print("\r\n"))?;
    }
    Ok(())
}

/// Interactive session on a raw-mode terminal. Returns on Ctrl+D.
pub async fn run_interactive(
    registry: Arc<CommandRegistry>,
    mut config: TerminalConfig,
) -> Result<()> {
    if !io::stdin().is_terminal() {
        return run_pipe(registry, config).await;
    }
    if config.banner.is_none() {
        config.banner = Some(DEFAULT_BANNER.to_string());
    }

    let mut term = TerminalController::init(registry, config);
    let mut normalizer = InputNormalizer::new();
    let mut reader = EventStream::new();
    let mut frame = tokio::time::interval(Duration::from_millis(FRAME_MS));
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let _guard = RawModeGuard::enable()?;
    let mut renderer = Renderer::new(io::stdout());
    renderer.render(&term.get_snapshot(), &[])?;
    debug!("start interactive host");

    loop {
        tokio::select! {
            maybe_event = reader.next() => {
                let Some(event) = maybe_event else {
                    break;
                };
                let raw = match event? {
                    Event::Key(key) if is_exit(&key) => break,
                    Event::Key(key) => raw_from_terminal(&key),
                    Event::Paste(text) => Some(RawInputEvent::new(RawInput::Paste { text })),
                    _ => None,
                };
                let Some(key) = raw.and_then(|raw| normalizer.normalize(raw)) else {
                    continue;
                };
                term.on_key_event(key);
            }
            _ = term.settle(), if term.is_pending() => {}
            _ = frame.tick() => {
                if !term.on_animation_frame() {
                    continue;
                }
            }
        }
        let effects = term.take_effects();
        renderer.render(&term.get_snapshot(), &effects)?;
    }

    renderer.finish()?;
    term.dispose();
    info!("interactive host exited");
    Ok(())
}

/// Run a single line, print its output and report whether it succeeded.
pub async fn run_command(
    registry: Arc<CommandRegistry>,
    config: TerminalConfig,
    command: &str,
) -> Result<bool> {
    let mut term = TerminalController::init(registry, config);
    let ok = submit_and_print(&mut term, command, 0).await?.1;
    term.dispose();
    Ok(ok)
}

/// Stdin is not a terminal: run each line in turn.
async fn run_pipe(registry: Arc<CommandRegistry>, config: TerminalConfig) -> Result<()> {
    debug!("start pipe host");
    let lines: Vec<String> = io::stdin().lock().lines().collect::<io::Result<_>>()?;
    let mut term = TerminalController::init(registry, config);
    let mut last_seq = 0;
    for line in lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        if line == "exit" {
            break;
        }
        last_seq = submit_and_print(&mut term, line, last_seq).await?.0;
    }
    term.dispose();
    Ok(())
}

/// Submit `line`, wait for it, print every block after `last_seq` except
/// echoes. Returns the new last seq and whether no error block appeared.
async fn submit_and_print(
    term: &mut TerminalController,
    line: &str,
    last_seq: u64,
) -> Result<(u64, bool)> {
    term.submit(line);
    term.run_until_idle().await;

    let snapshot = term.get_snapshot();
    let mut seq = last_seq;
    let mut ok = true;
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    for block in snapshot.buffer.iter().filter(|b| b.seq > last_seq) {
        seq = block.seq;
        match block.kind {
            BlockKind::Echo => {}
            BlockKind::Error => {
                ok = false;
                writeln!(stderr, "{}", block.text())?;
            }
            BlockKind::Result | BlockKind::Info => writeln!(stdout, "{}", block.text())?,
        }
    }
    for effect in term.take_effects() {
        writeln!(stdout, "{}", describe_effect(&effect))?;
    }
    Ok((seq, ok))
}
