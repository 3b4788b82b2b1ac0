//! The terminal controller.
//!
//! Receives normalized key events, edits the current line, runs submitted
//! lines through the executor and keeps the scrollback. It never blocks:
//! a command that suspends stays in flight until the host drives it with
//! [`TerminalController::settle`], and lines submitted meanwhile wait in a
//! FIFO queue.

mod key_action;
mod line;
mod session;

pub use key_action::{KeyAction, KeyContext, determine_key_action, sanitize_paste};
pub use line::LineEditor;
pub use session::TerminalSession;

use crate::completion::{
    AutocompleteCandidate, AutocompleteEngine, command_partial, replace_command_token,
};
use crate::config::TerminalConfig;
use crate::executor::{CommandExecutor, Execution, PendingExecution, Settled};
use crate::registry::CommandRegistry;
use pterm_types::{CommandLine, CommandSummary, Effect, ExecutionContext, KeyEvent, OutputBlock};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Everything a view needs to render one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerminalSnapshot {
    pub prompt: String,
    pub current_line: String,
    pub cursor_position: usize,
    pub buffer: Vec<OutputBlock>,
    /// Bumped each time the scrollback is cleared, so a view can tell a
    /// clear apart from eviction.
    pub clear_generation: u64,
    pub suggestions: Vec<AutocompleteCandidate>,
    pub pending_execution: bool,
    /// Submitted lines waiting behind the one in flight.
    pub queued: usize,
}

/// A submitted line waiting for its turn, with the history as it was at
/// submission.
#[derive(Debug)]
struct QueuedLine {
    line: CommandLine,
    history: Vec<String>,
}

pub struct TerminalController {
    config: TerminalConfig,
    session: TerminalSession,
    registry: Arc<CommandRegistry>,
    catalog: Arc<Vec<CommandSummary>>,
    executor: CommandExecutor,
    autocomplete: AutocompleteEngine,
    queue: VecDeque<QueuedLine>,
    in_flight: Option<PendingExecution>,
    suggestions: Vec<AutocompleteCandidate>,
    suggestions_dirty: bool,
    effects: Vec<Effect>,
}

impl TerminalController {
    /// Start a session. The banner, if configured, is the first block.
    pub fn init(registry: Arc<CommandRegistry>, config: TerminalConfig) -> Self {
        info!(
            "terminal init: {} commands, max_blocks: {}",
            registry.len(),
            config.max_blocks
        );
        let mut session = TerminalSession::new(&config);
        if let Some(banner) = &config.banner {
            session.buffer.append(OutputBlock::info(banner));
        }
        Self {
            catalog: Arc::new(registry.catalog()),
            session,
            registry,
            executor: CommandExecutor::new(),
            autocomplete: AutocompleteEngine::new(),
            queue: VecDeque::new(),
            in_flight: None,
            suggestions: Vec::new(),
            suggestions_dirty: false,
            effects: Vec::new(),
            config,
        }
    }

    /// End the session. Work in flight is cancelled and queued lines are
    /// discarded.
    pub fn dispose(mut self) {
        if let Some(mut pending) = self.in_flight.take() {
            pending.interrupt(self.config.interrupt_grace());
        }
        info!("terminal disposed, {} queued line(s) dropped", self.queue.len());
        self.queue.clear();
    }

    pub fn on_key_event(&mut self, event: KeyEvent) {
        let ctx = KeyContext {
            pending_execution: self.in_flight.is_some(),
        };
        let action = determine_key_action(&event.kind, &ctx);
        debug!("key: {:?} -> {:?}", event.kind, action);

        match action {
            KeyAction::InsertChar(ch) => self.edit(|line| {
                line.insert(ch);
                true
            }),
            KeyAction::InsertText(text) => self.edit(|line| {
                line.insert_str(&text);
                true
            }),
            KeyAction::Backspace => self.edit(LineEditor::backspace),
            KeyAction::CursorLeft => self.move_cursor(|line| line.move_by(-1)),
            KeyAction::CursorRight => self.move_cursor(|line| line.move_by(1)),
            KeyAction::CursorToBegin => self.move_cursor(LineEditor::move_to_begin),
            KeyAction::CursorToEnd => self.move_cursor(LineEditor::move_to_end),
            KeyAction::HistoryPrevious => {
                let draft = self.session.line.as_str().to_string();
                if let Some(entry) = self.session.history.recall_previous(&draft) {
                    let entry = entry.to_string();
                    self.session.line.reset(entry);
                    self.suggestions_dirty = true;
                }
            }
            KeyAction::HistoryNext => {
                if let Some(text) = self.session.history.recall_next() {
                    self.session.line.reset(text);
                    self.suggestions_dirty = true;
                }
            }
            KeyAction::TriggerCompletion => self.complete(),
            KeyAction::Execute => self.submit_current(),
            KeyAction::Interrupt => self.interrupt(),
            KeyAction::AbandonLine => self.abandon_line(),
            KeyAction::ClearScreen => self.session.buffer.clear(),
            KeyAction::Unsupported => {}
        }
    }

    /// Submit `raw` as if it had been typed and followed by Enter. Whatever
    /// was being composed is replaced.
    pub fn submit(&mut self, raw: &str) {
        self.session.line.reset(raw.to_string());
        self.submit_current();
    }

    /// Recompute suggestions if the line changed since the last frame.
    /// Returns whether they were recomputed.
    pub fn on_animation_frame(&mut self) -> bool {
        if !self.suggestions_dirty {
            return false;
        }
        self.suggestions_dirty = false;
        self.suggestions = self.compute_suggestions();
        true
    }

    /// Drive the command in flight until it settles, then start queued
    /// lines until the queue is empty or another command suspends.
    ///
    /// Returns `false` straight away when nothing is in flight. Cancel safe:
    /// if the returned future is dropped, the command stays in flight.
    pub async fn settle(&mut self) -> bool {
        let Some(pending) = self.in_flight.as_mut() else {
            return false;
        };
        let settled = pending.wait().await;
        self.in_flight = None;
        self.session.pending_execution = false;
        self.apply(settled);
        self.pump_queue();
        true
    }

    /// Settle until nothing is in flight or queued.
    pub async fn run_until_idle(&mut self) {
        while self.settle().await {}
    }

    pub fn get_snapshot(&self) -> TerminalSnapshot {
        TerminalSnapshot {
            prompt: self.config.prompt.clone(),
            current_line: self.session.current_line().to_string(),
            cursor_position: self.session.cursor_position(),
            buffer: self.session.buffer.snapshot(),
            clear_generation: self.session.buffer.clear_generation(),
            suggestions: self.suggestions.clone(),
            pending_execution: self.session.pending_execution,
            queued: self.queue.len(),
        }
    }

    /// Effects meant for the view, oldest first.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn session(&self) -> &TerminalSession {
        &self.session
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Apply a line mutation. Any edit ends history browsing.
    fn edit(&mut self, f: impl FnOnce(&mut LineEditor) -> bool) {
        if f(&mut self.session.line) {
            self.session.history.stop_browsing();
            self.suggestions_dirty = true;
        }
    }

    fn move_cursor(&mut self, f: impl FnOnce(&mut LineEditor)) {
        f(&mut self.session.line);
        self.suggestions_dirty = true;
    }

    fn compute_suggestions(&self) -> Vec<AutocompleteCandidate> {
        match command_partial(self.session.line.as_str(), self.session.line.cursor()) {
            Some(partial) => self.autocomplete.suggest(partial, &self.registry),
            None => Vec::new(),
        }
    }

    /// Tab: a single candidate completes the command token, several are
    /// offered as suggestions, none leaves the line alone.
    fn complete(&mut self) {
        let mut candidates = self.compute_suggestions();
        self.suggestions_dirty = false;
        if candidates.len() == 1 {
            let candidate = candidates.remove(0);
            let (line, cursor) = replace_command_token(self.session.line.as_str(), &candidate.text);
            debug!("completed command token: {}", candidate.text);
            self.session.line.set(line, cursor);
            self.session.history.stop_browsing();
            self.suggestions.clear();
        } else {
            self.suggestions = candidates;
        }
    }

    fn submit_current(&mut self) {
        let line = CommandLine::new(self.session.line.take());
        self.suggestions.clear();
        self.suggestions_dirty = false;

        if line.is_blank() {
            self.session.history.stop_browsing();
            self.append(OutputBlock::echo(self.config.prompt.clone()));
            return;
        }

        self.append(OutputBlock::echo(format!("{}{}", self.config.prompt, line)));
        self.session.history.append(line.clone());
        let history = self.session.history.to_vec();
        self.queue.push_back(QueuedLine { line, history });
        debug!("queued, {} waiting", self.queue.len());
        self.pump_queue();
    }

    /// Start queued lines in order while nothing is in flight.
    fn pump_queue(&mut self) {
        while self.in_flight.is_none() {
            let Some(queued) = self.queue.pop_front() else {
                break;
            };
            let ctx = ExecutionContext {
                command: String::new(),
                catalog: self.catalog.clone(),
                history: queued.history,
                prompt: self.config.prompt.clone(),
                cancel: CancellationToken::new(),
            };
            self.session.pending_execution = true;
            match self.executor.execute(&queued.line, &self.registry, ctx) {
                Execution::Ready(settled) => {
                    self.session.pending_execution = false;
                    self.apply(settled);
                }
                Execution::Pending(pending) => {
                    debug!("in flight: {}", pending.command());
                    self.in_flight = Some(pending);
                }
            }
        }
    }

    fn apply(&mut self, settled: Settled) {
        for effect in settled.effects {
            match effect {
                Effect::ClearScreen => self.session.buffer.clear(),
                other => self.effects.push(other),
            }
        }
        for block in settled.blocks {
            self.append(block);
        }
    }

    fn append(&mut self, block: OutputBlock) {
        self.session.buffer.append(block);
    }

    fn interrupt(&mut self) {
        if let Some(pending) = self.in_flight.as_mut() {
            pending.interrupt(self.config.interrupt_grace());
        }
    }

    fn abandon_line(&mut self) {
        let text = self.session.line.take();
        self.append(OutputBlock::echo(format!(
            "{}{}^C",
            self.config.prompt, text
        )));
        self.session.history.stop_browsing();
        self.suggestions.clear();
        self.suggestions_dirty = false;
    }
}
