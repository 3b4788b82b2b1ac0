use super::line::LineEditor;
use crate::buffer::ScreenBuffer;
use crate::config::TerminalConfig;
use crate::history::HistoryStore;

/// Mutable state of one terminal session. Owned by the controller.
#[derive(Debug)]
pub struct TerminalSession {
    pub(crate) line: LineEditor,
    pub(crate) history: HistoryStore,
    pub(crate) buffer: ScreenBuffer,
    pub(crate) pending_execution: bool,
}

impl TerminalSession {
    pub fn new(config: &TerminalConfig) -> Self {
        Self {
            line: LineEditor::new(),
            history: HistoryStore::with_limit(config.history_limit),
            buffer: ScreenBuffer::new(config.max_blocks),
            pending_execution: false,
        }
    }

    pub fn current_line(&self) -> &str {
        self.line.as_str()
    }

    /// In characters.
    pub fn cursor_position(&self) -> usize {
        self.line.cursor()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn buffer(&self) -> &ScreenBuffer {
        &self.buffer
    }

    pub fn pending_execution(&self) -> bool {
        self.pending_execution
    }
}
