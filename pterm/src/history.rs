use pterm_types::CommandLine;
use std::collections::VecDeque;
use tracing::debug;

/// Submitted command lines with Up/Down recall.
///
/// Recall never touches `entries`; it only moves `cursor` and keeps the line
/// the user was composing in `draft` so it can be restored when navigating
/// past the newest entry.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: VecDeque<CommandLine>,
    /// `None` when not browsing.
    cursor: Option<usize>,
    draft: Option<String>,
    limit: Option<usize>,
}

impl HistoryStore {
    /// Unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// History keeping at most `limit` entries, oldest dropped first.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit: limit.filter(|l| *l > 0),
            ..Self::default()
        }
    }

    /// Record a submitted line. Blank lines are not recorded.
    ///
    /// Returns whether the line was recorded. Browsing state is reset either
    /// way.
    pub fn append(&mut self, line: CommandLine) -> bool {
        self.stop_browsing();
        if line.is_blank() {
            return false;
        }
        self.entries.push_back(line);
        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.entries.pop_front();
            }
        }
        true
    }

    /// Move one entry back (older).
    ///
    /// The first call stashes `current_draft` and jumps to the newest entry;
    /// later calls step back and stay on the oldest entry once reached.
    /// Returns `None` only when there is no history at all.
    pub fn recall_previous(&mut self, current_draft: &str) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let index = match self.cursor {
            None => {
                self.draft = Some(current_draft.to_string());
                self.entries.len() - 1
            }
            Some(index) => index.saturating_sub(1),
        };
        self.cursor = Some(index);
        debug!("history recall previous: {index}");
        self.entries.get(index).map(CommandLine::raw)
    }

    /// Move one entry forward (newer).
    ///
    /// Moving past the newest entry ends browsing and hands back the stashed
    /// draft. Returns `None` when not browsing.
    pub fn recall_next(&mut self) -> Option<String> {
        let index = self.cursor?;
        if index + 1 < self.entries.len() {
            self.cursor = Some(index + 1);
            debug!("history recall next: {}", index + 1);
            return self.entries.get(index + 1).map(|l| l.raw().to_string());
        }
        self.cursor = None;
        Some(self.draft.take().unwrap_or_default())
    }

    /// Leave browsing mode, discarding the stashed draft.
    pub fn stop_browsing(&mut self) {
        self.cursor = None;
        self.draft = None;
    }

    pub fn is_browsing(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CommandLine> {
        self.entries.iter()
    }

    /// Raw lines, oldest first.
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().map(|l| l.raw().to_string()).collect()
    }
}
