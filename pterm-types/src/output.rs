//! Output blocks rendered in the scrollback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// The prompt plus the submitted line.
    Echo,
    Result,
    Error,
    Info,
}

/// A single block of scrollback output.
///
/// `seq` is assigned by the screen buffer when the block is appended and is
/// strictly increasing for the lifetime of a session, so a view can render
/// incrementally even after old blocks were evicted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBlock {
    pub seq: u64,
    pub kind: BlockKind,
    pub lines: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl OutputBlock {
    pub fn new(kind: BlockKind, lines: Vec<String>) -> Self {
        Self {
            seq: 0,
            kind,
            lines,
            timestamp: Utc::now(),
        }
    }

    pub fn echo(line: impl Into<String>) -> Self {
        Self::new(BlockKind::Echo, vec![line.into()])
    }

    pub fn result<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(BlockKind::Result, lines.into_iter().map(Into::into).collect())
    }

    /// Result block from multi-line text, one line per `\n`.
    pub fn result_text(text: &str) -> Self {
        Self::new(BlockKind::Result, split_lines(text))
    }

    pub fn info(text: &str) -> Self {
        Self::new(BlockKind::Info, split_lines(text))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(BlockKind::Error, vec![message.into()])
    }

    pub fn is_error(&self) -> bool {
        self.kind == BlockKind::Error
    }

    /// All lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    text.lines().map(str::to_string).collect()
}
