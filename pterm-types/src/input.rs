use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Logical key produced by the input normalizer.
///
/// Every input method (physical keyboard, on-screen keyboard, clipboard,
/// touch gestures) is reduced to one of these before the controller sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum KeyKind {
    Enter,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Tab,
    Printable(char),
    /// A whole clipboard paste, delivered as one event.
    Paste(String),
    CtrlC,
    /// Ctrl+L
    ClearScreen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub kind: KeyKind,
    pub timestamp: DateTime<Utc>,
}

impl KeyEvent {
    pub fn new(kind: KeyKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn at(kind: KeyKind, timestamp: DateTime<Utc>) -> Self {
        Self { kind, timestamp }
    }
}

impl From<KeyKind> for KeyEvent {
    fn from(kind: KeyKind) -> Self {
        KeyEvent::new(kind)
    }
}
