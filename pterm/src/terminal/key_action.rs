//! Pure mapping from normalized keys to controller actions.
//!
//! Kept free of side effects so every binding can be tested without a
//! session.

use pterm_types::KeyKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    // cursor
    CursorLeft,
    CursorRight,
    CursorToBegin,
    CursorToEnd,

    // history
    HistoryPrevious,
    HistoryNext,

    // editing
    InsertChar(char),
    InsertText(String),
    Backspace,

    TriggerCompletion,
    Execute,

    /// Cancel the command in flight.
    Interrupt,
    /// Nothing running: drop the current line, shell style.
    AbandonLine,
    ClearScreen,

    Unsupported,
}

/// State the mapping depends on.
#[derive(Debug, Clone, Default)]
pub struct KeyContext {
    /// A command is in flight.
    pub pending_execution: bool,
}

pub fn determine_key_action(key: &KeyKind, ctx: &KeyContext) -> KeyAction {
    match key {
        KeyKind::ArrowUp => KeyAction::HistoryPrevious,
        KeyKind::ArrowDown => KeyAction::HistoryNext,
        KeyKind::ArrowLeft => KeyAction::CursorLeft,
        KeyKind::ArrowRight => KeyAction::CursorRight,
        KeyKind::Home => KeyAction::CursorToBegin,
        KeyKind::End => KeyAction::CursorToEnd,

        KeyKind::Printable(ch) if ch.is_control() => KeyAction::Unsupported,
        KeyKind::Printable(ch) => KeyAction::InsertChar(*ch),
        KeyKind::Paste(text) => {
            let text = sanitize_paste(text);
            if text.is_empty() {
                KeyAction::Unsupported
            } else {
                KeyAction::InsertText(text)
            }
        }
        KeyKind::Backspace => KeyAction::Backspace,

        KeyKind::Tab => KeyAction::TriggerCompletion,
        KeyKind::Enter => KeyAction::Execute,

        KeyKind::CtrlC if ctx.pending_execution => KeyAction::Interrupt,
        KeyKind::CtrlC => KeyAction::AbandonLine,
        KeyKind::ClearScreen => KeyAction::ClearScreen,
    }
}

/// Newlines and tabs become spaces, other control characters are dropped.
pub fn sanitize_paste(text: &str) -> String {
    text.replace("\r\n", " ")
        .chars()
        .filter_map(|ch| match ch {
            '\n' | '\r' | '\t' => Some(' '),
            ch if ch.is_control() => None,
            ch => Some(ch),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle() -> KeyContext {
        KeyContext::default()
    }

    fn busy() -> KeyContext {
        KeyContext {
            pending_execution: true,
        }
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(
            determine_key_action(&KeyKind::ArrowUp, &idle()),
            KeyAction::HistoryPrevious
        );
        assert_eq!(
            determine_key_action(&KeyKind::ArrowDown, &idle()),
            KeyAction::HistoryNext
        );
        assert_eq!(
            determine_key_action(&KeyKind::Home, &idle()),
            KeyAction::CursorToBegin
        );
        assert_eq!(
            determine_key_action(&KeyKind::End, &idle()),
            KeyAction::CursorToEnd
        );
    }

    #[test]
    fn test_printable_inserts() {
        assert_eq!(
            determine_key_action(&KeyKind::Printable('x'), &idle()),
            KeyAction::InsertChar('x')
        );
        assert_eq!(
            determine_key_action(&KeyKind::Printable('\u{7}'), &idle()),
            KeyAction::Unsupported
        );
    }

    #[test]
    fn test_ctrl_c_depends_on_pending_execution() {
        assert_eq!(
            determine_key_action(&KeyKind::CtrlC, &idle()),
            KeyAction::AbandonLine
        );
        assert_eq!(
            determine_key_action(&KeyKind::CtrlC, &busy()),
            KeyAction::Interrupt
        );
    }

    #[test]
    fn test_enter_and_tab() {
        assert_eq!(
            determine_key_action(&KeyKind::Enter, &busy()),
            KeyAction::Execute
        );
        assert_eq!(
            determine_key_action(&KeyKind::Tab, &idle()),
            KeyAction::TriggerCompletion
        );
    }

    #[test]
    fn test_paste_is_sanitized() {
        assert_eq!(
            determine_key_action(&KeyKind::Paste("echo a\r\nb\tc\u{1b}".to_string()), &idle()),
            KeyAction::InsertText("echo a b c".to_string())
        );
        assert_eq!(
            determine_key_action(&KeyKind::Paste("\u{0}".to_string()), &idle()),
            KeyAction::Unsupported
        );
    }
}
