//! Input normalization.
//!
//! The view forwards whatever the device produced (DOM `keydown`, on-screen
//! keyboard taps, clipboard pastes, touch gestures) as a [`RawInputEvent`].
//! [`InputNormalizer`] reduces them to a single stream of [`KeyEvent`]s so the
//! controller never needs to know which input method was used.
//!
//! Raw events use a small, tagged JSON schema:
//!
//! ```json
//! {"kind":"key_down","key":"a","code":"KeyA","mods":{"ctrl":false},"timestamp_ms":1700000000000}
//! {"kind":"paste","text":"echo hi"}
//! {"kind":"swipe","direction":"up"}
//! ```

use chrono::{DateTime, Utc};
use pterm_types::{KeyEvent, KeyKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum travel in CSS pixels for a touch to count as a swipe.
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 40.0;

/// Modifier keys held during a key event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawInput {
    KeyDown {
        key: String,
        #[serde(default)]
        code: String,
        #[serde(default)]
        mods: Modifiers,
    },
    KeyUp {
        key: String,
    },
    /// Tap on the on-screen keyboard or shortcut bar. `key` uses DOM key
    /// names (`Enter`, `ArrowUp`, `a`) plus `CtrlC` and `Clear`; longer text
    /// is inserted as a paste.
    VirtualKey {
        key: String,
    },
    Paste {
        text: String,
    },
    TouchStart {
        x: f32,
        y: f32,
    },
    TouchEnd {
        x: f32,
        y: f32,
    },
    TouchCancel,
    /// Swipe already recognized by the host.
    Swipe {
        direction: SwipeDirection,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputEvent {
    #[serde(flatten)]
    pub input: RawInput,
    /// Host event time in milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<i64>,
}

impl RawInputEvent {
    pub fn new(input: RawInput) -> Self {
        Self {
            input,
            timestamp_ms: None,
        }
    }

    pub fn key(key: &str) -> Self {
        Self::new(RawInput::KeyDown {
            key: key.to_string(),
            code: String::new(),
            mods: Modifiers::default(),
        })
    }

    pub fn ctrl_key(key: &str) -> Self {
        Self::new(RawInput::KeyDown {
            key: key.to_string(),
            code: String::new(),
            mods: Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        })
    }
}

#[derive(Debug, Clone)]
pub struct InputNormalizer {
    swipe_threshold: f32,
    touch_origin: Option<(f32, f32)>,
}

impl Default for InputNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl InputNormalizer {
    pub fn new() -> Self {
        Self::with_swipe_threshold(DEFAULT_SWIPE_THRESHOLD)
    }

    pub fn with_swipe_threshold(swipe_threshold: f32) -> Self {
        Self {
            swipe_threshold,
            touch_origin: None,
        }
    }

    /// Normalize one raw event. `None` means the event is intentionally
    /// ignored (key-up, modifier-only keys, horizontal swipes, taps).
    pub fn normalize(&mut self, raw: RawInputEvent) -> Option<KeyEvent> {
        let timestamp = raw
            .timestamp_ms
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or_else(Utc::now);

        let kind = match raw.input {
            RawInput::KeyDown { key, code, mods } => key_down(&key, &code, mods),
            RawInput::KeyUp { .. } => None,
            RawInput::VirtualKey { key } => virtual_key(&key),
            RawInput::Paste { text } => (!text.is_empty()).then_some(KeyKind::Paste(text)),
            RawInput::TouchStart { x, y } => {
                self.touch_origin = (x.is_finite() && y.is_finite()).then_some((x, y));
                None
            }
            RawInput::TouchEnd { x, y } => self
                .touch_origin
                .take()
                .and_then(|origin| self.detect_swipe(origin, (x, y)))
                .and_then(swipe),
            RawInput::TouchCancel => {
                self.touch_origin = None;
                None
            }
            RawInput::Swipe { direction } => swipe(direction),
        };

        if kind.is_none() {
            debug!("input event ignored");
        }
        kind.map(|kind| KeyEvent::at(kind, timestamp))
    }

    /// Decode and normalize a JSON encoded raw event. Malformed input is
    /// dropped.
    pub fn normalize_json(&mut self, json: &str) -> Option<KeyEvent> {
        match serde_json::from_str::<RawInputEvent>(json) {
            Ok(raw) => self.normalize(raw),
            Err(err) => {
                debug!("dropping malformed input event: {err}");
                None
            }
        }
    }

    fn detect_swipe(&self, from: (f32, f32), to: (f32, f32)) -> Option<SwipeDirection> {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        if !dx.is_finite() || !dy.is_finite() {
            return None;
        }
        if dx.abs().max(dy.abs()) < self.swipe_threshold {
            return None;
        }
        // Screen coordinates grow downwards.
        Some(if dy.abs() >= dx.abs() {
            if dy < 0.0 {
                SwipeDirection::Up
            } else {
                SwipeDirection::Down
            }
        } else if dx < 0.0 {
            SwipeDirection::Left
        } else {
            SwipeDirection::Right
        })
    }
}

/// Vertical swipes recall history; horizontal ones belong to the page.
fn swipe(direction: SwipeDirection) -> Option<KeyKind> {
    match direction {
        SwipeDirection::Up => Some(KeyKind::ArrowUp),
        SwipeDirection::Down => Some(KeyKind::ArrowDown),
        SwipeDirection::Left | SwipeDirection::Right => None,
    }
}

fn key_down(key: &str, code: &str, mods: Modifiers) -> Option<KeyKind> {
    if mods.meta {
        // Cmd chords belong to the browser, Cmd+C included.
        return None;
    }
    if mods.ctrl && mods.alt {
        // AltGr arrives as Ctrl+Alt; keep the character it produced.
        return printable(key);
    }
    if mods.ctrl {
        // Everything else is left to the browser (copy, tab switching, ...).
        let key = if key.is_empty() { code } else { key };
        return match key {
            "c" | "C" | "KeyC" => Some(KeyKind::CtrlC),
            "l" | "L" | "KeyL" => Some(KeyKind::ClearScreen),
            _ => None,
        };
    }

    named_key(key)
        .or_else(|| printable(key))
        .or_else(|| named_key(code))
}

fn virtual_key(key: &str) -> Option<KeyKind> {
    match key {
        "CtrlC" | "Ctrl+C" => Some(KeyKind::CtrlC),
        "Clear" | "Ctrl+L" => Some(KeyKind::ClearScreen),
        _ => named_key(key).or_else(|| printable(key)).or_else(|| {
            let text: String = key.chars().filter(|c| !c.is_control()).collect();
            (!text.is_empty()).then_some(KeyKind::Paste(text))
        }),
    }
}

fn named_key(key: &str) -> Option<KeyKind> {
    Some(match key {
        "Enter" | "NumpadEnter" => KeyKind::Enter,
        "Backspace" => KeyKind::Backspace,
        "Tab" => KeyKind::Tab,
        "ArrowUp" | "Up" => KeyKind::ArrowUp,
        "ArrowDown" | "Down" => KeyKind::ArrowDown,
        "ArrowLeft" | "Left" => KeyKind::ArrowLeft,
        "ArrowRight" | "Right" => KeyKind::ArrowRight,
        "Home" => KeyKind::Home,
        "End" => KeyKind::End,
        "Spacebar" | "Space" => KeyKind::Printable(' '),
        _ => return None,
    })
}

fn printable(key: &str) -> Option<KeyKind> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if !ch.is_control() => Some(KeyKind::Printable(ch)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(normalizer: &mut InputNormalizer, raw: RawInputEvent) -> Option<KeyKind> {
        normalizer.normalize(raw).map(|evt| evt.kind)
    }

    #[test]
    fn test_dom_keys() {
        let mut n = InputNormalizer::new();
        assert_eq!(kind(&mut n, RawInputEvent::key("a")), Some(KeyKind::Printable('a')));
        assert_eq!(kind(&mut n, RawInputEvent::key("A")), Some(KeyKind::Printable('A')));
        assert_eq!(kind(&mut n, RawInputEvent::key(" ")), Some(KeyKind::Printable(' ')));
        assert_eq!(kind(&mut n, RawInputEvent::key("Enter")), Some(KeyKind::Enter));
        assert_eq!(kind(&mut n, RawInputEvent::key("Backspace")), Some(KeyKind::Backspace));
        assert_eq!(kind(&mut n, RawInputEvent::key("Tab")), Some(KeyKind::Tab));
        assert_eq!(kind(&mut n, RawInputEvent::key("ArrowUp")), Some(KeyKind::ArrowUp));
        assert_eq!(kind(&mut n, RawInputEvent::key("ArrowDown")), Some(KeyKind::ArrowDown));
        assert_eq!(kind(&mut n, RawInputEvent::key("Home")), Some(KeyKind::Home));
    }

    #[test]
    fn test_modifier_only_and_key_up_are_ignored() {
        let mut n = InputNormalizer::new();
        assert_eq!(kind(&mut n, RawInputEvent::key("Shift")), None);
        assert_eq!(kind(&mut n, RawInputEvent::key("Control")), None);
        assert_eq!(kind(&mut n, RawInputEvent::key("Dead")), None);
        assert_eq!(
            kind(
                &mut n,
                RawInputEvent::new(RawInput::KeyUp {
                    key: "a".to_string()
                })
            ),
            None
        );
    }

    #[test]
    fn test_ctrl_chords() {
        let mut n = InputNormalizer::new();
        assert_eq!(kind(&mut n, RawInputEvent::ctrl_key("c")), Some(KeyKind::CtrlC));
        assert_eq!(kind(&mut n, RawInputEvent::ctrl_key("l")), Some(KeyKind::ClearScreen));
        assert_eq!(kind(&mut n, RawInputEvent::ctrl_key("v")), None);
        assert_eq!(kind(&mut n, RawInputEvent::ctrl_key("t")), None);
    }

    fn chord(key: &str, mods: Modifiers) -> RawInputEvent {
        RawInputEvent::new(RawInput::KeyDown {
            key: key.to_string(),
            code: String::new(),
            mods,
        })
    }

    #[test]
    fn test_meta_chords_are_left_to_the_browser() {
        let mut n = InputNormalizer::new();
        let meta = Modifiers {
            meta: true,
            ..Modifiers::default()
        };
        assert_eq!(kind(&mut n, chord("c", meta)), None);
        assert_eq!(kind(&mut n, chord("l", meta)), None);
        let ctrl_meta = Modifiers {
            ctrl: true,
            meta: true,
            ..Modifiers::default()
        };
        assert_eq!(kind(&mut n, chord("c", ctrl_meta)), None);
    }

    #[test]
    fn test_altgr_characters_are_typed() {
        let mut n = InputNormalizer::new();
        let altgr = Modifiers {
            ctrl: true,
            alt: true,
            ..Modifiers::default()
        };
        assert_eq!(kind(&mut n, chord("@", altgr)), Some(KeyKind::Printable('@')));
        assert_eq!(kind(&mut n, chord("Dead", altgr)), None);
    }

    #[test]
    fn test_falls_back_to_dom_code() {
        let mut n = InputNormalizer::new();
        let raw = RawInputEvent::new(RawInput::KeyDown {
            key: String::new(),
            code: "NumpadEnter".to_string(),
            mods: Modifiers::default(),
        });
        assert_eq!(kind(&mut n, raw), Some(KeyKind::Enter));
    }

    #[test]
    fn test_paste_is_a_single_event() {
        let mut n = InputNormalizer::new();
        let raw = RawInputEvent::new(RawInput::Paste {
            text: "echo a long pasted line".to_string(),
        });
        assert_eq!(
            kind(&mut n, raw),
            Some(KeyKind::Paste("echo a long pasted line".to_string()))
        );
        let empty = RawInputEvent::new(RawInput::Paste {
            text: String::new(),
        });
        assert_eq!(kind(&mut n, empty), None);
    }

    #[test]
    fn test_virtual_keys() {
        let mut n = InputNormalizer::new();
        let tap = |key: &str| {
            RawInputEvent::new(RawInput::VirtualKey {
                key: key.to_string(),
            })
        };
        assert_eq!(kind(&mut n, tap("CtrlC")), Some(KeyKind::CtrlC));
        assert_eq!(kind(&mut n, tap("ArrowUp")), Some(KeyKind::ArrowUp));
        assert_eq!(kind(&mut n, tap("x")), Some(KeyKind::Printable('x')));
        assert_eq!(
            kind(&mut n, tap("help")),
            Some(KeyKind::Paste("help".to_string()))
        );
        assert_eq!(kind(&mut n, tap("")), None);
    }

    #[test]
    fn test_swipes() {
        let mut n = InputNormalizer::new();
        let swipe = |direction| RawInputEvent::new(RawInput::Swipe { direction });
        assert_eq!(kind(&mut n, swipe(SwipeDirection::Up)), Some(KeyKind::ArrowUp));
        assert_eq!(kind(&mut n, swipe(SwipeDirection::Down)), Some(KeyKind::ArrowDown));
        assert_eq!(kind(&mut n, swipe(SwipeDirection::Left)), None);
        assert_eq!(kind(&mut n, swipe(SwipeDirection::Right)), None);
    }

    #[test]
    fn test_touch_gesture_detection() {
        let mut n = InputNormalizer::new();
        let start = RawInputEvent::new(RawInput::TouchStart { x: 100.0, y: 300.0 });
        let end_up = RawInputEvent::new(RawInput::TouchEnd { x: 110.0, y: 200.0 });
        assert_eq!(kind(&mut n, start.clone()), None);
        assert_eq!(kind(&mut n, end_up), Some(KeyKind::ArrowUp));

        // horizontal swipe is reserved for the page
        assert_eq!(kind(&mut n, start.clone()), None);
        let end_left = RawInputEvent::new(RawInput::TouchEnd { x: 10.0, y: 290.0 });
        assert_eq!(kind(&mut n, end_left), None);

        // a tap is not a swipe
        assert_eq!(kind(&mut n, start), None);
        let tap = RawInputEvent::new(RawInput::TouchEnd { x: 102.0, y: 305.0 });
        assert_eq!(kind(&mut n, tap), None);

        // end without start
        let orphan = RawInputEvent::new(RawInput::TouchEnd { x: 0.0, y: 500.0 });
        assert_eq!(kind(&mut n, orphan), None);
    }

    #[test]
    fn test_json_events() {
        let mut n = InputNormalizer::new();
        let evt = n
            .normalize_json(r#"{"kind":"key_down","key":"h","timestamp_ms":1700000000000}"#)
            .unwrap();
        assert_eq!(evt.kind, KeyKind::Printable('h'));
        assert_eq!(evt.timestamp.timestamp_millis(), 1_700_000_000_000);

        let evt = n
            .normalize_json(r#"{"kind":"key_down","key":"c","mods":{"ctrl":true}}"#)
            .unwrap();
        assert_eq!(evt.kind, KeyKind::CtrlC);

        assert!(n.normalize_json("not json").is_none());
        assert!(n.normalize_json(r#"{"kind":"teleport"}"#).is_none());
        assert!(n.normalize_json(r#"{"kind":"key_down"}"#).is_none());
    }
}
