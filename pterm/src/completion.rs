use crate::registry::CommandRegistry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const NAME_SCORE: i64 = 2;
const ALIAS_SCORE: i64 = 1;
const EXACT_BONUS: i64 = 1;

/// A completion suggestion for the command token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteCandidate {
    pub text: String,
    pub score: i64,
    /// Canonical command name (differs from `text` for aliases).
    pub command: String,
}

/// Prefix completion of command names and aliases.
///
/// Results are recomputed on every call; the registry is small and static.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutocompleteEngine;

impl AutocompleteEngine {
    pub fn new() -> Self {
        Self
    }

    /// Every name or alias starting with `partial` (case-insensitive).
    ///
    /// Names rank above aliases and an exact match ranks above both; ties
    /// are ordered lexicographically. A blank partial yields nothing.
    pub fn suggest(&self, partial: &str, registry: &CommandRegistry) -> Vec<AutocompleteCandidate> {
        if partial.is_empty() {
            return Vec::new();
        }
        let partial = partial.to_lowercase();

        let mut candidates: Vec<AutocompleteCandidate> = Vec::new();
        for command in registry.list_for_autocomplete() {
            let texts = std::iter::once((&command.name, NAME_SCORE))
                .chain(command.aliases.iter().map(|a| (a, ALIAS_SCORE)));
            for (text, base) in texts {
                let lower = text.to_lowercase();
                if !lower.starts_with(&partial) {
                    continue;
                }
                let score = if lower == partial {
                    base + EXACT_BONUS
                } else {
                    base
                };
                candidates.push(AutocompleteCandidate {
                    text: text.clone(),
                    score,
                    command: command.name.clone(),
                });
            }
        }

        candidates.sort_by(rank);
        candidates
    }
}

fn rank(a: &AutocompleteCandidate, b: &AutocompleteCandidate) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.text.to_lowercase().cmp(&b.text.to_lowercase()))
        .then_with(|| a.text.cmp(&b.text))
}

/// The command token being typed, if the cursor is still inside it.
///
/// `cursor` counts characters. Returns `None` for a blank line or once the
/// user has moved on to the arguments.
pub fn command_partial(line: &str, cursor: usize) -> Option<&str> {
    let end = line
        .char_indices()
        .nth(cursor)
        .map_or(line.len(), |(index, _)| index);
    let partial = line[..end].trim_start();
    if partial.is_empty() || partial.chars().any(char::is_whitespace) {
        None
    } else {
        Some(partial)
    }
}

/// Replace the first token of `line` with `text`.
///
/// Returns the new line and the cursor position (in characters) right after
/// the inserted token.
pub fn replace_command_token(line: &str, text: &str) -> (String, usize) {
    let trimmed = line.trim_start();
    let leading = &line[..line.len() - trimmed.len()];
    let rest = trimmed
        .find(char::is_whitespace)
        .map_or("", |index| &trimmed[index..]);

    let mut replaced = String::with_capacity(leading.len() + text.len() + rest.len());
    replaced.push_str(leading);
    replaced.push_str(text);
    let cursor = replaced.chars().count();
    replaced.push_str(rest);
    (replaced, cursor)
}
