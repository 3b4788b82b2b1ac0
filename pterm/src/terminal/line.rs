use std::cmp::min;

const INITIAL_CAP: usize = 256;

/// The line being composed. The cursor counts characters, not bytes.
#[derive(Debug, Clone)]
pub struct LineEditor {
    cursor: usize,
    input: String,
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineEditor {
    pub fn new() -> Self {
        LineEditor {
            cursor: 0,
            input: String::with_capacity(INITIAL_CAP),
        }
    }

    /// Replace the text and move the cursor to the end.
    pub fn reset(&mut self, input: String) {
        self.input = input;
        self.move_to_end();
    }

    /// Replace the text and place the cursor, clamped to the line.
    pub fn set(&mut self, input: String, cursor: usize) {
        self.input = input;
        self.cursor = min(cursor, self.len());
    }

    /// Take the text, leaving an empty line.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.input)
    }

    pub fn as_str(&self) -> &str {
        self.input.as_str()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.cursor = 0;
        self.input.clear();
    }

    pub fn move_to_begin(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.len();
    }

    pub fn insert(&mut self, ch: char) {
        let index = self.byte_index();
        self.input.insert(index, ch);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, string: &str) {
        let index = self.byte_index();
        self.input.insert_str(index, string);
        self.cursor += string.chars().count();
    }

    /// Delete the character before the cursor. Returns whether anything
    /// was deleted.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let index = self.byte_index();
        self.input.remove(index);
        true
    }

    pub fn move_by(&mut self, offset: isize) {
        if offset < 0 {
            self.cursor = self.cursor.saturating_sub(offset.unsigned_abs());
        } else {
            self.cursor = min(self.len(), self.cursor + offset.unsigned_abs());
        }
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor)
            .map_or(self.input.len(), |(index, _)| index)
    }

    pub fn len(&self) -> usize {
        self.input.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }
}
