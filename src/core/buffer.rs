//! Buffer contract and reference implementation
//!
//! The engine never owns text storage. It talks to a narrow, rune-addressed
//! contract: insert, delete, read-back, and the live selection ("dot").
//! Whether the host keeps a rope, a gap buffer or a piece table is its own
//! business.
//!
//! `RopeBuffer` is the crate's reference implementation over a ropey `Rope`,
//! which is natively char-indexed, so rune offsets come for free.

use ropey::Rope;

use crate::core::range::Range;

/// Rune-addressable text storage as seen by the edit engine.
///
/// Implementations must clamp offsets to the buffer length rather than
/// panic; the engine already clamps resolved addresses, this is the second
/// line of defense for hand-written hosts.
pub trait TextBuffer {
    /// Total length in runes.
    fn len_runes(&self) -> usize;

    /// Insert `text` so its first rune lands at `offset`.
    fn insert(&mut self, offset: usize, text: &str);

    /// Remove `count` runes starting at `offset`.
    fn delete(&mut self, offset: usize, count: usize);

    /// Read back `count` runes starting at `offset`.
    fn read_back(&self, offset: usize, count: usize) -> String;

    /// Move the start of the selection.
    fn set_selection_start(&mut self, offset: usize);

    /// Move the end of the selection.
    fn set_selection_end(&mut self, offset: usize);

    /// The live selection (dot).
    fn selection(&self) -> Range;

    /// The `'` mark, if the host tracks one.
    fn mark(&self) -> Option<Range> {
        None
    }

    /// Check if the buffer holds no runes.
    fn is_empty(&self) -> bool {
        self.len_runes() == 0
    }

    /// The whole buffer as a string.
    fn contents(&self) -> String {
        self.read_back(0, self.len_runes())
    }

    /// Rune offset of the start of 0-based line `line`, clamped to the end
    /// of the buffer when the line does not exist.
    ///
    /// The default implementation scans; hosts with cheaper line indexes
    /// should override it.
    fn line_start(&self, line: usize) -> usize {
        if line == 0 {
            return 0;
        }
        let mut seen = 0;
        for (i, c) in self.contents().chars().enumerate() {
            if c == '\n' {
                seen += 1;
                if seen == line {
                    return i + 1;
                }
            }
        }
        self.len_runes()
    }

    /// 0-based line index holding rune `offset` (the number of newlines
    /// before it).
    fn line_of(&self, offset: usize) -> usize {
        self.contents()
            .chars()
            .take(offset)
            .filter(|&c| c == '\n')
            .count()
    }
}

/// Reference buffer: a rope plus a selection and an optional mark.
#[derive(Debug, Clone)]
pub struct RopeBuffer {
    rope: Rope,
    sel_start: usize,
    sel_end: usize,
    mark: Option<Range>,
}

impl RopeBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            sel_start: 0,
            sel_end: 0,
            mark: None,
        }
    }

    /// Create a buffer from a string, dot at the start.
    pub fn from_string(content: impl AsRef<str>) -> Self {
        Self {
            rope: Rope::from_str(content.as_ref()),
            sel_start: 0,
            sel_end: 0,
            mark: None,
        }
    }

    /// Set or clear the `'` mark.
    pub fn set_mark(&mut self, mark: Option<Range>) {
        self.mark = mark.map(|r| r.clamp_to(self.rope.len_chars()));
    }
}

impl Default for RopeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer for RopeBuffer {
    fn len_runes(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert(&mut self, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let offset = offset.min(self.rope.len_chars());
        self.rope.insert(offset, text);
    }

    fn delete(&mut self, offset: usize, count: usize) {
        let len = self.rope.len_chars();
        if count == 0 || offset >= len {
            return;
        }
        let end = (offset + count).min(len);
        self.rope.remove(offset..end);
    }

    fn read_back(&self, offset: usize, count: usize) -> String {
        let len = self.rope.len_chars();
        let start = offset.min(len);
        let end = (start + count).min(len);
        if start >= end {
            return String::new();
        }
        self.rope.slice(start..end).to_string()
    }

    fn set_selection_start(&mut self, offset: usize) {
        self.sel_start = offset.min(self.rope.len_chars());
    }

    fn set_selection_end(&mut self, offset: usize) {
        self.sel_end = offset.min(self.rope.len_chars());
    }

    fn selection(&self) -> Range {
        Range::new(self.sel_start, self.sel_end)
    }

    fn mark(&self) -> Option<Range> {
        self.mark
    }

    fn line_start(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            self.rope.len_chars()
        } else {
            self.rope.line_to_char(line)
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.rope.len_chars()))
    }
}
