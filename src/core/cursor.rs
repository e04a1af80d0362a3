//! Command-text cursor and tokenizer
//!
//! Scanning state over the remaining command text. The original kept this in
//! process-wide globals; here it is an explicit value threaded through every
//! parse call, so parsing is reentrant and deterministic under test.
//!
//! All positions count runes. Escape pairs (`\` plus any rune) pass through
//! token collection uninterpreted; whoever consumes the token decides what
//! the escapes mean.

use crate::core::error::{EditError, Result};

/// Terminator set for [`Cursor::collect_token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndMode {
    /// Stop before an unescaped newline.
    Line,
    /// Stop before an unescaped tab or newline.
    Word,
}

impl EndMode {
    fn terminates(self, c: char) -> bool {
        match self {
            EndMode::Line => c == '\n',
            EndMode::Word => c == '\t' || c == '\n',
        }
    }
}

/// A rune-scanning position over command text.
#[derive(Debug)]
pub struct Cursor {
    runes: Vec<char>,
    pos: usize,
}

impl Cursor {
    /// Start scanning at the beginning of `text`.
    pub fn new(text: &str) -> Self {
        Self {
            runes: text.chars().collect(),
            pos: 0,
        }
    }

    /// Look at the next rune without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.runes.get(self.pos).copied()
    }

    /// Consume and return the next rune.
    pub fn getch(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Push the last consumed rune back onto the input.
    pub fn ungetch(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    /// True once every rune has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.runes.len()
    }

    /// Skip spaces and tabs (never newlines).
    pub fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.pos += 1;
        }
    }

    /// Skip blanks and newlines; used between commands in a script.
    pub fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t') | Some('\n')) {
            self.pos += 1;
        }
    }

    /// Consume everything up to and including the next newline.
    pub fn skip_line(&mut self) {
        while let Some(c) = self.getch() {
            if c == '\n' {
                break;
            }
        }
    }

    /// Scan a run of decimal digits. Returns `default` if the next rune is
    /// not a digit. Overflow is a syntax error, not a wrapped value.
    pub fn number(&mut self, default: usize) -> Result<usize> {
        if !matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            return Ok(default);
        }
        let mut n: usize = 0;
        while let Some(c) = self.peek() {
            let Some(d) = c.to_digit(10) else { break };
            n = n
                .checked_mul(10)
                .and_then(|n| n.checked_add(d as usize))
                .ok_or(EditError::Grammar("address number out of range"))?;
            self.pos += 1;
        }
        Ok(n)
    }

    /// Collect runes until the active terminator for `end`. The terminator
    /// itself is left on the cursor and never included in the result. A
    /// backslash and the rune after it are consumed as an inseparable pair
    /// and kept verbatim.
    pub fn collect_token(&mut self, end: EndMode) -> String {
        let mut out = String::new();
        while let Some(c) = self.getch() {
            if c == '\\' {
                out.push('\\');
                if let Some(esc) = self.getch() {
                    out.push(esc);
                }
                continue;
            }
            if end.terminates(c) {
                self.ungetch();
                break;
            }
            out.push(c);
        }
        out
    }

    /// Collect a pattern body up to the matching unescaped `delim`, a
    /// newline, or end of input. A trailing delimiter is consumed; a newline
    /// is not. An escaped delimiter is stripped down to the delimiter rune;
    /// every other escape pair is kept verbatim for the regex engine to
    /// re-parse.
    pub fn collect_pattern(&mut self, delim: char) -> String {
        let mut out = String::new();
        while let Some(c) = self.getch() {
            if c == delim {
                break;
            }
            if c == '\n' {
                self.ungetch();
                break;
            }
            if c == '\\' {
                match self.getch() {
                    Some(esc) if esc == delim => out.push(delim),
                    Some(esc) => {
                        out.push('\\');
                        out.push(esc);
                    }
                    None => out.push('\\'),
                }
                continue;
            }
            out.push(c);
        }
        out
    }
}
