//! Address expressions
//!
//! An address is a chain of atoms evaluated left to right (`42`, `/foo/`,
//! `.+3`, `"lit" 42`). The parser builds the chain; resolution against a
//! buffer happens in [`crate::core::evaluator`].

use crate::core::cursor::Cursor;
use crate::core::error::{EditError, Result};

/// One atom of an address expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddrKind {
    /// `#n`: absolute rune offset (defaults to 1 for a bare `#`)
    CharOffset(usize),
    /// `n`: 1-based line number; 0 addresses the start of the buffer
    Line(usize),
    /// `/re/`: forward regex search, wrapping at end of buffer
    Forward(String),
    /// `?re?`: backward regex search, wrapping at start of buffer
    Backward(String),
    /// `"text"`: literal (non-regex) substring search
    Literal(String),
    /// `.`: the current dot
    Dot,
    /// `$`: zero-width point at end of buffer
    End,
    /// `+`: anchor what follows at the end of the working range
    Plus,
    /// `-`: anchor what follows at the start of the working range
    Minus,
    /// `'`: the mark tracked by the buffer collaborator
    Mark,
}

impl AddrKind {
    /// Atoms that can serve as the operand of a `+`/`-` step.
    pub(crate) fn is_operand(&self) -> bool {
        matches!(
            self,
            AddrKind::CharOffset(_)
                | AddrKind::Line(_)
                | AddrKind::Forward(_)
                | AddrKind::Backward(_)
                | AddrKind::Literal(_)
        )
    }
}

/// A parsed address: one atom plus the rest of the chain. Each step's
/// result becomes the base for the next step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addr {
    /// This step
    pub kind: AddrKind,
    /// Remaining steps, owned
    pub next: Option<Box<Addr>>,
}

impl Addr {
    fn atom(kind: AddrKind) -> Self {
        Self { kind, next: None }
    }
}

/// Parse an address chain off the cursor.
///
/// Returns `Ok(None)` for "no address here": empty input, a bare newline,
/// or a rune that starts a command verb instead. The caller defaults to dot.
pub fn parse_addr(cur: &mut Cursor) -> Result<Option<Addr>> {
    cur.skip_blanks();
    let kind = match cur.peek() {
        None => return Ok(None),
        Some('#') => {
            cur.getch();
            AddrKind::CharOffset(cur.number(1)?)
        }
        Some(c) if c.is_ascii_digit() => AddrKind::Line(cur.number(0)?),
        Some('/') => {
            cur.getch();
            AddrKind::Forward(pattern_body(cur, '/')?)
        }
        Some('?') => {
            cur.getch();
            AddrKind::Backward(pattern_body(cur, '?')?)
        }
        Some('"') => {
            cur.getch();
            AddrKind::Literal(pattern_body(cur, '"')?)
        }
        Some('.') => {
            cur.getch();
            AddrKind::Dot
        }
        Some('$') => {
            cur.getch();
            AddrKind::End
        }
        Some('+') => {
            cur.getch();
            AddrKind::Plus
        }
        Some('-') => {
            cur.getch();
            AddrKind::Minus
        }
        Some(_) => return Ok(None),
    };

    let mut addr = Addr::atom(kind);
    if let Some(tail) = parse_addr(cur)? {
        addr.next = Some(Box::new(link(&addr.kind, tail)?));
    }
    Ok(Some(addr))
}

fn pattern_body(cur: &mut Cursor, delim: char) -> Result<String> {
    let body = cur.collect_pattern(delim);
    if body.is_empty() {
        return Err(EditError::Grammar("empty pattern"));
    }
    Ok(body)
}

/// Decide how a freshly parsed tail attaches to the atom before it: directly,
/// through an implicit `+`, or not at all.
fn link(head: &AddrKind, tail: Addr) -> Result<Addr> {
    match &tail.kind {
        // `.`, `$`, `'` may only follow a quoted atom
        AddrKind::Dot | AddrKind::End | AddrKind::Mark => {
            if matches!(head, AddrKind::Literal(_)) {
                Ok(tail)
            } else {
                Err(EditError::Grammar("bad address syntax"))
            }
        }
        // a quoted atom never follows another atom
        AddrKind::Literal(_) => Err(EditError::Grammar("bad address syntax")),
        // `"abc" 42` chains directly; elsewhere adjacency implies `+`
        AddrKind::Line(_) | AddrKind::CharOffset(_) if matches!(head, AddrKind::Literal(_)) => {
            Ok(tail)
        }
        AddrKind::Line(_) | AddrKind::CharOffset(_) | AddrKind::Forward(_) | AddrKind::Backward(_) => {
            if matches!(head, AddrKind::Plus | AddrKind::Minus) {
                Ok(tail)
            } else {
                Ok(Addr {
                    kind: AddrKind::Plus,
                    next: Some(Box::new(tail)),
                })
            }
        }
        AddrKind::Plus | AddrKind::Minus => Ok(tail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Option<Addr>> {
        parse_addr(&mut Cursor::new(s))
    }

    #[test]
    fn test_no_address() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("\n").unwrap(), None);
        assert_eq!(parse("abc\n").unwrap(), None);
    }

    #[test]
    fn test_char_offset_default() {
        let addr = parse("#\n").unwrap().unwrap();
        assert_eq!(addr.kind, AddrKind::CharOffset(1));
        assert!(addr.next.is_none());
    }

    #[test]
    fn test_dot_number_sugar() {
        // `.42` is `.` chained through an implicit `+` to line 42
        let addr = parse(".42\n").unwrap().unwrap();
        assert_eq!(addr.kind, AddrKind::Dot);
        let plus = addr.next.unwrap();
        assert_eq!(plus.kind, AddrKind::Plus);
        let line = plus.next.unwrap();
        assert_eq!(line.kind, AddrKind::Line(42));
        assert!(line.next.is_none());
    }

    #[test]
    fn test_digit_then_punctuation_is_rejected() {
        assert!(parse("42.\n").is_err());
        assert!(parse("42$\n").is_err());
        assert!(parse("42'\n").is_err());
        assert!(parse("42\"\n").is_err());
    }

    #[test]
    fn test_consecutive_quoted_atoms_are_rejected() {
        assert!(parse("\"abc\" \"cdf\" \"efg\"\n").is_err());
    }

    #[test]
    fn test_quoted_atom_chains_to_line_directly() {
        let addr = parse("\"abc\" 42\n").unwrap().unwrap();
        assert_eq!(addr.kind, AddrKind::Literal("abc".to_string()));
        assert_eq!(addr.next.unwrap().kind, AddrKind::Line(42));
    }

    #[test]
    fn test_escaped_delimiter_is_stripped() {
        let addr = parse("/a\\/bc/\n").unwrap().unwrap();
        assert_eq!(addr.kind, AddrKind::Forward("a/bc".to_string()));
    }

    #[test]
    fn test_other_escapes_are_preserved() {
        let addr = parse("/a\\nbc/\n").unwrap().unwrap();
        assert_eq!(addr.kind, AddrKind::Forward("a\\nbc".to_string()));
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        assert!(parse("//\n").is_err());
        assert!(parse("?\n").is_err());
    }
}
