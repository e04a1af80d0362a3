//! Address resolution
//!
//! Turns a parsed [`Addr`] chain into a concrete rune [`Range`] against a
//! buffer snapshot and the current dot. Evaluation is a pure function of
//! `(buffer contents, dot, chain)`: resolving the same address twice against
//! an unchanged buffer yields the same range.
//!
//! Searches compile with multi-line semantics so `^`/`$` address line
//! boundaries, wrap around the buffer once, and report a typed error when no
//! match exists anywhere.

use regex::{Regex, RegexBuilder};

use crate::core::address::{Addr, AddrKind};
use crate::core::buffer::TextBuffer;
use crate::core::error::{EditError, Result};
use crate::core::range::Range;

/// Pending `+`/`-` anchor for the next atom in a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    None,
    Forward,
    Backward,
}

/// Resolve an address chain against `(buf, dot)`.
///
/// Each step's result becomes the base for the next step. Failures (pattern
/// compile errors, exhausted searches, missing mark) abort the whole
/// resolution; there are no partial ranges.
pub fn eval_addr<B: TextBuffer>(buf: &B, dot: Range, addr: &Addr) -> Result<Range> {
    let len = buf.len_runes();
    let text = buf.contents();
    let mut cur = dot.clamp_to(len);
    let mut anchor = Anchor::None;

    let mut node = Some(addr);
    while let Some(a) = node {
        match &a.kind {
            AddrKind::Plus | AddrKind::Minus => {
                let fwd = a.kind == AddrKind::Plus;
                let operand_follows = a.next.as_ref().is_some_and(|n| n.kind.is_operand());
                if operand_follows {
                    anchor = if fwd { Anchor::Forward } else { Anchor::Backward };
                } else {
                    // bare +/-: advance one line, clamped at the buffer edge
                    cur = if fwd {
                        line_forward(buf, cur.end, 1)
                    } else {
                        line_backward(buf, cur.start, 1)
                    };
                }
            }
            AddrKind::CharOffset(n) => {
                cur = Range::point((*n).min(len));
                anchor = Anchor::None;
            }
            AddrKind::Line(n) => {
                cur = match anchor {
                    Anchor::None => absolute_line(buf, *n),
                    Anchor::Forward => line_forward(buf, cur.end, *n),
                    Anchor::Backward => line_backward(buf, cur.start, *n),
                };
                anchor = Anchor::None;
            }
            AddrKind::Forward(pat) => {
                let from = match anchor {
                    Anchor::Backward => cur.start,
                    _ => cur.end,
                };
                cur = search_forward(&text, from, pat)?;
                anchor = Anchor::None;
            }
            AddrKind::Backward(pat) => {
                let from = match anchor {
                    Anchor::Forward => cur.end,
                    _ => cur.start,
                };
                cur = search_backward(&text, from, pat)?;
                anchor = Anchor::None;
            }
            AddrKind::Literal(lit) => {
                cur = find_literal(&text, cur.end, lit)?;
                anchor = Anchor::None;
            }
            AddrKind::Dot => {
                cur = dot.clamp_to(len);
                anchor = Anchor::None;
            }
            AddrKind::End => {
                cur = Range::point(len);
                anchor = Anchor::None;
            }
            AddrKind::Mark => {
                cur = buf.mark().ok_or(EditError::NoMark)?.clamp_to(len);
                anchor = Anchor::None;
            }
        }
        node = a.next.as_deref();
    }
    Ok(cur)
}

/// Compile a search pattern the way every address and `g`/`v` condition
/// does: multi-line, `.` not matching newline.
pub(crate) fn compile_pattern(pat: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pat).multi_line(true).build()?)
}

/// Forward search from rune `from`, wrapping to the start of the buffer.
/// An empty match exactly at `from` is skipped so searches always make
/// progress (`/^/` from the start of a line must find the next line).
fn search_forward(text: &str, from: usize, pat: &str) -> Result<Range> {
    let re = compile_pattern(pat)?;
    let from_byte = rune_to_byte(text, from);

    if let Some(m) = re.find_at(text, from_byte) {
        if !(m.start() == from_byte && m.end() == from_byte) {
            return Ok(match_range(text, m.start(), m.end()));
        }
        if let Some(next) = next_rune_boundary(text, from_byte) {
            if let Some(m) = re.find_at(text, next) {
                return Ok(match_range(text, m.start(), m.end()));
            }
        }
    }
    // wrap to the start of the buffer
    if let Some(m) = re.find(text) {
        return Ok(match_range(text, m.start(), m.end()));
    }
    Err(EditError::SearchExhausted {
        pattern: pat.to_string(),
    })
}

/// Backward search scanning from rune `from` toward the start, wrapping to
/// the end of the buffer. Mirrors `search_forward`, including the refusal
/// of an empty match exactly at `from`.
fn search_backward(text: &str, from: usize, pat: &str) -> Result<Range> {
    let re = compile_pattern(pat)?;
    let to_byte = rune_to_byte(text, from);

    let mut before = None;
    let mut anywhere = None;
    for m in re.find_iter(text) {
        if m.end() <= to_byte && !(m.start() == to_byte && m.end() == to_byte) {
            before = Some((m.start(), m.end()));
        }
        anywhere = Some((m.start(), m.end()));
    }
    match before.or(anywhere) {
        Some((s, e)) => Ok(match_range(text, s, e)),
        None => Err(EditError::SearchExhausted {
            pattern: pat.to_string(),
        }),
    }
}

/// Literal substring search with the forward wrap rule.
fn find_literal(text: &str, from: usize, lit: &str) -> Result<Range> {
    let from_byte = rune_to_byte(text, from);
    let found = text[from_byte..]
        .find(lit)
        .map(|p| from_byte + p)
        .or_else(|| text.find(lit));
    match found {
        Some(p) => Ok(match_range(text, p, p + lit.len())),
        None => Err(EditError::SearchExhausted {
            pattern: lit.to_string(),
        }),
    }
}

fn absolute_line<B: TextBuffer>(buf: &B, n: usize) -> Range {
    // line numbers are 1-based; 0 addresses the start of the buffer
    if n == 0 {
        Range::point(0)
    } else {
        Range::point(buf.line_start(n - 1))
    }
}

fn line_forward<B: TextBuffer>(buf: &B, from: usize, n: usize) -> Range {
    Range::point(buf.line_start(buf.line_of(from) + n))
}

fn line_backward<B: TextBuffer>(buf: &B, from: usize, n: usize) -> Range {
    Range::point(buf.line_start(buf.line_of(from).saturating_sub(n)))
}

fn rune_to_byte(s: &str, rune: usize) -> usize {
    s.char_indices().nth(rune).map_or(s.len(), |(i, _)| i)
}

fn byte_to_rune(s: &str, byte: usize) -> usize {
    s[..byte].chars().count()
}

fn next_rune_boundary(s: &str, byte: usize) -> Option<usize> {
    s[byte..].chars().next().map(|c| byte + c.len_utf8())
}

fn match_range(text: &str, start_byte: usize, end_byte: usize) -> Range {
    Range::new(byte_to_rune(text, start_byte), byte_to_rune(text, end_byte))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::address::parse_addr;
    use crate::core::buffer::RopeBuffer;
    use crate::core::cursor::Cursor;

    const TEXT: &str = "This is a\nshort text\nto try addressing\n";

    fn eval(addr: &str, dot: Range) -> Result<Range> {
        let buf = RopeBuffer::from_string(TEXT);
        let parsed = parse_addr(&mut Cursor::new(addr)).unwrap().unwrap();
        eval_addr(&buf, dot, &parsed)
    }

    #[test]
    fn test_char_offset_and_line() {
        assert_eq!(eval("#3\n", Range::point(0)).unwrap(), Range::point(3));
        assert_eq!(eval("0\n", Range::point(5)).unwrap(), Range::point(0));
        assert_eq!(eval("2\n", Range::point(0)).unwrap(), Range::point(10));
        assert_eq!(eval("3\n", Range::point(0)).unwrap(), Range::point(21));
        // past the last line: clamp to end of buffer
        assert_eq!(eval("99\n", Range::point(0)).unwrap(), Range::point(39));
    }

    #[test]
    fn test_dot_and_end() {
        assert_eq!(eval(".\n", Range::new(2, 6)).unwrap(), Range::new(2, 6));
        assert_eq!(eval("$\n", Range::new(2, 6)).unwrap(), Range::point(39));
    }

    #[test]
    fn test_forward_search_and_wrap() {
        assert_eq!(eval("/short/\n", Range::point(0)).unwrap(), Range::new(10, 15));
        // no match ahead of dot: wrap to the start
        assert_eq!(eval("/This/\n", Range::point(4)).unwrap(), Range::new(0, 4));
    }

    #[test]
    fn test_forward_search_skips_empty_match_at_origin() {
        // `^` matches at offset 0, but the search starts there; the next
        // line start must win
        assert_eq!(eval("/^/\n", Range::point(0)).unwrap(), Range::point(10));
        assert_eq!(eval("/$/\n", Range::point(0)).unwrap(), Range::point(9));
    }

    #[test]
    fn test_backward_search_and_wrap() {
        assert_eq!(eval("?This?\n", Range::point(20)).unwrap(), Range::new(0, 4));
        // nothing before dot: wrap to the end
        assert_eq!(
            eval("?addressing?\n", Range::point(0)).unwrap(),
            Range::new(28, 38)
        );
    }

    #[test]
    fn test_search_exhausted() {
        assert!(matches!(
            eval("/zebra/\n", Range::point(0)),
            Err(EditError::SearchExhausted { .. })
        ));
    }

    #[test]
    fn test_bad_pattern() {
        assert!(matches!(
            eval("/(/\n", Range::point(0)),
            Err(EditError::Pattern(_))
        ));
    }

    #[test]
    fn test_literal_search() {
        assert_eq!(eval("\"short\"\n", Range::point(0)).unwrap(), Range::new(10, 15));
        // literal search wraps like a forward search
        assert_eq!(eval("\"This\"\n", Range::point(16)).unwrap(), Range::new(0, 4));
        assert!(eval("\"zebra\"\n", Range::point(0)).is_err());
    }

    #[test]
    fn test_line_stepping() {
        assert_eq!(eval(".+\n", Range::new(2, 6)).unwrap(), Range::point(10));
        assert_eq!(eval(".-\n", Range::new(12, 15)).unwrap(), Range::point(0));
        assert_eq!(eval(".2\n", Range::point(0)).unwrap(), Range::point(21));
        assert_eq!(eval("+\n", Range::new(2, 6)).unwrap(), Range::point(10));
        // stepping back off the top lands on line 1
        assert_eq!(eval("-\n", Range::point(3)).unwrap(), Range::point(0));
    }

    #[test]
    fn test_search_after_step_operator() {
        assert_eq!(eval("+/try/\n", Range::new(0, 4)).unwrap(), Range::new(24, 27));
        // `-` anchors the search at the range start, so it wraps past it
        assert_eq!(eval("-/This/\n", Range::new(24, 27)).unwrap(), Range::new(0, 4));
    }

    #[test]
    fn test_line_then_search_chain() {
        // `42/abc/` sugar: line atom then implicit `+` then the search
        assert_eq!(eval("2/try/\n", Range::point(0)).unwrap(), Range::new(24, 27));
    }

    #[test]
    fn test_mark_resolution() {
        let mut buf = RopeBuffer::from_string(TEXT);
        let addr = parse_addr(&mut Cursor::new("'\n")).unwrap().unwrap();
        assert!(matches!(
            eval_addr(&buf, Range::point(0), &addr),
            Err(EditError::NoMark)
        ));

        buf.set_mark(Some(Range::new(5, 7)));
        assert_eq!(
            eval_addr(&buf, Range::point(0), &addr).unwrap(),
            Range::new(5, 7)
        );
    }

    #[test]
    fn test_evaluation_is_pure() {
        let buf = RopeBuffer::from_string(TEXT);
        let addr = parse_addr(&mut Cursor::new("/try/+\n")).unwrap().unwrap();
        let dot = Range::new(3, 9);
        let first = eval_addr(&buf, dot, &addr).unwrap();
        let second = eval_addr(&buf, dot, &addr).unwrap();
        assert_eq!(first, second);
        assert_eq!(buf.selection(), Range::point(0), "evaluation must not move dot");
    }
}
