//! Command dispatch
//!
//! The driving loop of the engine: parse an optional address chain, parse a
//! one-rune verb and its arguments, execute, repeat until the script is
//! exhausted. Edit-producing verbs never touch the buffer directly; they
//! queue records on the [`EditLog`], which commits once at the end of the
//! pass so every address in the script resolves against the same snapshot.
//!
//! A parse or evaluation error aborts the remainder of the script, discards
//! the pending log and restores dot; the buffer is left exactly as it was.

use crate::core::address::parse_addr;
use crate::core::buffer::TextBuffer;
use crate::core::cursor::{Cursor, EndMode};
use crate::core::editlog::EditLog;
use crate::core::error::{EditError, Result};
use crate::core::evaluator::{compile_pattern, eval_addr};
use crate::core::range::Range;

/// Maximum nesting of `g`/`v` subcommands, to keep recursive scripts from
/// overflowing the stack.
const MAX_DISPATCH_DEPTH: usize = 64;

/// External collaborator for the verbs the engine recognizes but does not
/// own: substitution, mark placement, file loading, filename changes.
///
/// Every method defaults to a typed rejection, so a host only implements
/// what it actually supports and nothing fails silently.
pub trait Host {
    /// `s`: substitute `pattern` with `replacement` over `range`.
    fn substitute(&mut self, _range: Range, _pattern: &str, _replacement: &str) -> Result<()> {
        Err(EditError::Unsupported('s'))
    }

    /// `b`: set the mark to `range`.
    fn set_mark(&mut self, _range: Range) -> Result<()> {
        Err(EditError::Unsupported('b'))
    }

    /// `e`: load the named file into the buffer.
    fn load_file(&mut self, _name: &str) -> Result<()> {
        Err(EditError::Unsupported('e'))
    }

    /// `f`: change the buffer's filename.
    fn set_filename(&mut self, _name: &str) -> Result<()> {
        Err(EditError::Unsupported('f'))
    }
}

/// Host that rejects every delegated verb.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHost;

impl Host for NoHost {}

/// Parse and execute `script` against `buf`, committing the edits it
/// produces before returning. Dot ends on the new content of the last edit.
pub fn editcmd<B: TextBuffer>(buf: &mut B, script: &str) -> Result<()> {
    editcmd_with(buf, &mut NoHost, script)
}

/// [`editcmd`] with an explicit host for the delegated verbs.
pub fn editcmd_with<B: TextBuffer, H: Host>(buf: &mut B, host: &mut H, script: &str) -> Result<()> {
    let saved_dot = buf.selection();
    let outcome = match run_script(buf, host, script) {
        Ok(mut log) => log.apply(buf),
        Err(e) => Err(e),
    };
    match outcome {
        Ok(new_dot) => {
            if let Some(r) = new_dot {
                buf.set_selection_start(r.start);
                buf.set_selection_end(r.end);
            }
            Ok(())
        }
        Err(e) => {
            // per-command atomicity: nothing was committed, dot goes back
            buf.set_selection_start(saved_dot.start);
            buf.set_selection_end(saved_dot.end);
            Err(e)
        }
    }
}

/// Parse and execute `script`, but leave the pending edits in the returned
/// log for the embedding host to apply once its own bookkeeping is done.
/// Dot is left on the last verb's resolved range, in snapshot coordinates.
pub fn editcmd_deferred<B: TextBuffer, H: Host>(
    buf: &mut B,
    host: &mut H,
    script: &str,
) -> Result<EditLog> {
    let saved_dot = buf.selection();
    match run_script(buf, host, script) {
        Ok(log) => Ok(log),
        Err(e) => {
            buf.set_selection_start(saved_dot.start);
            buf.set_selection_end(saved_dot.end);
            Err(e)
        }
    }
}

fn run_script<B: TextBuffer, H: Host>(
    buf: &mut B,
    host: &mut H,
    script: &str,
) -> Result<EditLog> {
    let mut dispatcher = Dispatcher {
        buf,
        host,
        log: EditLog::new(),
        depth: 0,
    };
    let mut cur = Cursor::new(script);
    loop {
        cur.skip_separators();
        if cur.at_end() {
            break;
        }
        dispatcher.exec_cmd(&mut cur)?;
    }
    Ok(dispatcher.log)
}

struct Dispatcher<'a, B: TextBuffer, H: Host> {
    buf: &'a mut B,
    host: &'a mut H,
    log: EditLog,
    depth: usize,
}

impl<B: TextBuffer, H: Host> Dispatcher<'_, B, H> {
    /// Parse and execute one command off the cursor.
    fn exec_cmd(&mut self, cur: &mut Cursor) -> Result<()> {
        if self.depth > MAX_DISPATCH_DEPTH {
            return Err(EditError::RecursionLimit);
        }

        let addr = parse_addr(cur)?;
        cur.skip_blanks();

        let dot = self.buf.selection().clamp_to(self.buf.len_runes());
        let range = match &addr {
            Some(a) => eval_addr(&*self.buf, dot, a)?,
            None => dot,
        };

        let verb = match cur.getch() {
            None => {
                // a bare address positions dot
                if addr.is_some() {
                    self.set_dot(range);
                }
                return Ok(());
            }
            Some('\n') => {
                if addr.is_some() {
                    self.set_dot(range);
                }
                return Ok(());
            }
            Some(c) => c,
        };

        log::debug!("execute '{}' over {:?}", verb, range);
        match verb {
            'a' => {
                let text = collect_text(cur)?;
                self.log.record_insert(range.end, &text);
                self.set_dot(range);
            }
            'i' => {
                let text = collect_text(cur)?;
                self.log.record_insert(range.start, &text);
                self.set_dot(range);
            }
            'c' => {
                let text = collect_text(cur)?;
                self.log.record_replace(range, &text);
                self.set_dot(range);
            }
            'd' => {
                self.log.record_delete(range);
                self.set_dot(Range::point(range.start));
            }
            'm' | 't' => {
                cur.skip_blanks();
                let dst_addr = parse_addr(cur)?
                    .ok_or(EditError::Grammar("destination address expected"))?;
                // the destination resolves with the source range as its base
                let dst = eval_addr(&*self.buf, range, &dst_addr)?;
                let text = self.buf.read_back(range.start, range.len());
                if verb == 'm' {
                    self.log.record_delete(range);
                }
                self.log.record_insert(dst.end, &text);
                self.set_dot(Range::point(dst.end));
            }
            'g' | 'v' => {
                cur.skip_blanks();
                match cur.getch() {
                    Some('/') => {}
                    _ => return Err(EditError::Grammar("'/' expected after g or v")),
                }
                let pat = cur.collect_pattern('/');
                if pat.is_empty() {
                    return Err(EditError::Grammar("empty pattern"));
                }
                let re = compile_pattern(&pat)?;
                // the condition tests the resolved range as a whole, never
                // line by line
                let text = self.buf.read_back(range.start, range.len());
                if re.is_match(&text) == (verb == 'g') {
                    self.set_dot(range);
                    cur.skip_blanks();
                    self.depth += 1;
                    let nested = self.exec_cmd(cur);
                    self.depth -= 1;
                    nested?;
                } else {
                    // consume the untaken subcommand
                    cur.skip_line();
                }
            }
            's' => {
                cur.skip_blanks();
                let delim = match cur.getch() {
                    Some(c) if c != '\n' && !c.is_alphanumeric() => c,
                    _ => return Err(EditError::Grammar("bad delimiter")),
                };
                let pat = cur.collect_pattern(delim);
                if pat.is_empty() {
                    return Err(EditError::Grammar("empty pattern"));
                }
                let replacement = cur.collect_pattern(delim);
                self.host.substitute(range, &pat, &replacement)?;
                self.set_dot(range);
            }
            'b' => {
                self.host.set_mark(range)?;
                self.set_dot(range);
            }
            'e' => {
                let name = cur.collect_token(EndMode::Word);
                self.host.load_file(name.trim())?;
            }
            'f' => {
                let name = cur.collect_token(EndMode::Word);
                self.host.set_filename(name.trim())?;
            }
            _ => return Err(EditError::Grammar("unknown command")),
        }
        Ok(())
    }

    fn set_dot(&mut self, r: Range) {
        self.buf.set_selection_start(r.start);
        self.buf.set_selection_end(r.end);
    }
}

/// Collect the text argument of `a`/`i`/`c`: blanks, then a non-alphanumeric
/// delimiter, then runes to the matching unescaped delimiter or end of line.
/// The text is kept verbatim; no escapes are interpreted here.
fn collect_text(cur: &mut Cursor) -> Result<String> {
    cur.skip_blanks();
    match cur.peek() {
        None | Some('\n') => Ok(String::new()),
        Some(c) if c.is_alphanumeric() => Err(EditError::Grammar("bad delimiter")),
        Some(c) => {
            cur.getch();
            Ok(cur.collect_pattern(c))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::buffer::RopeBuffer;

    const TEXT: &str = "This is a\nshort text\nto try addressing\n";

    fn buffer_with_dot(start: usize, end: usize) -> RopeBuffer {
        let mut buf = RopeBuffer::from_string(TEXT);
        buf.set_selection_start(start);
        buf.set_selection_end(end);
        buf
    }

    #[test]
    fn test_append_at_dot() {
        let mut buf = buffer_with_dot(0, 0);
        editcmd(&mut buf, "a/junk").unwrap();
        assert_eq!(
            buf.contents(),
            "junkThis is a\nshort text\nto try addressing\n"
        );
        // dot spans the inserted text
        assert_eq!(buf.selection(), Range::new(0, 4));
    }

    #[test]
    fn test_unknown_verb_is_rejected() {
        let mut buf = buffer_with_dot(0, 0);
        let err = editcmd(&mut buf, "q").unwrap_err();
        assert!(matches!(err, EditError::Grammar(_)));
        assert_eq!(buf.contents(), TEXT);
    }

    #[test]
    fn test_error_discards_pending_edits_and_restores_dot() {
        let mut buf = buffer_with_dot(2, 6);
        // the delete is queued, then the bad search aborts the script
        let err = editcmd(&mut buf, "d\n/zebra/d").unwrap_err();
        assert!(matches!(err, EditError::SearchExhausted { .. }));
        assert_eq!(buf.contents(), TEXT);
        assert_eq!(buf.selection(), Range::new(2, 6));
    }

    #[test]
    fn test_delegated_verbs_reach_the_host() {
        #[derive(Default)]
        struct Recorder {
            subs: Vec<(Range, String, String)>,
            files: Vec<String>,
        }
        impl Host for Recorder {
            fn substitute(&mut self, range: Range, pat: &str, repl: &str) -> Result<()> {
                self.subs.push((range, pat.to_string(), repl.to_string()));
                Ok(())
            }
            fn load_file(&mut self, name: &str) -> Result<()> {
                self.files.push(name.to_string());
                Ok(())
            }
        }

        let mut buf = buffer_with_dot(0, 4);
        let mut host = Recorder::default();
        editcmd_with(&mut buf, &mut host, "s/This/That/").unwrap();
        editcmd_with(&mut buf, &mut host, "e notes.txt").unwrap();
        assert_eq!(
            host.subs,
            vec![(Range::new(0, 4), "This".to_string(), "That".to_string())]
        );
        assert_eq!(host.files, vec!["notes.txt".to_string()]);
    }

    #[test]
    fn test_delegated_verb_without_host_is_an_error() {
        let mut buf = buffer_with_dot(0, 4);
        let err = editcmd(&mut buf, "s/a/b/").unwrap_err();
        assert!(matches!(err, EditError::Unsupported('s')));
        let err = editcmd(&mut buf, "f newname").unwrap_err();
        assert!(matches!(err, EditError::Unsupported('f')));
    }

    #[test]
    fn test_bare_address_positions_dot() {
        let mut buf = buffer_with_dot(0, 0);
        editcmd(&mut buf, "/short/").unwrap();
        assert_eq!(buf.selection(), Range::new(10, 15));
        assert_eq!(buf.contents(), TEXT);
    }

    #[test]
    fn test_recursion_limit() {
        let mut buf = buffer_with_dot(0, 4);
        let mut script = String::new();
        for _ in 0..70 {
            script.push_str("g/This/ ");
        }
        script.push('d');
        let err = editcmd(&mut buf, &script).unwrap_err();
        assert!(matches!(err, EditError::RecursionLimit));
        assert_eq!(buf.contents(), TEXT);
    }

    #[test]
    fn test_deferred_log_is_applied_by_the_caller() {
        let mut buf = buffer_with_dot(2, 6);
        let mut log = editcmd_deferred(&mut buf, &mut NoHost, "d").unwrap();
        // nothing happens until the host applies the log
        assert_eq!(buf.contents(), TEXT);
        assert_eq!(log.len(), 1);
        log.apply(&mut buf).unwrap();
        assert_eq!(buf.contents(), "Ths a\nshort text\nto try addressing\n");
    }
}
