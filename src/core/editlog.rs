//! Deferred edit log
//!
//! Edits produced by one dispatch pass are computed against a single buffer
//! snapshot, so they cannot be applied as they are found; each application
//! would invalidate the offsets the next computation relied on. The log
//! collects them and commits once: sort by original start offset, walk with
//! a running length delta, shift, apply.
//!
//! Overlapping records are a caller error and are rejected before the first
//! mutation, so a refused log leaves the buffer untouched.

use crate::core::buffer::TextBuffer;
use crate::core::error::{EditError, Result};
use crate::core::range::Range;

/// What a pending edit does to its snapshot range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Insert text at a zero-width point
    Insert,
    /// Remove the range
    Delete,
    /// Remove the range, then insert text in its place
    Replace,
}

/// One pending edit, in snapshot coordinates.
#[derive(Debug, Clone)]
pub struct EditRecord {
    /// Kind of mutation
    pub kind: EditKind,
    /// Affected range of the snapshot (`start == end` for inserts)
    pub range: Range,
    /// Replacement/inserted text (empty for deletes)
    pub text: String,
}

impl EditRecord {
    fn new_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Ordered collection of pending edits from one dispatch pass.
#[derive(Debug, Default)]
pub struct EditLog {
    records: Vec<EditRecord>,
}

impl EditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether any edits are pending.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of pending edits.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Queue an insertion of `text` at rune `offset`.
    pub fn record_insert(&mut self, offset: usize, text: &str) {
        self.records.push(EditRecord {
            kind: EditKind::Insert,
            range: Range::point(offset),
            text: text.to_string(),
        });
    }

    /// Queue a deletion of `range`.
    pub fn record_delete(&mut self, range: Range) {
        self.records.push(EditRecord {
            kind: EditKind::Delete,
            range,
            text: String::new(),
        });
    }

    /// Queue a replacement of `range` with `text`.
    pub fn record_replace(&mut self, range: Range, text: &str) {
        self.records.push(EditRecord {
            kind: EditKind::Replace,
            range,
            text: text.to_string(),
        });
    }

    /// Drop all pending edits without applying them.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Commit every pending edit against `buf` and clear the log.
    ///
    /// Records are validated for overlap first, then applied in ascending
    /// snapshot order with an accumulated length delta correcting each
    /// position. Returns the post-commit range of the last-recorded edit's
    /// new content (a zero-width point for a delete), or `None` when the
    /// log was empty; the dispatcher uses it as the new dot.
    pub fn apply<B: TextBuffer>(&mut self, buf: &mut B) -> Result<Option<Range>> {
        if self.records.is_empty() {
            return Ok(None);
        }

        // Stable sort keeps same-offset inserts in recording order
        let mut order: Vec<usize> = (0..self.records.len()).collect();
        order.sort_by_key(|&i| self.records[i].range.start);

        // Validate the whole log before touching the buffer
        for pair in order.windows(2) {
            let (a, b) = (&self.records[pair[0]], &self.records[pair[1]]);
            if a.range.end > b.range.start {
                return Err(EditError::OverlappingEdit {
                    first: a.range,
                    second: b.range,
                });
            }
        }

        let last_recorded = self.records.len() - 1;
        let mut delta: isize = 0;
        let mut dot = None;
        for &i in &order {
            let rec = &self.records[i];
            let start = rec.range.start.saturating_add_signed(delta);
            let new_len = rec.new_len();
            log::trace!(
                "apply {:?} at {} (snapshot {:?}, delta {})",
                rec.kind,
                start,
                rec.range,
                delta
            );
            match rec.kind {
                EditKind::Insert => buf.insert(start, &rec.text),
                EditKind::Delete => buf.delete(start, rec.range.len()),
                EditKind::Replace => {
                    buf.delete(start, rec.range.len());
                    buf.insert(start, &rec.text);
                }
            }
            if i == last_recorded {
                dot = Some(Range::new(start, start + new_len));
            }
            delta += new_len as isize - rec.range.len() as isize;
        }

        self.records.clear();
        Ok(dot)
    }
}
