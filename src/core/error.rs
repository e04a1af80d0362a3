//! Error types for the edit engine
//!
//! A command either runs to completion or fails with one of these kinds;
//! the dispatcher guarantees that a failed command commits nothing.

use thiserror::Error;

use crate::core::range::Range;

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EditError>;

/// Everything that can go wrong while parsing, resolving or committing
/// an edit command.
#[derive(Debug, Error)]
pub enum EditError {
    /// Malformed address or command syntax. Parsing stops before any
    /// mutation, so grammar errors never touch the buffer.
    #[error("bad syntax: {0}")]
    Grammar(&'static str),

    /// A search pattern failed to compile.
    #[error("bad pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// No match anywhere in the buffer, even after wrapping around.
    #[error("no match for pattern {pattern:?}")]
    SearchExhausted {
        /// The pattern or literal that matched nothing
        pattern: String,
    },

    /// Two pending edits in one pass touch overlapping snapshot ranges.
    /// The log refuses to resolve this silently.
    #[error("overlapping edits over runes {first:?} and {second:?}")]
    OverlappingEdit {
        /// Earlier record's snapshot range
        first: Range,
        /// Later record's snapshot range
        second: Range,
    },

    /// The `'` address was used but the buffer tracks no mark.
    #[error("no mark set")]
    NoMark,

    /// A delegated verb (`s`, `b`, `e`, `f`) reached a host that does not
    /// implement it.
    #[error("command '{0}' not supported by this host")]
    Unsupported(char),

    /// Nested `g`/`v` commands exceeded the dispatch depth limit.
    #[error("command recursion limit exceeded")]
    RecursionLimit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_stable() {
        let err = EditError::Grammar("address expected");
        assert_eq!(err.to_string(), "bad syntax: address expected");

        let err = EditError::SearchExhausted {
            pattern: "zzz".to_string(),
        };
        assert_eq!(err.to_string(), "no match for pattern \"zzz\"");

        let err = EditError::Unsupported('e');
        assert_eq!(err.to_string(), "command 'e' not supported by this host");
    }

    #[test]
    fn test_pattern_error_wraps_regex_error() {
        let bad = regex::Regex::new("(").unwrap_err();
        let err: EditError = bad.into();
        assert!(matches!(err, EditError::Pattern(_)));
    }
}
