//! This module constitutes the core, headless edit engine of edcmd.
//! It parses sam-style address expressions, resolves them against a
//! rune-addressable buffer and the current selection ("dot"), and applies
//! insert/delete/change/move/copy/conditional transformations through a
//! deferred edit log so that every address in one script resolves against
//! the same buffer snapshot.

pub mod address;
pub mod buffer;
pub mod cursor;
pub mod dispatcher;
pub mod editlog;
pub mod error;
pub mod evaluator;
pub mod range;

pub use address::{parse_addr, Addr, AddrKind};
pub use buffer::{RopeBuffer, TextBuffer};
pub use cursor::{Cursor, EndMode};
pub use dispatcher::{editcmd, editcmd_deferred, editcmd_with, Host, NoHost};
pub use editlog::{EditKind, EditLog, EditRecord};
pub use error::{EditError, Result};
pub use evaluator::eval_addr;
pub use range::Range;
