//! Thread-local tree-sitter parser pool.
//!
//! A parser is created on first use per thread and reused afterwards, so
//! validating many files does not pay grammar setup for each one.

use crate::ts::{CSharpParser, TreeSitterError};
use std::cell::RefCell;

thread_local! {
    static CSHARP_PARSER: RefCell<Option<CSharpParser>> = const { RefCell::new(None) };
}

/// Run `f` with this thread's parser.
pub fn with_parser<F, R>(f: F) -> Result<R, TreeSitterError>
where
    F: FnOnce(&mut CSharpParser) -> R,
{
    CSHARP_PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        let parser = match slot.take() {
            Some(parser) => parser,
            None => CSharpParser::new()?,
        };
        Ok(f(slot.insert(parser)))
    })
}
