//! Matching braces of a whole unit, found in one pass before reading.
//!
//! Whether a `{` is closed later in the unit decides how the reader treats
//! it: a body known to balance reads member-like text as statements, and a
//! capture stops at a brace that never closes. Answering that by scanning
//! ahead from every brace costs time quadratic in the nesting depth of
//! broken input, so the answers are computed once up front.

use jrec_scanner::{ScannerState, SyntaxKind};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, Default)]
pub(crate) struct BraceTable {
    /// Start of each `{` that is closed, to the end of its `}`.
    closing: FxHashMap<u32, u32>,
}

impl BraceTable {
    pub(crate) fn build(source: &str) -> Self {
        let mut scanner = ScannerState::new(source);
        let mut open = Vec::new();
        let mut closing = FxHashMap::default();
        loop {
            match scanner.scan() {
                SyntaxKind::EndOfFileToken => break,
                SyntaxKind::OpenBraceToken => open.push(scanner.token_pos()),
                SyntaxKind::CloseBraceToken => {
                    if let Some(start) = open.pop() {
                        closing.insert(start, scanner.token_end());
                    }
                }
                _ => {}
            }
        }
        BraceTable { closing }
    }

    /// End of the `}` closing the `{` at `start`, if it is closed.
    #[inline]
    pub(crate) fn closing_end(&self, start: u32) -> Option<u32> {
        self.closing.get(&start).copied()
    }

    #[inline]
    pub(crate) fn is_closed(&self, start: u32) -> bool {
        self.closing.contains_key(&start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_braces_match_innermost_first() {
        let table = BraceTable::build("{ { } { } }");
        assert_eq!(table.closing_end(0), Some(11));
        assert_eq!(table.closing_end(2), Some(5));
        assert_eq!(table.closing_end(6), Some(9));
    }

    #[test]
    fn unclosed_braces_have_no_end() {
        let table = BraceTable::build("class A { void f() { { }");
        assert!(!table.is_closed(8));
        assert!(!table.is_closed(19));
        assert_eq!(table.closing_end(21), Some(24));
    }

    #[test]
    fn stray_closing_braces_are_ignored() {
        let table = BraceTable::build("} { } }");
        assert_eq!(table.closing_end(2), Some(5));
        assert!(!table.is_closed(0));
    }

    #[test]
    fn braces_in_strings_and_comments_do_not_count() {
        let table = BraceTable::build("{ \"{\" /* } */ '}' }");
        assert_eq!(table.closing_end(0), Some(19));
    }
}
