//! Source spans.
//!
//! A `Span` is a half-open byte range `[start, end)` into one source unit.
//! Declarations under recovery frequently do not know where they end yet;
//! that state is encoded with the `Span::UNKNOWN_END` sentinel instead of an
//! `Option`, so spans stay `Copy` and cheap to compare.

use serde::Serialize;
use std::fmt;

/// Half-open byte range into the source text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Sentinel stored in `end` while the end of a declaration is not known.
    pub const UNKNOWN_END: u32 = u32::MAX;

    /// Empty span at offset zero.
    pub const EMPTY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Span {
        Span { start, end }
    }

    /// A span that starts at `start` and whose end is not known yet.
    #[inline]
    pub const fn open(start: u32) -> Span {
        Span {
            start,
            end: Self::UNKNOWN_END,
        }
    }

    /// Zero-width span at `offset`.
    #[inline]
    pub const fn at(offset: u32) -> Span {
        Span {
            start: offset,
            end: offset,
        }
    }

    #[inline]
    pub const fn is_end_known(&self) -> bool {
        self.end != Self::UNKNOWN_END
    }

    /// The end offset, if known.
    #[inline]
    pub const fn known_end(&self) -> Option<u32> {
        if self.is_end_known() {
            Some(self.end)
        } else {
            None
        }
    }

    /// Length in bytes; zero while the end is unknown.
    #[inline]
    pub const fn len(&self) -> u32 {
        if self.is_end_known() {
            self.end.saturating_sub(self.start)
        } else {
            0
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `offset` lies inside the span. An open span contains every
    /// offset from its start onward.
    #[inline]
    pub const fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Whether an item starting at `offset` lies past the known end.
    #[inline]
    pub const fn ends_before(&self, offset: u32) -> bool {
        self.is_end_known() && offset >= self.end
    }

    /// Assign the end if it is still unknown. Returns `true` when the end was
    /// written; an already known end is never overwritten.
    #[inline]
    pub fn close_at(&mut self, end: u32) -> bool {
        if self.is_end_known() {
            return false;
        }
        self.end = end.max(self.start);
        true
    }

    /// Move the start backwards (never forwards), e.g. to cover modifiers
    /// that were seen before the declaration itself.
    #[inline]
    pub fn extend_start(&mut self, start: u32) {
        if start < self.start {
            self.start = start;
        }
    }

    /// Smallest span covering both. An unknown end on either side stays
    /// unknown.
    pub fn merge(self, other: Span) -> Span {
        let end = if self.is_end_known() && other.is_end_known() {
            self.end.max(other.end)
        } else {
            Self::UNKNOWN_END
        };
        Span {
            start: self.start.min(other.start),
            end,
        }
    }

    /// Slice the text covered by this span. Out of range or open spans yield
    /// the longest valid prefix.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        let start = (self.start as usize).min(source.len());
        let end = if self.is_end_known() {
            (self.end as usize).min(source.len())
        } else {
            source.len()
        };
        source.get(start..end.max(start)).unwrap_or("")
    }
}

impl Default for Span {
    fn default() -> Self {
        Span::EMPTY
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_end_known() {
            write!(f, "{}..{}", self.start, self.end)
        } else {
            write!(f, "{}..?", self.start)
        }
    }
}

/// Anything that covers a region of source text.
pub trait Spanned {
    fn span(&self) -> Span;

    #[inline]
    fn start(&self) -> u32 {
        self.span().start
    }

    #[inline]
    fn end(&self) -> u32 {
        self.span().end
    }
}

impl Spanned for Span {
    #[inline]
    fn span(&self) -> Span {
        *self
    }
}
