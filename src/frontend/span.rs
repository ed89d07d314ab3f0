//! Source positions (used by the tree walker, the printer and ariadne reports)

use std::fmt;

/// A position inside one source unit: 1-based byte offset, `0` means "no position".
///
/// Nodes parsed from text always carry a valid position; nodes synthesized
/// during instantiation (mangled names, for instance) do not.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos(u32);

impl Pos {
    pub const NONE: Pos = Pos(0);

    #[inline]
    pub fn from_offset(offset: usize) -> Pos {
        Pos(u32::try_from(offset + 1).unwrap_or(u32::MAX))
    }

    #[inline]
    pub fn is_valid(self) -> bool { self.0 != 0 }

    /// Byte offset in the source, if this position was assigned by the parser.
    #[inline]
    pub fn offset(self) -> Option<usize> {
        if self.is_valid() { Some(self.0 as usize - 1) } else { None }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset() {
            Some(o) => write!(f, "@{o}"),
            None => write!(f, "@-"),
        }
    }
}

/// Half-open byte range `[start, end)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const DUMMY: Span = Span { start: 0, end: 0 };
}

impl From<pest::Span<'_>> for Span {
    fn from(s: pest::Span<'_>) -> Self {
        Span { start: s.start(), end: s.end() }
    }
}
