//! Source spans (byte offsets into the checked source).

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` in a source file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start position (byte offset)
    pub start: u32,
    /// End position (byte offset, exclusive)
    pub end: u32,
}

impl Span {
    /// A span that points nowhere. Used for synthesized nodes.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Create a span from a start offset and a length.
    #[inline]
    pub const fn at(start: u32, length: u32) -> Self {
        Span {
            start,
            end: start.saturating_add(length),
        }
    }

    #[inline]
    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// Returns `true` for spans with no source location.
    #[inline]
    pub fn is_dummy(self) -> bool {
        self == Self::DUMMY
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        if self.is_dummy() {
            return other;
        }
        if other.is_dummy() {
            return self;
        }
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}
