//! Source spans.

use serde::{Deserialize, Serialize};

/// A byte range in the document source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Span for generated nodes that have no source text.
    pub const STUB: Self = Self { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        if self.is_empty() && self.start == 0 {
            return other;
        }
        if other.is_empty() && other.start == 0 {
            return self;
        }
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Smallest span covering every span in `spans`, or [`Span::STUB`].
    pub fn cover(spans: impl IntoIterator<Item = Span>) -> Span {
        spans.into_iter().fold(Span::STUB, Span::merge)
    }
}
