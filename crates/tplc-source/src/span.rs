use serde::Deserialize;
use serde::Serialize;

/// A byte range into a template source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub length: u32,
}

impl Span {
    #[must_use]
    pub fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    /// Build a span from `start..end` offsets. An `end` before `start`
    /// yields an empty span at `start`.
    #[must_use]
    pub fn from_bounds(start: u32, end: u32) -> Self {
        Self::new(start, end.saturating_sub(start))
    }

    #[must_use]
    pub fn saturating_from_bounds_usize(start: usize, end: usize) -> Self {
        let start = u32::try_from(start).unwrap_or(u32::MAX);
        let end = u32::try_from(end).unwrap_or(u32::MAX);
        Self::from_bounds(start, end)
    }

    #[must_use]
    pub fn end(self) -> u32 {
        self.start.saturating_add(self.length)
    }

    #[must_use]
    pub fn start_usize(self) -> usize {
        self.start as usize
    }

    #[must_use]
    pub fn end_usize(self) -> usize {
        self.end() as usize
    }

    /// Move the span right by `offset` bytes, keeping its length.
    #[must_use]
    pub fn shifted(self, offset: u32) -> Self {
        Self::new(self.start.saturating_add(offset), self.length)
    }
}
