//! Frame addressing.

use std::fmt;

use serde::Serialize;

/// 0-based position of a frame within a video's decoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    pub const FIRST: FrameIndex = FrameIndex(0);

    /// Clamps a signed request into `[0, total - 1]`.
    ///
    /// A `total` of zero clamps everything to frame 0; callers only hold
    /// positive totals once a video is loaded.
    #[must_use]
    pub fn clamped(raw: i64, total: u64) -> FrameIndex {
        let last = total.saturating_sub(1);
        if raw <= 0 {
            FrameIndex(0)
        } else {
            FrameIndex((raw as u64).min(last))
        }
    }

    /// Last valid index for a video of `total` frames.
    #[must_use]
    pub fn last(total: u64) -> FrameIndex {
        FrameIndex(total.saturating_sub(1))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }

    /// Moves by `delta` frames, clamped to the video bounds.
    #[must_use]
    pub fn offset(self, delta: i64, total: u64) -> FrameIndex {
        let raw = i64::try_from(self.0).unwrap_or(i64::MAX).saturating_add(delta);
        FrameIndex::clamped(raw, total)
    }
}

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FrameIndex {
    fn from(value: u64) -> Self {
        FrameIndex(value)
    }
}
