//! Half-open time intervals.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// `[start, end)` interval. Adjacent windows do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeWindow {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// `self.start < other.end && self.end > other.start`.
    ///
    /// Covers partial overlap and containment in either direction.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn duration_minutes(&self) -> i64 {
        self.end.duration_since(&self.start).num_minutes()
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}
