//! `Channel` — a `(location, channel)` pair and its ordered intervals.

use crate::model::TimeInterval;
use chrono::{DateTime, Utc};

/// A `(location, channel)` pair within a station, with the ordered list of
/// requested time intervals for that pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Location code
    pub location: String,
    /// Channel code
    pub channel: String,
    /// Requested intervals, in the order they were planned (insertion order)
    pub intervals: Vec<TimeInterval>,
}

impl Channel {
    /// Construct an empty channel.
    pub fn new(location: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            channel: channel.into(),
            intervals: Vec::new(),
        }
    }

    /// Band code: the first character of the channel code, used for chunk
    /// size estimation.
    pub fn band_code(&self) -> char {
        self.channel.chars().next().unwrap_or('\0')
    }

    /// `(min start, max end)` across all intervals, or `None` if there are none.
    pub fn temporal_bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.intervals.iter().map(|i| i.start).min()?;
        let end = self.intervals.iter().map(|i| i.end).max()?;
        Some((start, end))
    }

    /// True if at least one interval ended in `Downloaded` or `Exists`.
    pub fn wants_metadata(&self) -> bool {
        self.intervals.iter().any(|i| i.status.has_file())
    }

    /// True if `start`/`end` (a channel's declared operating interval, or
    /// a per-channel availability subinterval) fully covers
    /// `[query_start, query_end]` — anything narrower is dropped.
    pub fn temporally_covers(
        declared_start: DateTime<Utc>,
        declared_end: DateTime<Utc>,
        query_start: DateTime<Utc>,
        query_end: DateTime<Utc>,
    ) -> bool {
        !(declared_start > query_start || declared_end < query_end)
    }
}
