//! `TimeInterval` — leaf value carrying `[start, end)`, planned filename,
//! and a status token.

use crate::status::Status;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// One requested `[start, end)` sub-window of a channel, with its planned
/// storage path and current status.
///
/// Invariant: `start < end`; once `status` is `Downloaded` or `Exists`,
/// the file at `filename` is readable and parseable.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeInterval {
    /// Inclusive start of the interval
    pub start: DateTime<Utc>,
    /// Exclusive end of the interval
    pub end: DateTime<Utc>,
    /// Planned or resolved storage path, once known
    pub filename: Option<PathBuf>,
    /// Current status token
    pub status: Status,
}

impl TimeInterval {
    /// Construct a new interval with status `None` and no planned filename.
    ///
    /// Panics if `start >= end`; callers only build intervals from chunk
    /// boundaries that `Restrictions::chunks` already validated.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start < end, "TimeInterval requires start < end");
        Self {
            start,
            end,
            filename: None,
            status: Status::None,
        }
    }

    /// Duration of this interval, in seconds.
    pub fn duration_seconds(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 1000.0
    }
}
