//! `MetadataStore` — the StationXML parser seam. The codec itself is out
//! of scope; the core only reads `{network, station, location, channel,
//! starttime, endtime}` coverage rows.

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

/// One `(location, channel)` coverage row read from a StationXML file.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRow {
    /// Location code
    pub location: String,
    /// Channel code
    pub channel: String,
    /// Stored coverage start
    pub start: DateTime<Utc>,
    /// Stored coverage end
    pub end: DateTime<Utc>,
}

impl CoverageRow {
    /// True if this row's stored range fully contains `[want_start, want_end]`.
    pub fn covers(&self, want_start: DateTime<Utc>, want_end: DateTime<Utc>) -> bool {
        self.start <= want_start && self.end >= want_end
    }
}

/// Reads and writes StationXML metadata files. A concrete implementation
/// performs the actual XML parsing; this crate only needs coverage rows.
pub trait MetadataStore: Send + Sync {
    /// Read the coverage rows present in the metadata file at `path`.
    ///
    /// Returns `Err` if the file does not exist or does not parse.
    fn read_coverage(&self, path: &Path) -> Result<Vec<CoverageRow>>;

    /// Write `data` (raw StationXML bytes returned by a provider) to `path`.
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;
}
