//! The interval status token and its transition function.
//!
//! Status transitions are centralized as a pure function rather than
//! mutated ad hoc across components.

use serde::{Deserialize, Serialize};

/// Closed status set for a [`crate::model::TimeInterval`].
///
/// Transitions are monotone within a run except
/// `NeedsDownloading → Downloaded | DownloadFailed | DownloadRejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// No download attempt has been planned yet
    None,
    /// Resolved to a path that does not yet exist on disk; queued for download
    NeedsDownloading,
    /// Successfully downloaded and passed QC this run
    Downloaded,
    /// The storage resolver returned the `IGNORE` sentinel for this interval
    Ignore,
    /// The resolved path already existed on disk before this run
    Exists,
    /// The RPC failed, the file was missing, or QC deleted a zero-byte/unreadable file
    DownloadFailed,
    /// QC deleted the file for policy reasons (gaps, too short) or sanitize removed it for missing metadata
    DownloadRejected,
}

/// An event that can drive a [`Status`] transition via
/// `next_status(current, event) → status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// `resolve_waveform` returned the `IGNORE` sentinel
    ResolvedIgnore,
    /// `resolve_waveform` returned a path that already exists on disk
    ResolvedExists,
    /// `resolve_waveform` returned a path that does not yet exist
    ResolvedNeedsDownload,
    /// The bulk RPC (or QC) determined the file is missing, empty, or unreadable
    DownloadFailed,
    /// QC rejected the file for a policy reason (gaps, too short) or sanitize removed it
    Rejected,
    /// The file was downloaded and passed QC
    DownloadSucceeded,
}

/// Centralized status transition function.
///
/// Returns `current` unchanged for events that don't apply to it, so
/// callers can drive this blindly without matching on `current` themselves.
pub fn next_status(current: Status, event: Event) -> Status {
    match (current, event) {
        (Status::None, Event::ResolvedIgnore) => Status::Ignore,
        (Status::None, Event::ResolvedExists) => Status::Exists,
        (Status::None, Event::ResolvedNeedsDownload) => Status::NeedsDownloading,
        (Status::NeedsDownloading, Event::DownloadFailed) => Status::DownloadFailed,
        (Status::NeedsDownloading, Event::Rejected) => Status::DownloadRejected,
        (Status::NeedsDownloading, Event::DownloadSucceeded) => Status::Downloaded,
        (Status::Downloaded, Event::Rejected) => Status::DownloadRejected,
        (current, _) => current,
    }
}

impl Status {
    /// True for the two statuses that imply a readable file on disk.
    pub fn has_file(self) -> bool {
        matches!(self, Status::Downloaded | Status::Exists)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::None => "none",
            Status::NeedsDownloading => "needs_downloading",
            Status::Downloaded => "downloaded",
            Status::Ignore => "ignore",
            Status::Exists => "exists",
            Status::DownloadFailed => "download_failed",
            Status::DownloadRejected => "download_rejected",
        };
        f.write_str(s)
    }
}
