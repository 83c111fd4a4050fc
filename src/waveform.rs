//! `WaveformReader` — the MiniSEED parser seam. This crate does not
//! implement MiniSEED decoding itself; this trait is what QC
//! (`src/client/qc.rs`) consumes to inspect a downloaded file.

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

/// One contiguous run of samples found in a parsed waveform file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceCoverage {
    /// Start of this contiguous run
    pub start: DateTime<Utc>,
    /// End of this contiguous run
    pub end: DateTime<Utc>,
}

impl TraceCoverage {
    /// Duration of this run, in seconds.
    pub fn duration_seconds(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 1000.0
    }
}

/// Parsed summary of a MiniSEED file, as needed by the QC pass.
#[derive(Debug, Clone, Default)]
pub struct ParsedWaveform {
    /// One entry per contiguous trace found in the file
    pub traces: Vec<TraceCoverage>,
}

impl ParsedWaveform {
    /// Total covered duration across all traces, in seconds.
    pub fn covered_duration_seconds(&self) -> f64 {
        self.traces.iter().map(|t| t.duration_seconds()).sum()
    }
}

/// Reads and inspects MiniSEED waveform files. A concrete implementation
/// performs the actual decompression/parsing; this crate's QC logic only
/// needs trace count and coverage.
pub trait WaveformReader: Send + Sync {
    /// Parse the file at `path`, returning its trace coverage.
    ///
    /// Returns `Err` if the file cannot be read or does not parse as
    /// MiniSEED.
    fn parse(&self, path: &Path) -> Result<ParsedWaveform>;
}
