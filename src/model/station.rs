//! `Station` — a `(network, station)` pair with coordinates and channels.

use crate::geo::Coordinate;
use crate::model::Channel;
use crate::status::{Event, next_status};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;

/// Map keyed by `(location, channel)` to a wanted/had/missing temporal range.
pub type MetadataMap = HashMap<(String, String), (DateTime<Utc>, DateTime<Utc>)>;

/// A `(network, station)` entry with its channels and metadata bookkeeping.
///
/// Invariant: `want_metadata = have_metadata ∪ miss_metadata`
/// (disjoint union) at every observable point after `prepare_metadata_download`.
/// `channels` never holds a duplicate `(location, channel)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Network code
    pub network: String,
    /// Station code
    pub station: String,
    /// Station latitude, decimal degrees
    pub latitude: f64,
    /// Station longitude, decimal degrees
    pub longitude: f64,
    /// This station's channels. No duplicate `(location, channel)` pairs.
    pub channels: Vec<Channel>,
    /// Planned or resolved metadata file path, once known
    pub metadata_filename: Option<PathBuf>,
    /// `(loc, cha) → (start, end)` that some downloaded/existing interval needs metadata for
    pub want_metadata: MetadataMap,
    /// The subset of `want_metadata` already covered by existing metadata
    pub have_metadata: MetadataMap,
    /// The subset of `want_metadata` not yet covered
    pub miss_metadata: MetadataMap,
}

impl Station {
    /// Construct a station with no channels and empty metadata bookkeeping.
    pub fn new(
        network: impl Into<String>,
        station: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            network: network.into(),
            station: station.into(),
            latitude,
            longitude,
            channels: Vec::new(),
            metadata_filename: None,
            want_metadata: HashMap::new(),
            have_metadata: HashMap::new(),
            miss_metadata: HashMap::new(),
        }
    }

    /// Coordinate pair, for the inter-station distance filter.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// `(network, station)` identity key, as used by `already_acquired`/`discarded`.
    pub fn key(&self) -> (String, String) {
        (self.network.clone(), self.station.clone())
    }

    /// Add `channel` unless its `(location, channel)` pair is already present.
    /// Returns `true` if added.
    pub fn add_channel(&mut self, channel: Channel) -> bool {
        let duplicate = self
            .channels
            .iter()
            .any(|c| c.location == channel.location && c.channel == channel.channel);
        if duplicate {
            return false;
        }
        self.channels.push(channel);
        true
    }

    /// Recompute `want_metadata` from the channels currently wanting
    /// metadata.
    pub fn recompute_want_metadata(&mut self) {
        self.want_metadata = self
            .channels
            .iter()
            .filter(|c| c.wants_metadata())
            .filter_map(|c| c.temporal_bounds().map(|bounds| ((c.location.clone(), c.channel.clone()), bounds)))
            .collect();
    }

    /// True if every station-metadata entry is covered (observable state
    /// after `prepare_metadata_download`/`download_metadata`).
    pub fn metadata_fully_covered(&self) -> bool {
        self.miss_metadata.is_empty() && self.want_metadata.len() == self.have_metadata.len()
    }

    /// Delete downloaded waveform files for channels still missing metadata,
    /// and mark their intervals `download_rejected`. Pre-existing (`Exists`)
    /// files are left alone.
    ///
    /// Returns the number of files deleted.
    pub fn sanitize_downloads(&mut self) -> usize {
        let mut deleted = 0;
        for (location, channel_code) in self.miss_metadata.keys() {
            let Some(channel) = self
                .channels
                .iter_mut()
                .find(|c| &c.location == location && &c.channel == channel_code)
            else {
                continue;
            };
            for interval in &mut channel.intervals {
                if interval.status == crate::status::Status::Downloaded {
                    if let Some(path) = &interval.filename {
                        if let Err(e) = std::fs::remove_file(path) {
                            tracing::warn!(
                                path = %path.display(),
                                error = %e,
                                "failed to delete orphaned waveform file during sanitize"
                            );
                        } else {
                            tracing::info!(
                                network = %self.network,
                                station = %self.station,
                                location = %location,
                                channel = %channel_code,
                                path = %path.display(),
                                "deleted waveform lacking station metadata coverage"
                            );
                        }
                        deleted += 1;
                    }
                    interval.status = next_status(interval.status, Event::Rejected);
                }
            }
        }
        deleted
    }

    /// True if this station ended with at least one `downloaded`/`exists`
    /// interval and non-empty `have_metadata` — the `already_acquired`
    /// membership test.
    pub fn is_acquired(&self) -> bool {
        let has_data = self
            .channels
            .iter()
            .any(|c| c.intervals.iter().any(|i| i.status.has_file()));
        has_data && !self.have_metadata.is_empty()
    }
}
