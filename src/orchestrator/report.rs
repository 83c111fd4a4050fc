//! The run summary returned by [`crate::orchestrator::DownloadHelper::download`]:
//! an ordered list of `{provider, stations: [...]}` entries, one per
//! provider that was queried.

use crate::model::Station;
use crate::status::Status;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// One resolved interval, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalSummary {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub filename: Option<PathBuf>,
    pub status: Status,
}

/// One `(location, channel)` pair and its resolved intervals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub location: String,
    pub channel: String,
    pub intervals: Vec<IntervalSummary>,
}

/// One `(network, station)` pair as it ended this run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    pub network: String,
    pub station: String,
    pub channels: Vec<ChannelSummary>,
}

impl From<&Station> for StationSummary {
    fn from(station: &Station) -> Self {
        StationSummary {
            network: station.network.clone(),
            station: station.station.clone(),
            channels: station
                .channels
                .iter()
                .map(|channel| ChannelSummary {
                    location: channel.location.clone(),
                    channel: channel.channel.clone(),
                    intervals: channel
                        .intervals
                        .iter()
                        .map(|interval| IntervalSummary {
                            start: interval.start,
                            end: interval.end,
                            filename: interval.filename.clone(),
                            status: interval.status,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Everything one provider contributed this run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderReport {
    pub provider: String,
    pub stations: Vec<StationSummary>,
}

/// The full cross-provider result of [`crate::orchestrator::DownloadHelper::download`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub providers: Vec<ProviderReport>,
}

impl Report {
    /// Append one provider's station summaries, in the order they were processed.
    pub fn push_provider(&mut self, provider: impl Into<String>, stations: &[Station]) {
        self.providers.push(ProviderReport {
            provider: provider.into(),
            stations: stations.iter().map(StationSummary::from).collect(),
        });
    }

    /// Total count of intervals across every provider/station/channel whose
    /// final status is `downloaded` or `exists`.
    pub fn acquired_interval_count(&self) -> usize {
        self.providers
            .iter()
            .flat_map(|p| &p.stations)
            .flat_map(|s| &s.channels)
            .flat_map(|c| &c.intervals)
            .filter(|i| i.status.has_file())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Channel, TimeInterval};
    use chrono::TimeZone;

    fn ts(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2012, 1, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn push_provider_mirrors_the_station_graph() {
        let mut station = Station::new("NET", "STA", 1.0, 2.0);
        let mut channel = Channel::new("00", "BHZ");
        let mut interval = TimeInterval::new(ts(0), ts(6));
        interval.status = Status::Downloaded;
        interval.filename = Some(PathBuf::from("/tmp/NET.STA.00.BHZ.mseed"));
        channel.intervals.push(interval);
        station.add_channel(channel);

        let mut report = Report::default();
        report.push_provider("IRIS", std::slice::from_ref(&station));

        assert_eq!(report.providers.len(), 1);
        assert_eq!(report.providers[0].provider, "IRIS");
        assert_eq!(report.providers[0].stations[0].network, "NET");
        assert_eq!(report.providers[0].stations[0].channels[0].channel, "BHZ");
        assert_eq!(report.acquired_interval_count(), 1);
    }

    #[test]
    fn acquired_interval_count_excludes_failed_and_rejected() {
        let mut station = Station::new("NET", "STA", 0.0, 0.0);
        let mut channel = Channel::new("", "HHZ");
        let mut failed = TimeInterval::new(ts(0), ts(1));
        failed.status = Status::DownloadFailed;
        let mut rejected = TimeInterval::new(ts(1), ts(2));
        rejected.status = Status::DownloadRejected;
        channel.intervals.push(failed);
        channel.intervals.push(rejected);
        station.add_channel(channel);

        let mut report = Report::default();
        report.push_provider("ORFEUS", std::slice::from_ref(&station));
        assert_eq!(report.acquired_interval_count(), 0);
    }
}
