//! Availability query and identifier/priority filtering.

use crate::client::ClientDownloadHelper;
use crate::config::CapabilityMode;
use crate::error::{Error, ProviderError, Result};
use crate::model::{Channel, Station, TimeInterval};
use crate::priority::{filter_channel_priority, filter_location_priority};
use crate::provider::{AvailableChannel, Inventory};
use crate::status::{Event, next_status};
use crate::storage::{TemplateArgs, WaveformTarget};
use std::collections::{HashMap, HashSet};

impl ClientDownloadHelper {
    /// Decide whether this provider's availability response can be trusted:
    /// a static per-provider override wins over advertised
    /// `matchtimeseries` support, which wins over advertised
    /// `includeavailability` support, with "unreliable" as the fallback.
    ///
    /// Reliability is informational only — logged, never acted on; the
    /// orchestrator always attempts the download regardless.
    pub fn is_availability_reliable(&self) -> bool {
        if let Some(mode) = self.capability_overrides.get(self.client.name()) {
            return mode != CapabilityMode::Unreliable;
        }
        let services = self.client.services();
        if services.iter().any(|s| s == "matchtimeseries") {
            return true;
        }
        if services.iter().any(|s| s == "includeavailability") {
            return true;
        }
        false
    }

    /// Issue the station-level listing RPC and ingest the result into
    /// `self.stations`.
    ///
    /// Fails with `provider_unavailable` (a non-"no data" RPC error); logs
    /// and proceeds with an empty inventory on "no data available".
    pub async fn get_availability(&mut self) -> Result<()> {
        let query_parameters = self.domain.get_query_parameters();
        let reliable = self.is_availability_reliable();
        tracing::debug!(
            provider = self.client.name(),
            reliable,
            "querying station availability"
        );

        let inventory = match self
            .client
            .get_stations(
                &query_parameters,
                self.restrictions.network.as_deref(),
                self.restrictions.station.as_deref(),
                self.restrictions.location.as_deref(),
                self.restrictions.channel.as_deref(),
                self.restrictions.starttime,
                self.restrictions.endtime,
            )
            .await
        {
            Ok(inventory) => inventory,
            Err(Error::Provider(ProviderError::RpcError { reason, .. }))
                if ProviderError::is_empty_response(&reason) =>
            {
                tracing::info!(provider = self.client.name(), "no data available from provider");
                Inventory::default()
            }
            Err(e) => {
                tracing::error!(
                    provider = self.client.name(),
                    error = %e,
                    "provider_unavailable: station availability RPC failed"
                );
                return Err(e);
            }
        };

        self.ingest_inventory(inventory);
        Ok(())
    }

    /// Apply spatial, temporal, availability-subinterval, and priority
    /// filtering and populate `self.stations`.
    fn ingest_inventory(&mut self, inventory: Inventory) {
        let query_start = self.restrictions.starttime;
        let query_end = self.restrictions.endtime;

        let surviving: Vec<AvailableChannel> = inventory
            .channels
            .into_iter()
            .filter(|c| {
                // Step 1: spatial containment (only when the domain implements the test).
                self.domain
                    .is_in_domain(c.latitude, c.longitude)
                    .unwrap_or(true)
            })
            .filter(|c| {
                // Step 2: temporal containment against the channel's declared operating window.
                Channel::temporally_covers(c.start_date, c.end_date, query_start, query_end)
            })
            .filter(|c| {
                // Step 3: per-channel availability subinterval; a channel with no
                // subinterval reported is dropped rather than kept.
                match c.availability_extent {
                    Some((start, end)) => Channel::temporally_covers(start, end, query_start, query_end),
                    None => false,
                }
            })
            .collect();

        // Group by (network, station), preserving first-seen order for determinism:
        // chunk packing order follows availability insertion order.
        let mut order: Vec<(String, String)> = Vec::new();
        let mut grouped: HashMap<(String, String), Vec<AvailableChannel>> = HashMap::new();
        for c in surviving {
            let key = (c.network.clone(), c.station.clone());
            if !grouped.contains_key(&key) {
                order.push(key.clone());
            }
            grouped.entry(key).or_default().push(c);
        }

        for key in order {
            let mut rows = grouped.remove(&key).unwrap_or_default();

            // Step 4a: channel priority, grouped by location, first-match-wins glob.
            if !self.restrictions.has_literal_channel_filter() {
                rows = filter_channel_priority(rows, &self.restrictions.channel_priorities, |c| {
                    (c.location.clone(), c.channel.clone())
                });
            }
            // Step 4b: location priority across the surviving channels.
            if !self.restrictions.has_literal_location_filter() {
                rows = filter_location_priority(rows, &self.restrictions.location_priorities, |c| {
                    c.location.clone()
                });
            }

            if rows.is_empty() {
                continue;
            }

            let (network, station_code) = key;
            let (lat, lon) = (rows[0].latitude, rows[0].longitude);
            let mut station = Station::new(network, station_code, lat, lon);

            let mut by_loc_cha: Vec<((String, String), AvailableChannel)> = Vec::new();
            for row in rows {
                let k = (row.location.clone(), row.channel.clone());
                if !by_loc_cha.iter().any(|(existing, _)| existing == &k) {
                    by_loc_cha.push((k, row));
                }
            }

            for ((location, channel_code), _row) in by_loc_cha {
                let mut channel = Channel::new(location, channel_code);
                for (start, end) in self.restrictions.chunks() {
                    channel.intervals.push(TimeInterval::new(start, end));
                }
                station.add_channel(channel);
            }

            self.stations.push(station);
        }
    }

    /// Remove stations already acquired by an earlier provider or
    /// discarded by the distance filter, used by the cross-provider
    /// orchestrator for deduplication.
    pub fn discard_stations(&mut self, ids: &HashSet<(String, String)>) {
        self.stations.retain(|s| !ids.contains(&s.key()));
    }

    /// For every interval, resolve its storage path and set its initial
    /// status.
    pub fn prepare_waveform_download(&mut self) -> Result<()> {
        for station in &mut self.stations {
            for channel in &mut station.channels {
                for interval in &mut channel.intervals {
                    let args = TemplateArgs {
                        network: station.network.clone(),
                        station: station.station.clone(),
                        location: Some(channel.location.clone()),
                        channel: Some(channel.channel.clone()),
                        start: interval.start,
                        end: interval.end,
                    };
                    let target = self.storage.resolve_waveform(&self.waveform_hint, &args)?;
                    match target {
                        WaveformTarget::Ignore => {
                            interval.status = next_status(interval.status, Event::ResolvedIgnore);
                        }
                        WaveformTarget::Path(path) => {
                            let exists = path.exists();
                            interval.filename = Some(path);
                            interval.status = next_status(
                                interval.status,
                                if exists {
                                    Event::ResolvedExists
                                } else {
                                    Event::ResolvedNeedsDownload
                                },
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// True if no stations survived availability/priority filtering.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Number of stations currently held by this helper.
    pub fn len(&self) -> usize {
        self.stations.len()
    }
}
