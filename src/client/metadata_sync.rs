//! Station-metadata planning, download, and sanitization.

use crate::client::ClientDownloadHelper;
use crate::error::{Error, ProviderError, Result};
use crate::provider::MetadataRequest;
use crate::retry::retry_with_backoff;
use crate::storage::{MetadataTarget, TemplateArgs};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

impl ClientDownloadHelper {
    /// Compute `want_metadata` for every station and classify each wanted
    /// `(loc, cha)` entry as `have` or `miss` against any existing metadata
    /// file.
    pub fn prepare_metadata_download(&mut self) -> Result<()> {
        for station in &mut self.stations {
            station.recompute_want_metadata();
            if station.want_metadata.is_empty() {
                continue;
            }

            let start = station.want_metadata.values().map(|(s, _)| *s).min().unwrap();
            let end = station.want_metadata.values().map(|(_, e)| *e).max().unwrap();
            let args = TemplateArgs {
                network: station.network.clone(),
                station: station.station.clone(),
                location: None,
                channel: None,
                start,
                end,
            };

            let target = self.storage.resolve_metadata(&self.metadata_hint, &args)?;
            let path = match target {
                MetadataTarget::Path(p) => p,
                MetadataTarget::Directive => {
                    return Err(Error::Storage(crate::error::StorageError::DirectiveNotSupported));
                }
            };
            station.metadata_filename = Some(path.clone());

            if !path.exists() {
                station.miss_metadata = station.want_metadata.clone();
                station.have_metadata.clear();
                continue;
            }

            let rows = self.metadata_store.read_coverage(&path)?;
            let (have, miss): (Vec<_>, Vec<_>) = station
                .want_metadata
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .partition(|((loc, cha), (s, e))| {
                    rows.iter()
                        .any(|row| &row.location == loc && &row.channel == cha && row.covers(*s, *e))
                });

            station.have_metadata = have.into_iter().collect();
            station.miss_metadata = miss.into_iter().collect();
        }
        Ok(())
    }

    /// Build one request per station with non-empty `miss_metadata`,
    /// submit to a pool of size `min(threads, requests.len())`, write and
    /// reclassify coverage from the response.
    pub async fn download_metadata(&mut self, threads: usize) -> Result<()> {
        let mut station_indices = Vec::new();
        let mut requests = Vec::new();
        for (idx, station) in self.stations.iter().enumerate() {
            if station.miss_metadata.is_empty() {
                continue;
            }
            let start = station.miss_metadata.values().map(|(s, _)| *s).min().unwrap();
            let end = station.miss_metadata.values().map(|(_, e)| *e).max().unwrap();
            requests.push(MetadataRequest {
                network: station.network.clone(),
                station: station.station.clone(),
                channels: station.miss_metadata.keys().cloned().collect(),
                start,
                end,
            });
            station_indices.push(idx);
        }

        if requests.is_empty() {
            return Ok(());
        }

        let pool_size = threads.min(requests.len()).max(1);
        let client = Arc::clone(&self.client);
        let retry_config = self.retry_config.clone();

        let results: Vec<(usize, Result<crate::provider::MetadataResponse>)> = stream::iter(
            station_indices.into_iter().zip(requests).map(|(idx, request)| {
                let client = Arc::clone(&client);
                let retry_config = retry_config.clone();
                async move {
                    let result =
                        retry_with_backoff(&retry_config, || client.get_metadata(&request)).await;
                    (idx, result)
                }
            }),
        )
        .buffer_unordered(pool_size)
        .collect()
        .await;

        for (idx, result) in results {
            let station = &mut self.stations[idx];
            match result {
                Ok(response) => {
                    let Some(path) = station.metadata_filename.clone() else {
                        continue;
                    };
                    self.metadata_store.write(&path, &response.data)?;
                    let rows = self.metadata_store.read_coverage(&path)?;
                    let (have, miss): (Vec<_>, Vec<_>) = station
                        .miss_metadata
                        .iter()
                        .map(|(k, v)| (k.clone(), *v))
                        .partition(|((loc, cha), (s, e))| {
                            rows.iter().any(|row| {
                                &row.location == loc && &row.channel == cha && row.covers(*s, *e)
                            })
                        });
                    station.have_metadata.extend(have);
                    station.miss_metadata = miss.into_iter().collect();
                }
                Err(Error::Provider(ProviderError::RpcError { reason, .. }))
                    if ProviderError::is_empty_response(&reason) =>
                {
                    tracing::info!(
                        network = %station.network,
                        station = %station.station,
                        "no metadata available from provider"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        network = %station.network,
                        station = %station.station,
                        error = %e,
                        "metadata RPC failed; channels remain in miss_metadata"
                    );
                }
            }
        }
        Ok(())
    }

    /// Delete downloaded waveforms lacking metadata coverage across every
    /// station. Returns the total number of files deleted.
    pub fn sanitize_downloads(&mut self) -> usize {
        self.stations.iter_mut().map(|s| s.sanitize_downloads()).sum()
    }
}
