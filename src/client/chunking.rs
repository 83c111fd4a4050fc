//! Chunked parallel waveform download.
//!
//! Uses a bounded worker pool (`futures::stream::StreamExt::buffer_unordered`
//! over a closure per work unit) to cap concurrency per provider rather than
//! fanning out one task per chunk unbounded.

use crate::client::ClientDownloadHelper;
use crate::config::band_code_sample_rate;
use crate::error::{Error, ProviderError, Result, StorageError};
use crate::provider::WaveformRequest;
use crate::retry::retry_with_backoff;
use crate::status::Status;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// One `needs_downloading` interval flattened out for chunk packing.
struct WorkItem {
    station_idx: usize,
    channel_idx: usize,
    interval_idx: usize,
    request: WaveformRequest,
    estimated_bytes: f64,
}

/// Estimate on-disk size for one interval: `sample_rate × duration_s × 4 / 3`,
/// an unknown band code defaulting to 1 Hz.
fn estimate_bytes(band_code: char, duration_seconds: f64) -> f64 {
    band_code_sample_rate(band_code) * duration_seconds * 4.0 / 3.0
}

/// Greedily pack item indices into chunks whose estimated total size meets
/// or exceeds `target_bytes`: intervals accumulate into the current chunk
/// until the running estimate meets or exceeds the target, then a new
/// chunk starts.
fn pack_chunks(sizes: &[f64], target_bytes: f64) -> Vec<Vec<usize>> {
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    let mut running = 0.0;

    for (idx, size) in sizes.iter().enumerate() {
        current.push(idx);
        running += size;
        if running >= target_bytes {
            chunks.push(std::mem::take(&mut current));
            running = 0.0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

impl ClientDownloadHelper {
    /// Batch all `needs_downloading` intervals into chunks targeting
    /// `chunk_size_mb`, submit them to a worker pool of size
    /// `min(threads, chunks.len())`, write the returned segments to their
    /// planned filenames, then run QC over every interval that was queued.
    ///
    /// Returns `(downloaded_bytes, discarded_bytes)`.
    pub async fn download_waveforms(&mut self, chunk_size_mb: f64, threads: usize) -> Result<(u64, u64)> {
        let mut items = Vec::new();
        for (station_idx, station) in self.stations.iter().enumerate() {
            for (channel_idx, channel) in station.channels.iter().enumerate() {
                let band_code = channel.band_code();
                for (interval_idx, interval) in channel.intervals.iter().enumerate() {
                    if interval.status != Status::NeedsDownloading {
                        continue;
                    }
                    items.push(WorkItem {
                        station_idx,
                        channel_idx,
                        interval_idx,
                        request: WaveformRequest {
                            network: station.network.clone(),
                            station: station.station.clone(),
                            location: channel.location.clone(),
                            channel: channel.channel.clone(),
                            start: interval.start,
                            end: interval.end,
                        },
                        estimated_bytes: estimate_bytes(band_code, interval.duration_seconds()),
                    });
                }
            }
        }

        if items.is_empty() {
            return self.run_qc();
        }

        let sizes: Vec<f64> = items.iter().map(|i| i.estimated_bytes).collect();
        let target_bytes = chunk_size_mb * 1_000_000.0;
        let chunk_indices = pack_chunks(&sizes, target_bytes);
        let pool_size = threads.min(chunk_indices.len()).max(1);

        tracing::info!(
            provider = self.client.name(),
            intervals = items.len(),
            chunks = chunk_indices.len(),
            pool_size,
            "starting chunked waveform download"
        );

        let client = Arc::clone(&self.client);
        let retry_config = self.retry_config.clone();

        let results: Vec<(Vec<usize>, Result<Vec<crate::provider::WaveformSegment>>)> =
            stream::iter(chunk_indices.into_iter().map(|indices| {
                let client = Arc::clone(&client);
                let requests: Vec<WaveformRequest> = indices.iter().map(|&i| items[i].request.clone()).collect();
                let retry_config = retry_config.clone();
                async move {
                    let result =
                        retry_with_backoff(&retry_config, || client.get_waveforms_bulk(&requests)).await;
                    (indices, result)
                }
            }))
            .buffer_unordered(pool_size)
            .collect()
            .await;

        for (indices, result) in results {
            match result {
                Ok(segments) => {
                    for segment in segments {
                        self.write_segment(&segment)?;
                    }
                }
                Err(Error::Provider(ProviderError::RpcError { reason, .. }))
                    if ProviderError::is_empty_response(&reason) =>
                {
                    tracing::info!(provider = self.client.name(), "no data available for chunk");
                }
                Err(e) => {
                    tracing::error!(
                        provider = self.client.name(),
                        error = %e,
                        intervals = indices.len(),
                        "waveform chunk RPC failed; intervals remain unresolved for QC"
                    );
                }
            }
        }

        self.run_qc()
    }

    fn write_segment(&mut self, segment: &crate::provider::WaveformSegment) -> Result<()> {
        let req = &segment.request;
        for station in &mut self.stations {
            if station.network != req.network || station.station != req.station {
                continue;
            }
            for channel in &mut station.channels {
                if channel.location != req.location || channel.channel != req.channel {
                    continue;
                }
                for interval in &mut channel.intervals {
                    if interval.start == req.start && interval.end == req.end {
                        if let Some(path) = &interval.filename {
                            std::fs::write(path, &segment.data).map_err(|e| {
                                Error::Storage(StorageError::WriteFailed {
                                    path: path.clone(),
                                    reason: e.to_string(),
                                })
                            })?;
                        }
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }
}
