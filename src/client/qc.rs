//! Quality-control pass over downloaded waveform files.

use crate::client::ClientDownloadHelper;
use crate::error::Result;
use crate::status::{Event, Status, next_status};

impl ClientDownloadHelper {
    /// Classify every interval still `needs_downloading` by inspecting the
    /// file at its planned path, deleting and reclassifying as needed.
    /// Returns `(downloaded_bytes, discarded_bytes)`.
    pub(crate) fn run_qc(&mut self) -> Result<(u64, u64)> {
        let mut downloaded_bytes: u64 = 0;
        let mut discarded_bytes: u64 = 0;

        let reject_with_gaps = self.restrictions.reject_channels_with_gaps;
        let minimum_length = self.restrictions.minimum_length;

        for station in &mut self.stations {
            for channel in &mut station.channels {
                for interval in &mut channel.intervals {
                    if interval.status != Status::NeedsDownloading {
                        continue;
                    }

                    let Some(path) = interval.filename.clone() else {
                        interval.status = next_status(interval.status, Event::DownloadFailed);
                        continue;
                    };

                    let metadata = match std::fs::metadata(&path) {
                        Ok(m) => m,
                        Err(_) => {
                            tracing::warn!(path = %path.display(), "qc: file missing, download_failed");
                            interval.status = next_status(interval.status, Event::DownloadFailed);
                            continue;
                        }
                    };

                    let file_size = metadata.len();
                    if file_size == 0 {
                        tracing::warn!(path = %path.display(), "qc: zero-byte file, download_failed");
                        let _ = std::fs::remove_file(&path);
                        interval.status = next_status(interval.status, Event::DownloadFailed);
                        continue;
                    }

                    let parsed = match self.waveform_reader.parse(&path) {
                        Ok(p) => p,
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "qc: unreadable, download_failed");
                            let _ = std::fs::remove_file(&path);
                            discarded_bytes += file_size;
                            interval.status = next_status(interval.status, Event::DownloadFailed);
                            continue;
                        }
                    };

                    if parsed.traces.is_empty() {
                        tracing::warn!(path = %path.display(), "qc: zero traces, download_failed");
                        let _ = std::fs::remove_file(&path);
                        discarded_bytes += file_size;
                        interval.status = next_status(interval.status, Event::DownloadFailed);
                        continue;
                    }

                    if parsed.traces.len() > 1 && reject_with_gaps {
                        tracing::info!(path = %path.display(), "qc: gaps/overlaps, download_rejected");
                        let _ = std::fs::remove_file(&path);
                        discarded_bytes += file_size;
                        interval.status = next_status(interval.status, Event::Rejected);
                        continue;
                    }

                    let covered = parsed.covered_duration_seconds();
                    let required = minimum_length * interval.duration_seconds();
                    if covered < required {
                        tracing::info!(
                            path = %path.display(),
                            covered,
                            required,
                            "qc: coverage below minimum_length, download_rejected"
                        );
                        let _ = std::fs::remove_file(&path);
                        discarded_bytes += file_size;
                        interval.status = next_status(interval.status, Event::Rejected);
                        continue;
                    }

                    downloaded_bytes += file_size;
                    interval.status = next_status(interval.status, Event::DownloadSucceeded);
                }
            }
        }

        Ok((downloaded_bytes, discarded_bytes))
    }
}
