//! `ClientDownloadHelper` — per-provider orchestration: availability query
//! → identifier & priority filtering → filename planning → parallel
//! chunked waveform download → QC → parallel metadata download →
//! sanitization.

mod availability;
mod chunking;
mod metadata_sync;
mod qc;

use crate::config::{CapabilityOverrides, Restrictions, RetryConfig};
use crate::domain::Domain;
use crate::metadata::MetadataStore;
use crate::model::Station;
use crate::provider::ProviderClient;
use crate::storage::{StorageHint, StorageResolver};
use crate::waveform::WaveformReader;
use std::path::PathBuf;
use std::sync::Arc;

/// Drives one provider from availability to fully-reconciled storage.
///
/// Owns its `Station`/`Channel`/`TimeInterval` graph for the run; the
/// graph is discarded when this helper is dropped.
pub struct ClientDownloadHelper {
    pub(crate) client: Arc<dyn ProviderClient>,
    pub(crate) domain: Arc<dyn Domain>,
    pub(crate) storage: Arc<dyn StorageResolver>,
    pub(crate) waveform_reader: Arc<dyn WaveformReader>,
    pub(crate) metadata_store: Arc<dyn MetadataStore>,
    pub(crate) restrictions: Restrictions,
    pub(crate) capability_overrides: CapabilityOverrides,
    pub(crate) waveform_hint: StorageHint<PathBuf>,
    pub(crate) metadata_hint: StorageHint<PathBuf>,
    pub(crate) retry_config: RetryConfig,
    /// Stations surviving availability/priority filtering, in insertion order.
    pub stations: Vec<Station>,
}

impl ClientDownloadHelper {
    /// Construct a helper for one provider. Use [`ClientDownloadHelper::with_retry_config`]
    /// to override the default retry policy.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client: Arc<dyn ProviderClient>,
        domain: Arc<dyn Domain>,
        storage: Arc<dyn StorageResolver>,
        waveform_reader: Arc<dyn WaveformReader>,
        metadata_store: Arc<dyn MetadataStore>,
        restrictions: Restrictions,
        capability_overrides: CapabilityOverrides,
        waveform_hint: StorageHint<PathBuf>,
        metadata_hint: StorageHint<PathBuf>,
    ) -> Self {
        Self {
            client,
            domain,
            storage,
            waveform_reader,
            metadata_store,
            restrictions,
            capability_overrides,
            waveform_hint,
            metadata_hint,
            retry_config: RetryConfig::default(),
            stations: Vec::new(),
        }
    }

    /// Override the retry/backoff policy used for this provider's RPC calls.
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// The provider name this helper drives.
    pub fn provider_name(&self) -> &str {
        self.client.name()
    }
}

impl std::fmt::Display for ClientDownloadHelper {
    /// A wants/has/misses summary per station, for `tracing` fields and
    /// test assertions — not the user-facing report format
    /// (`crate::orchestrator::Report` is that).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ClientDownloadHelper({}) - {} station(s)", self.client.name(), self.stations.len())?;
        for station in &self.stations {
            writeln!(
                f,
                "  {}.{}: {} channel(s), want={}, have={}, miss={}",
                station.network,
                station.station,
                station.channels.len(),
                station.want_metadata.len(),
                station.have_metadata.len(),
                station.miss_metadata.len(),
            )?;
        }
        Ok(())
    }
}
