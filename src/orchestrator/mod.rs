//! `DownloadHelper` — the cross-provider entry point: builds a provider
//! roster, then runs availability → distance filter → waveform/metadata
//! download → sanitize over each provider in turn, accumulating
//! `already_acquired` so later providers skip what earlier ones already
//! satisfied.

mod dedup;
mod report;

pub use dedup::{apply_distance_filter, order_providers};
pub use report::{ChannelSummary, IntervalSummary, ProviderReport, Report, StationSummary};

use crate::client::ClientDownloadHelper;
use crate::config::{CapabilityOverrides, PoolConfig, Restrictions};
use crate::domain::Domain;
use crate::error::Result;
use crate::geo::Coordinate;
use crate::metadata::MetadataStore;
use crate::provider::ProviderClient;
use crate::storage::{StorageHint, StorageResolver};
use crate::waveform::WaveformReader;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Builds one [`ProviderClient`] from its registry name. Concrete
/// deployments implement this to dial out to the named FDSN data center;
/// tests substitute a fake that never touches the network.
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    /// Construct the client for `name`, or fail with `provider_init_failure`.
    async fn build(&self, name: &str) -> Result<Arc<dyn ProviderClient>>;
}

/// Where resolved waveform files are written: a [`StorageResolver`] paired
/// with the hint it is given.
#[derive(Clone)]
pub struct WaveformStorage {
    pub resolver: Arc<dyn StorageResolver>,
    pub hint: StorageHint<PathBuf>,
}

impl WaveformStorage {
    pub fn new(resolver: Arc<dyn StorageResolver>, hint: StorageHint<PathBuf>) -> Self {
        Self { resolver, hint }
    }
}

/// Where resolved station-metadata files are written.
#[derive(Clone)]
pub struct MetadataStorage {
    pub resolver: Arc<dyn StorageResolver>,
    pub hint: StorageHint<PathBuf>,
}

impl MetadataStorage {
    pub fn new(resolver: Arc<dyn StorageResolver>, hint: StorageHint<PathBuf>) -> Self {
        Self { resolver, hint }
    }
}

/// The cross-provider orchestrator.
///
/// Holds the surviving, ordered provider roster built at construction time
/// plus the collaborators shared across every provider in a run: a
/// waveform parser (for QC) and a metadata coverage store.
pub struct DownloadHelper {
    providers: Vec<Arc<dyn ProviderClient>>,
    waveform_reader: Arc<dyn WaveformReader>,
    metadata_store: Arc<dyn MetadataStore>,
    capability_overrides: CapabilityOverrides,
    pool: PoolConfig,
}

impl DownloadHelper {
    /// Build the provider roster: resolve the configured order
    /// (`provider_names`, or the built-in registry when `None`), build
    /// each client concurrently through `factory`, and drop any provider
    /// that fails to initialize or does not advertise both a `dataselect`
    /// and a `station` service. Surviving providers keep their configured
    /// order.
    pub async fn new(
        provider_names: Option<Vec<String>>,
        factory: Arc<dyn ProviderFactory>,
        waveform_reader: Arc<dyn WaveformReader>,
        metadata_store: Arc<dyn MetadataStore>,
        capability_overrides: CapabilityOverrides,
        pool: PoolConfig,
    ) -> Self {
        let names = order_providers(provider_names);
        let pool_size = pool.threads_per_client.min(names.len().max(1)).max(1);

        let built: Vec<(String, Result<Arc<dyn ProviderClient>>)> = stream::iter(names.iter().cloned().map(|name| {
            let factory = Arc::clone(&factory);
            async move {
                let result = factory.build(&name).await;
                (name, result)
            }
        }))
        .buffer_unordered(pool_size)
        .collect()
        .await;

        let mut by_name: std::collections::HashMap<String, Arc<dyn ProviderClient>> = std::collections::HashMap::new();
        for (name, result) in built {
            match result {
                Ok(client) => {
                    let services = client.services();
                    let has_dataselect = services.iter().any(|s| s == "dataselect");
                    let has_station = services.iter().any(|s| s == "station");
                    if has_dataselect && has_station {
                        by_name.insert(name, client);
                    } else {
                        tracing::warn!(provider = %name, "provider_init_failure: missing dataselect/station capability, dropped from roster");
                    }
                }
                Err(e) => {
                    tracing::warn!(provider = %name, error = %e, "provider_init_failure: dropped from roster");
                }
            }
        }

        let providers = names.into_iter().filter_map(|name| by_name.remove(&name)).collect();

        Self {
            providers,
            waveform_reader,
            metadata_store,
            capability_overrides,
            pool,
        }
    }

    /// Build a roster directly from already-constructed clients, bypassing
    /// [`ProviderFactory`] and capability filtering. Used by tests and by
    /// callers that have already vetted their providers.
    pub fn from_clients(
        providers: Vec<Arc<dyn ProviderClient>>,
        waveform_reader: Arc<dyn WaveformReader>,
        metadata_store: Arc<dyn MetadataStore>,
        capability_overrides: CapabilityOverrides,
        pool: PoolConfig,
    ) -> Self {
        Self {
            providers,
            waveform_reader,
            metadata_store,
            capability_overrides,
            pool,
        }
    }

    /// Provider names in the surviving roster, in their configured order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Run the full cross-provider sequence: for each provider in roster
    /// order, query availability, discard stations already acquired or
    /// distance-filtered out, download waveforms and metadata, sanitize,
    /// then fold newly-acquired stations into the dedup state before
    /// moving to the next provider.
    pub async fn download(
        &self,
        domain: Arc<dyn Domain>,
        restrictions: Restrictions,
        waveform_storage: WaveformStorage,
        metadata_storage: MetadataStorage,
        chunk_size_mb: f64,
        threads_per_client: usize,
    ) -> Result<Report> {
        restrictions.validate()?;

        let mut already_acquired: HashSet<(String, String)> = HashSet::new();
        let mut discarded: HashSet<(String, String)> = HashSet::new();
        let mut accepted_coords: Vec<Coordinate> = Vec::new();
        let mut report = Report::default();

        for client in &self.providers {
            let mut helper = ClientDownloadHelper::new(
                Arc::clone(client),
                Arc::clone(&domain),
                Arc::clone(&waveform_storage.resolver),
                Arc::clone(&self.waveform_reader),
                Arc::clone(&self.metadata_store),
                restrictions.clone(),
                self.capability_overrides.clone(),
                waveform_storage.hint.clone(),
                metadata_storage.hint.clone(),
            );

            if let Err(e) = helper.get_availability().await {
                tracing::warn!(provider = client.name(), error = %e, "provider skipped after availability failure");
                continue;
            }
            if helper.is_empty() {
                continue;
            }

            let mut excluded = already_acquired.clone();
            excluded.extend(discarded.iter().cloned());
            helper.discard_stations(&excluded);
            if helper.is_empty() {
                continue;
            }

            let min_distance = restrictions.min_interstation_distance_m;
            let stations = std::mem::take(&mut helper.stations);
            let (kept, newly_discarded) = apply_distance_filter(stations, &accepted_coords, min_distance);
            discarded.extend(newly_discarded);
            helper.stations = kept;
            if helper.is_empty() {
                continue;
            }

            helper.prepare_waveform_download()?;
            helper.download_waveforms(chunk_size_mb, threads_per_client).await?;
            helper.prepare_metadata_download()?;
            helper.download_metadata(self.pool.metadata_threads).await?;
            helper.sanitize_downloads();

            for station in &helper.stations {
                if station.is_acquired() {
                    already_acquired.insert(station.key());
                    accepted_coords.push(station.coordinate());
                }
            }

            report.push_provider(client.name().to_string(), &helper.stations);
        }

        Ok(report)
    }
}
