//! In-memory fakes for the external collaborator traits
//! (`ProviderClient`, `Domain`, `StorageResolver`, `WaveformReader`,
//! `MetadataStore`), so the orchestrator can be exercised without real
//! network or filesystem I/O.

use crate::domain::{Domain, QueryValue};
use crate::error::{Error, Result};
use crate::metadata::{CoverageRow, MetadataStore};
use crate::provider::{Inventory, MetadataRequest, MetadataResponse, ProviderClient, WaveformRequest, WaveformSegment};
use crate::storage::FilesystemResolver;
use crate::waveform::{ParsedWaveform, TraceCoverage, WaveformReader};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A [`StorageResolver`](crate::storage::StorageResolver) backed directly
/// by the filesystem; reused as-is since it is already a pure function of
/// its arguments.
pub type FakeStorageResolver = FilesystemResolver;

/// A [`Domain`] with configurable query parameters and point-in-domain result.
#[derive(Debug, Clone, Default)]
pub struct FakeDomain {
    query_parameters: HashMap<String, QueryValue>,
    in_domain: Option<bool>,
}

impl FakeDomain {
    /// Set the point-in-domain result every coordinate will receive.
    pub fn with_in_domain(mut self, value: Option<bool>) -> Self {
        self.in_domain = value;
        self
    }

    /// Set the provider-specific query parameters returned by this domain.
    pub fn with_query_parameters(mut self, params: HashMap<String, QueryValue>) -> Self {
        self.query_parameters = params;
        self
    }
}

impl Domain for FakeDomain {
    fn get_query_parameters(&self) -> HashMap<String, QueryValue> {
        self.query_parameters.clone()
    }

    fn is_in_domain(&self, _latitude: f64, _longitude: f64) -> Option<bool> {
        self.in_domain
    }
}

type StationsFn = dyn Fn() -> Result<Inventory> + Send + Sync;
type WaveformsFn = dyn Fn(&[WaveformRequest]) -> Result<Vec<WaveformSegment>> + Send + Sync;
type MetadataFn = dyn Fn(&MetadataRequest) -> Result<MetadataResponse> + Send + Sync;

/// A scriptable [`ProviderClient`]: canned responses are supplied as
/// closures at construction time, then invoked (possibly many times, for
/// the waveform/metadata pools) on every call.
pub struct FakeProvider {
    name: String,
    base_url: String,
    services: Vec<String>,
    stations: Arc<StationsFn>,
    waveforms: Arc<WaveformsFn>,
    metadata: Arc<MetadataFn>,
}

impl FakeProvider {
    /// A provider named `name` that, by default, reports an empty
    /// inventory and empty waveform/metadata responses, advertising both
    /// `dataselect` and `station` services.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: format!("https://{name}.example.org"),
            services: vec!["dataselect".to_string(), "station".to_string()],
            stations: Arc::new(|| Ok(Inventory::default())),
            waveforms: Arc::new(|_| Ok(Vec::new())),
            metadata: Arc::new(|req| {
                Ok(MetadataResponse {
                    request: req.clone(),
                    data: Vec::new(),
                })
            }),
        }
    }

    /// Override the advertised capability/service names.
    pub fn with_services(mut self, services: Vec<String>) -> Self {
        self.services = services;
        self
    }

    /// Override the `get_stations` response.
    pub fn with_stations(mut self, f: impl Fn() -> Result<Inventory> + Send + Sync + 'static) -> Self {
        self.stations = Arc::new(f);
        self
    }

    /// Override the `get_waveforms_bulk` response.
    pub fn with_waveforms(
        mut self,
        f: impl Fn(&[WaveformRequest]) -> Result<Vec<WaveformSegment>> + Send + Sync + 'static,
    ) -> Self {
        self.waveforms = Arc::new(f);
        self
    }

    /// Override the `get_metadata` response.
    pub fn with_metadata(
        mut self,
        f: impl Fn(&MetadataRequest) -> Result<MetadataResponse> + Send + Sync + 'static,
    ) -> Self {
        self.metadata = Arc::new(f);
        self
    }
}

#[async_trait]
impl ProviderClient for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn services(&self) -> &[String] {
        &self.services
    }

    async fn get_stations(
        &self,
        _query_parameters: &HashMap<String, QueryValue>,
        _network: Option<&str>,
        _station: Option<&str>,
        _location: Option<&str>,
        _channel: Option<&str>,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Inventory> {
        (self.stations)()
    }

    async fn get_waveforms_bulk(&self, requests: &[WaveformRequest]) -> Result<Vec<WaveformSegment>> {
        (self.waveforms)(requests)
    }

    async fn get_metadata(&self, request: &MetadataRequest) -> Result<MetadataResponse> {
        (self.metadata)(request)
    }
}

/// A [`WaveformReader`] returning pre-registered trace coverage per path.
/// Paths with no registered coverage fail to parse, simulating an
/// unreadable file.
#[derive(Default)]
pub struct FakeWaveformReader {
    traces: Mutex<HashMap<PathBuf, Vec<TraceCoverage>>>,
}

impl FakeWaveformReader {
    /// Register the trace coverage that `parse` should return for `path`.
    pub fn insert(&mut self, path: PathBuf, traces: Vec<TraceCoverage>) {
        self.traces.get_mut().unwrap().insert(path, traces);
    }
}

impl WaveformReader for FakeWaveformReader {
    fn parse(&self, path: &Path) -> Result<ParsedWaveform> {
        let traces = self.traces.lock().unwrap();
        match traces.get(path) {
            Some(traces) => Ok(ParsedWaveform { traces: traces.clone() }),
            None => Err(Error::Other(format!("no fake trace data registered for {}", path.display()))),
        }
    }
}

/// A [`MetadataStore`] holding pre-registered coverage rows per path, and
/// writing to the real filesystem (so `path.exists()` checks in
/// `prepare_metadata_download` behave naturally).
#[derive(Default)]
pub struct FakeMetadataStore {
    coverage: Mutex<HashMap<PathBuf, Vec<CoverageRow>>>,
}

impl FakeMetadataStore {
    /// Register the coverage rows `read_coverage` should return for `path`.
    pub fn set_coverage(&self, path: PathBuf, rows: Vec<CoverageRow>) {
        self.coverage.lock().unwrap().insert(path, rows);
    }
}

impl MetadataStore for FakeMetadataStore {
    fn read_coverage(&self, path: &Path) -> Result<Vec<CoverageRow>> {
        Ok(self.coverage.lock().unwrap().get(path).cloned().unwrap_or_default())
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        std::fs::write(path, data).map_err(Error::Io)
    }
}
