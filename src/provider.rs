//! `ProviderClient` — the station-availability / bulk-waveform RPC surface
//! consumed by the orchestrator. The on-wire protocol itself (FDSN
//! station/dataselect HTTP queries) is out of scope; this trait is the
//! seam a concrete HTTP-backed implementation plugs into.

use crate::domain::QueryValue;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One row of a station-availability response: a channel advertised by the
/// provider, with its declared operating interval and (if the provider
/// supports it) a per-channel availability subinterval.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailableChannel {
    /// Network code
    pub network: String,
    /// Station code
    pub station: String,
    /// Location code
    pub location: String,
    /// Channel code
    pub channel: String,
    /// Station latitude, decimal degrees
    pub latitude: f64,
    /// Station longitude, decimal degrees
    pub longitude: f64,
    /// Channel's declared operating start
    pub start_date: DateTime<Utc>,
    /// Channel's declared operating end
    pub end_date: DateTime<Utc>,
    /// Per-channel availability subinterval, if the provider supplied one
    pub availability_extent: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

/// The full station-availability response returned by `get_availability`.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// All advertised channels, in the order the provider returned them
    pub channels: Vec<AvailableChannel>,
}

/// One requested `(net, sta, loc, cha, start, end)` tuple for a bulk
/// waveform RPC.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformRequest {
    /// Network code
    pub network: String,
    /// Station code
    pub station: String,
    /// Location code
    pub location: String,
    /// Channel code
    pub channel: String,
    /// Requested interval start
    pub start: DateTime<Utc>,
    /// Requested interval end
    pub end: DateTime<Utc>,
}

/// One segment returned by a bulk waveform RPC: raw bytes for a single
/// requested tuple, in the order the provider streamed them back.
#[derive(Debug, Clone)]
pub struct WaveformSegment {
    /// Which request this segment answers
    pub request: WaveformRequest,
    /// Raw MiniSEED bytes for this segment (parsed by the external waveform reader)
    pub data: Vec<u8>,
}

/// A requested station's metadata, fetched by `get_metadata`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRequest {
    /// Network code
    pub network: String,
    /// Station code
    pub station: String,
    /// `(location, channel)` pairs to include
    pub channels: Vec<(String, String)>,
    /// Temporal bounds of the request
    pub start: DateTime<Utc>,
    /// Temporal bounds of the request
    pub end: DateTime<Utc>,
}

/// Raw StationXML bytes returned for one [`MetadataRequest`].
#[derive(Debug, Clone)]
pub struct MetadataResponse {
    /// Which request this answers
    pub request: MetadataRequest,
    /// Raw StationXML bytes (parsed by the external metadata store)
    pub data: Vec<u8>,
}

/// The abstract provider RPC surface.
///
/// A concrete implementation wraps one FDSN-style web service endpoint.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Short provider name used for ordering, logging, and the capability override table
    fn name(&self) -> &str;

    /// The provider's advertised base URL
    fn base_url(&self) -> &str;

    /// Capability names this provider's service document advertises
    /// (e.g. `"matchtimeseries"`, `"includeavailability"`, `"dataselect"`, `"station"`)
    fn services(&self) -> &[String];

    /// Station-level listing RPC.
    async fn get_stations(
        &self,
        query_parameters: &HashMap<String, QueryValue>,
        network: Option<&str>,
        station: Option<&str>,
        location: Option<&str>,
        channel: Option<&str>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Inventory>;

    /// Bulk waveform RPC.
    async fn get_waveforms_bulk(
        &self,
        requests: &[WaveformRequest],
    ) -> Result<Vec<WaveformSegment>>;

    /// Bulk station-metadata RPC used by `download_metadata`.
    async fn get_metadata(&self, request: &MetadataRequest) -> Result<MetadataResponse>;
}
