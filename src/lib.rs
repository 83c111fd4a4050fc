//! # seismdl
//!
//! A highly configurable orchestrator for downloading seismic waveform data
//! and station metadata across multiple FDSN-style data centers.
//!
//! ## Design Philosophy
//!
//! seismdl is designed to be:
//! - **Highly configurable** - spatial/temporal/identifier filters, QC
//!   thresholds, storage layout, and retry policy are all caller-supplied
//! - **Sensible defaults** - a 90% coverage threshold, exponential backoff
//!   with jitter, and a bounded worker pool per provider out of the box
//! - **Library-first** - no CLI, no service process; callers embed
//!   [`orchestrator::DownloadHelper`] and drive it themselves
//! - **Provider-agnostic** - the wire protocol, MiniSEED decoding, and
//!   StationXML parsing are seams ([`provider::ProviderClient`],
//!   [`waveform::WaveformReader`], [`metadata::MetadataStore`]) this crate
//!   consumes rather than implements
//!
//! ## Quick Start
//!
//! ```no_run
//! use seismdl::config::{PoolConfig, Restrictions, CapabilityOverrides};
//! use seismdl::domain::GlobalDomain;
//! use seismdl::orchestrator::{DownloadHelper, WaveformStorage, MetadataStorage};
//! use seismdl::storage::{FilesystemResolver, StorageHint};
//! use std::sync::Arc;
//!
//! # async fn run(
//! #     factory: Arc<dyn seismdl::orchestrator::ProviderFactory>,
//! #     waveform_reader: Arc<dyn seismdl::waveform::WaveformReader>,
//! #     metadata_store: Arc<dyn seismdl::metadata::MetadataStore>,
//! # ) -> seismdl::error::Result<()> {
//! let helper = DownloadHelper::new(
//!     None, // built-in registry: IRIS, ORFEUS, then alphabetical
//!     factory,
//!     waveform_reader,
//!     metadata_store,
//!     CapabilityOverrides::default(),
//!     PoolConfig::default(),
//! )
//! .await;
//!
//! let restrictions = Restrictions::try_new(
//!     chrono::Utc::now() - chrono::Duration::days(1),
//!     chrono::Utc::now(),
//! )?;
//!
//! let waveform_hint = StorageHint::Template("./data/{network}.{station}.{location}.{channel}.mseed".to_string());
//! let metadata_hint = StorageHint::Template("./data/{network}.{station}.xml".to_string());
//!
//! let report = helper
//!     .download(
//!         Arc::new(GlobalDomain),
//!         restrictions,
//!         WaveformStorage::new(Arc::new(FilesystemResolver), waveform_hint),
//!         MetadataStorage::new(Arc::new(FilesystemResolver), metadata_hint),
//!         50.0,
//!         4,
//!     )
//!     .await?;
//!
//! println!("acquired {} intervals", report.acquired_interval_count());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Request configuration: spatial/temporal/identifier filters, QC
/// thresholds, priority lists, retry/pool policy.
pub mod config;
/// Spatial domain predicate consumed by availability filtering.
pub mod domain;
/// Error types.
pub mod error;
/// Great-circle distance helper for the inter-station distance filter.
pub mod geo;
/// Station-metadata coverage types and the `MetadataStore` seam.
pub mod metadata;
/// The `Station`/`Channel`/`TimeInterval` graph.
pub mod model;
/// Cross-provider orchestration: roster construction and the `download` entry point.
pub mod orchestrator;
/// Channel and location priority filtering.
pub mod priority;
/// The provider RPC surface (`ProviderClient`) and its request/response types.
pub mod provider;
/// Retry logic with exponential backoff and jitter.
pub mod retry;
/// Interval status token and its transition function.
pub mod status;
/// Storage path resolution (`StorageResolver`, storage hints).
pub mod storage;
/// In-memory fakes for every external collaborator trait, for testing.
pub mod test_support;
/// The `WaveformReader` seam and parsed-waveform summary types.
pub mod waveform;

// Private: per-provider orchestration driving one `ProviderClient` from
// availability through sanitization. Not re-exported at the crate root;
// callers interact with `orchestrator::DownloadHelper` instead, which owns
// one of these per provider per run.
mod client;

// Re-export commonly used types
pub use config::{CapabilityMode, CapabilityOverrides, PoolConfig, Restrictions, RetryConfig};
pub use domain::{Domain, GlobalDomain, QueryValue};
pub use error::{Error, ProviderError, Result, StorageError};
pub use metadata::{CoverageRow, MetadataStore};
pub use model::{Channel, Station, TimeInterval};
pub use orchestrator::{DownloadHelper, MetadataStorage, ProviderFactory, Report, WaveformStorage};
pub use provider::{
    AvailableChannel, Inventory, MetadataRequest, MetadataResponse, ProviderClient,
    WaveformRequest, WaveformSegment,
};
pub use status::{Event, Status, next_status};
pub use storage::{FilesystemResolver, MetadataTarget, StorageHint, StorageResolver, TemplateArgs, WaveformTarget};
pub use waveform::{ParsedWaveform, TraceCoverage, WaveformReader};
