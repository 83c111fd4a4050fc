//! End-to-end scenario tests driving `DownloadHelper::download` through the
//! public API only, using the crate's own fakes (`seismdl::test_support`).

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use seismdl::config::{CapabilityOverrides, PoolConfig, Restrictions};
use seismdl::domain::GlobalDomain;
use seismdl::error::Result;
use seismdl::metadata::CoverageRow;
use seismdl::orchestrator::{DownloadHelper, MetadataStorage, ProviderFactory, WaveformStorage};
use seismdl::provider::{
    AvailableChannel, Inventory, MetadataResponse, ProviderClient, WaveformSegment,
};
use seismdl::status::Status;
use seismdl::storage::{FilesystemResolver, StorageHint};
use seismdl::test_support::{FakeDomain, FakeMetadataStore, FakeProvider, FakeWaveformReader};
use seismdl::waveform::TraceCoverage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn ts(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2012, 1, 1, h, 0, 0).unwrap()
}

fn single_channel_inventory(network: &str, station: &str, lat: f64, lon: f64, channel: &str) -> Inventory {
    Inventory {
        channels: vec![AvailableChannel {
            network: network.to_string(),
            station: station.to_string(),
            location: "".to_string(),
            channel: channel.to_string(),
            latitude: lat,
            longitude: lon,
            start_date: ts(0) - chrono::Duration::days(3650),
            end_date: ts(0) + chrono::Duration::days(3650),
            availability_extent: Some((ts(0) - chrono::Duration::days(3650), ts(0) + chrono::Duration::days(3650))),
        }],
    }
}

fn waveform_hint(base: &std::path::Path) -> StorageHint<std::path::PathBuf> {
    StorageHint::Template(format!(
        "{}/{{network}}.{{station}}.{{location}}.{{channel}}.mseed",
        base.display()
    ))
}

fn metadata_hint(base: &std::path::Path) -> StorageHint<std::path::PathBuf> {
    StorageHint::Template(format!("{}/{{network}}.{{station}}.xml", base.display()))
}

/// A day split into 6-hour chunks yields four intervals per channel, each
/// fully planned and downloaded.
#[tokio::test]
async fn s1_chunked_request_downloads_four_intervals() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().to_path_buf();

    let provider = Arc::new(
        FakeProvider::new("IRIS")
            .with_stations(|| Ok(single_channel_inventory("NET", "STA", 0.0, 0.0, "HHZ")))
            .with_waveforms(|reqs| {
                Ok(reqs
                    .iter()
                    .map(|r| WaveformSegment { request: r.clone(), data: b"fake-miniseed".to_vec() })
                    .collect())
            }),
    );

    let mut reader = FakeWaveformReader::default();
    for h in [0, 6, 12, 18] {
        let path = base.join("NET.STA..HHZ.mseed");
        // Each chunk writes to the same planned path in this simplified fake
        // layout; register full coverage for the broadest interval queried.
        reader.insert(path, vec![TraceCoverage { start: ts(h), end: ts(h + 6) }]);
    }

    let metadata_store = Arc::new(FakeMetadataStore::default());
    let helper = DownloadHelper::from_clients(
        vec![provider],
        Arc::new(reader),
        metadata_store,
        CapabilityOverrides::default(),
        PoolConfig::default(),
    );

    let restrictions = Restrictions {
        chunklength: Some(std::time::Duration::from_secs(21_600)),
        ..Restrictions::try_new(ts(0), ts(0) + chrono::Duration::days(1)).unwrap()
    };

    let report = helper
        .download(
            Arc::new(GlobalDomain),
            restrictions,
            WaveformStorage::new(Arc::new(FilesystemResolver), waveform_hint(&base)),
            MetadataStorage::new(Arc::new(FilesystemResolver), metadata_hint(&base)),
            50.0,
            4,
        )
        .await
        .unwrap();

    let station = &report.providers[0].stations[0];
    let channel = &station.channels[0];
    assert_eq!(channel.intervals.len(), 4, "a day at 6h chunklength plans four intervals");
}

/// A file covering only 40% of a 6-hour interval is rejected under
/// `minimum_length=0.9`, deleted, and its bytes discarded.
#[tokio::test]
async fn s4_qc_rejects_short_coverage_file() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().to_path_buf();

    let provider = Arc::new(
        FakeProvider::new("IRIS")
            .with_stations(|| Ok(single_channel_inventory("NET", "STA", 0.0, 0.0, "HHZ")))
            .with_waveforms(|reqs| {
                Ok(reqs
                    .iter()
                    .map(|r| WaveformSegment { request: r.clone(), data: b"short-file".to_vec() })
                    .collect())
            }),
    );

    let mut reader = FakeWaveformReader::default();
    let path = base.join("NET.STA..HHZ.mseed");
    // 40% of a 6-hour interval: 2h24m covered.
    reader.insert(path.clone(), vec![TraceCoverage { start: ts(0), end: ts(0) + chrono::Duration::minutes(144) }]);

    let helper = DownloadHelper::from_clients(
        vec![provider],
        Arc::new(reader),
        Arc::new(FakeMetadataStore::default()),
        CapabilityOverrides::default(),
        PoolConfig::default(),
    );

    let restrictions = Restrictions {
        minimum_length: 0.9,
        ..Restrictions::try_new(ts(0), ts(6)).unwrap()
    };

    let report = helper
        .download(
            Arc::new(GlobalDomain),
            restrictions,
            WaveformStorage::new(Arc::new(FilesystemResolver), waveform_hint(&base)),
            MetadataStorage::new(Arc::new(FilesystemResolver), metadata_hint(&base)),
            50.0,
            4,
        )
        .await
        .unwrap();

    let interval = &report.providers[0].stations[0].channels[0].intervals[0];
    assert_eq!(interval.status, Status::DownloadRejected);
    assert!(!path.exists(), "QC must delete the rejected file");
}

/// Existing metadata coverage means `have_metadata` is populated and no
/// metadata RPC is issued.
#[tokio::test]
async fn s3_existing_metadata_coverage_skips_rpc() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().to_path_buf();

    let metadata_calls = Arc::new(AtomicUsize::new(0));
    let metadata_calls_clone = Arc::clone(&metadata_calls);

    let provider = Arc::new(
        FakeProvider::new("IRIS")
            .with_stations(|| Ok(single_channel_inventory("NET", "STA", 0.0, 0.0, "BHZ")))
            .with_waveforms(|reqs| {
                Ok(reqs
                    .iter()
                    .map(|r| WaveformSegment { request: r.clone(), data: b"fake-miniseed".to_vec() })
                    .collect())
            })
            .with_metadata(move |req| {
                metadata_calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok(MetadataResponse { request: req.clone(), data: Vec::new() })
            }),
    );

    let mut reader = FakeWaveformReader::default();
    let waveform_path = base.join("NET.STA..BHZ.mseed");
    reader.insert(waveform_path, vec![TraceCoverage { start: ts(0), end: ts(6) }]);

    let metadata_store = Arc::new(FakeMetadataStore::default());
    let metadata_path = base.join("NET.STA.xml");
    // Pre-existing metadata file with coverage spanning well beyond the request.
    std::fs::write(&metadata_path, b"pre-existing-stationxml").unwrap();
    metadata_store.set_coverage(
        metadata_path,
        vec![CoverageRow {
            location: "".to_string(),
            channel: "BHZ".to_string(),
            start: Utc.with_ymd_and_hms(2011, 6, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2013, 1, 1, 0, 0, 0).unwrap(),
        }],
    );

    let helper = DownloadHelper::from_clients(
        vec![provider],
        Arc::new(reader),
        metadata_store,
        CapabilityOverrides::default(),
        PoolConfig::default(),
    );

    let report = helper
        .download(
            Arc::new(GlobalDomain),
            Restrictions::try_new(ts(0), ts(6)).unwrap(),
            WaveformStorage::new(Arc::new(FilesystemResolver), waveform_hint(&base)),
            MetadataStorage::new(Arc::new(FilesystemResolver), metadata_hint(&base)),
            50.0,
            4,
        )
        .await
        .unwrap();

    assert_eq!(metadata_calls.load(Ordering::SeqCst), 0, "coverage was already on disk; no RPC should fire");
    assert_eq!(report.providers[0].stations[0].channels[0].intervals[0].status, Status::Downloaded);
}

/// Two providers report the same physical station ~55m apart; with
/// `min_interstation_distance_m=1000`, the second provider's station is
/// discarded without a waveform RPC.
#[tokio::test]
async fn s6_cross_provider_dedup_discards_nearby_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().to_path_buf();

    let iris = Arc::new(
        FakeProvider::new("IRIS")
            .with_stations(|| Ok(single_channel_inventory("NET", "STA", 0.0, 0.0, "HHZ")))
            .with_waveforms(|reqs| {
                Ok(reqs
                    .iter()
                    .map(|r| WaveformSegment { request: r.clone(), data: b"fake-miniseed".to_vec() })
                    .collect())
            })
            .with_metadata(|req| Ok(MetadataResponse { request: req.clone(), data: b"xml".to_vec() })),
    );

    let orfeus_waveform_calls = Arc::new(AtomicUsize::new(0));
    let orfeus_calls_clone = Arc::clone(&orfeus_waveform_calls);
    let orfeus = Arc::new(
        FakeProvider::new("ORFEUS")
            .with_stations(|| Ok(single_channel_inventory("NET", "STA", 0.0005, 0.0, "HHZ")))
            .with_waveforms(move |reqs| {
                orfeus_calls_clone.fetch_add(1, Ordering::SeqCst);
                Ok(reqs
                    .iter()
                    .map(|r| WaveformSegment { request: r.clone(), data: b"fake-miniseed".to_vec() })
                    .collect())
            }),
    );

    let mut reader = FakeWaveformReader::default();
    reader.insert(base.join("NET.STA..HHZ.mseed"), vec![TraceCoverage { start: ts(0), end: ts(6) }]);
    let metadata_store = Arc::new(FakeMetadataStore::default());
    let metadata_path = base.join("NET.STA.xml");
    metadata_store.set_coverage(
        metadata_path,
        vec![CoverageRow { location: "".to_string(), channel: "HHZ".to_string(), start: ts(0), end: ts(6) }],
    );

    let helper = DownloadHelper::from_clients(
        vec![iris, orfeus],
        Arc::new(reader),
        metadata_store,
        CapabilityOverrides::default(),
        PoolConfig::default(),
    );

    let restrictions = Restrictions {
        min_interstation_distance_m: 1000.0,
        ..Restrictions::try_new(ts(0), ts(6)).unwrap()
    };

    let report = helper
        .download(
            Arc::new(GlobalDomain),
            restrictions,
            WaveformStorage::new(Arc::new(FilesystemResolver), waveform_hint(&base)),
            MetadataStorage::new(Arc::new(FilesystemResolver), metadata_hint(&base)),
            50.0,
            4,
        )
        .await
        .unwrap();

    assert_eq!(report.providers[0].provider, "IRIS");
    assert_eq!(report.providers[0].stations.len(), 1);
    assert!(report.providers[1].stations.is_empty(), "ORFEUS's duplicate station is discarded before download");
    assert_eq!(
        orfeus_waveform_calls.load(Ordering::SeqCst),
        0,
        "a discarded station must never reach the waveform RPC"
    );
}

struct OneProviderFactory;

#[async_trait]
impl ProviderFactory for OneProviderFactory {
    async fn build(&self, name: &str) -> Result<Arc<dyn ProviderClient>> {
        Ok(Arc::new(FakeProvider::new(name)))
    }
}

/// Roster construction: the default registry forces IRIS first, ORFEUS
/// second, remainder alphabetical.
#[tokio::test]
async fn default_roster_respects_reserved_provider_order() {
    let helper = DownloadHelper::new(
        None,
        Arc::new(OneProviderFactory),
        Arc::new(FakeWaveformReader::default()),
        Arc::new(FakeMetadataStore::default()),
        CapabilityOverrides::default(),
        PoolConfig::default(),
    )
    .await;

    let names = helper.provider_names();
    assert_eq!(names[0], "IRIS");
    assert_eq!(names[1], "ORFEUS");
}

/// A domain that rejects every point leaves the provider with no stations
/// and no report entry.
#[tokio::test]
async fn domain_rejecting_every_point_yields_no_stations() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().to_path_buf();

    let provider = Arc::new(FakeProvider::new("IRIS").with_stations(|| Ok(single_channel_inventory("NET", "STA", 0.0, 0.0, "HHZ"))));
    let helper = DownloadHelper::from_clients(
        vec![provider],
        Arc::new(FakeWaveformReader::default()),
        Arc::new(FakeMetadataStore::default()),
        CapabilityOverrides::default(),
        PoolConfig::default(),
    );

    let report = helper
        .download(
            Arc::new(FakeDomain::default().with_in_domain(Some(false))),
            Restrictions::try_new(ts(0), ts(6)).unwrap(),
            WaveformStorage::new(Arc::new(FilesystemResolver), waveform_hint(&base)),
            MetadataStorage::new(Arc::new(FilesystemResolver), metadata_hint(&base)),
            50.0,
            4,
        )
        .await
        .unwrap();

    assert!(report.providers.is_empty());
}
