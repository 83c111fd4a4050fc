//! Configuration types
//!
//! `Restrictions` is the user-facing request object: spatial/temporal/
//! identifier filters, priority lists, and QC thresholds. `RetryConfig`
//! and `PoolConfig` are the ambient resource-policy knobs the orchestrator
//! needs, rather than data model fields.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Band code (first letter of a channel code) → nominal sample rate in Hz.
///
/// Used only for chunk-size estimation; an unknown band code falls back
/// to 1.0 Hz.
pub fn band_code_sample_rate(band_code: char) -> f64 {
    match band_code.to_ascii_uppercase() {
        'F' => 5000.0,
        'G' => 5000.0,
        'D' => 1000.0,
        'C' => 1000.0,
        'E' => 250.0,
        'S' => 80.0,
        'H' => 250.0,
        'B' => 80.0,
        'M' => 10.0,
        'L' => 1.0,
        'V' => 0.1,
        'U' => 0.01,
        'R' => 0.001,
        'P' => 0.0001,
        'T' => 1e-5,
        'Q' => 1e-6,
        'A' => 5000.0,
        'O' => 5000.0,
        _ => 1.0,
    }
}

/// How a provider's availability-reliability capability is reported in the
/// static overwrite table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityMode {
    /// Treat availability as unreliable regardless of advertised capabilities
    Unreliable,
    /// Provider supports a `matchtimeseries`-style reliable availability query
    MatchTimeseries,
    /// Provider supports an `includeavailability`-style reliable availability query
    IncludeAvailability,
}

/// Static per-provider capability overrides, checked case-insensitively.
/// Consulted first in `get_availability`'s capability-negotiation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityOverrides {
    entries: std::collections::HashMap<String, CapabilityMode>,
}

impl CapabilityOverrides {
    /// Build a table from `(provider, mode)` pairs; provider names are
    /// normalized to lowercase so lookups are case-insensitive.
    pub fn new(entries: impl IntoIterator<Item = (String, CapabilityMode)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        }
    }

    /// Look up the override for `provider`, if any.
    pub fn get(&self, provider: &str) -> Option<CapabilityMode> {
        self.entries.get(&provider.to_lowercase()).copied()
    }
}

/// Retry/backoff policy for provider RPC calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry
    #[serde(default = "default_initial_delay", with = "duration_millis")]
    pub initial_delay: Duration,
    /// Upper bound on any single retry delay
    #[serde(default = "default_max_delay", with = "duration_millis")]
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each attempt
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Whether to add random jitter to each delay
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_initial_delay() -> Duration {
    Duration::from_millis(500)
}
fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_jitter() -> bool {
    true
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: default_jitter(),
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Bounded worker pool sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Concurrent HTTP streams to a single provider's waveform pool
    #[serde(default = "default_threads_per_client")]
    pub threads_per_client: usize,
    /// Concurrent requests in a provider's metadata pool
    #[serde(default = "default_metadata_threads")]
    pub metadata_threads: usize,
    /// Target size, in megabytes, for a waveform download chunk
    #[serde(default = "default_chunk_size_mb")]
    pub chunk_size_mb: f64,
}

fn default_threads_per_client() -> usize {
    4
}
fn default_metadata_threads() -> usize {
    10
}
fn default_chunk_size_mb() -> f64 {
    50.0
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            threads_per_client: default_threads_per_client(),
            metadata_threads: default_metadata_threads(),
            chunk_size_mb: default_chunk_size_mb(),
        }
    }
}

/// The user-facing download request.
///
/// Equality compares all fields. Construct via [`Restrictions::try_new`] (or
/// deserialize and call [`Restrictions::validate`]) rather than building the
/// struct literal directly, so `invalid_configuration` is caught eagerly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restrictions {
    /// Start of the overall requested time window (inclusive)
    pub starttime: DateTime<Utc>,
    /// End of the overall requested time window (exclusive)
    pub endtime: DateTime<Utc>,
    /// When set, `starttime..endtime` is split into sub-intervals of this length
    #[serde(default)]
    pub chunklength: Option<Duration>,
    /// Literal network code filter (comma-separated wildcard patterns), if any
    #[serde(default)]
    pub network: Option<String>,
    /// Literal station code filter, if any
    #[serde(default)]
    pub station: Option<String>,
    /// Literal location code filter, if any
    #[serde(default)]
    pub location: Option<String>,
    /// Literal channel code filter, if any
    #[serde(default)]
    pub channel: Option<String>,
    /// Reject a downloaded interval if the parsed waveform has gaps/overlaps
    #[serde(default)]
    pub reject_channels_with_gaps: bool,
    /// Minimum fraction, in `[0, 1]`, of an interval's duration that must be covered
    #[serde(default = "default_minimum_length")]
    pub minimum_length: f64,
    /// Minimum great-circle distance, in meters, enforced between accepted stations
    #[serde(default)]
    pub min_interstation_distance_m: f64,
    /// Ordered glob patterns over the channel code, first-match-wins
    #[serde(default)]
    pub channel_priorities: Vec<String>,
    /// Ordered location codes, highest priority first
    #[serde(default)]
    pub location_priorities: Vec<String>,
}

fn default_minimum_length() -> f64 {
    0.9
}

impl Restrictions {
    /// Construct and eagerly validate a `Restrictions` value.
    ///
    /// Returns `Error::Config` (the `invalid_configuration` kind) rather
    /// than panicking or deferring the check into a running task.
    pub fn try_new(
        starttime: DateTime<Utc>,
        endtime: DateTime<Utc>,
    ) -> Result<Self> {
        let restrictions = Self {
            starttime,
            endtime,
            chunklength: None,
            network: None,
            station: None,
            location: None,
            channel: None,
            reject_channels_with_gaps: false,
            minimum_length: default_minimum_length(),
            min_interstation_distance_m: 0.0,
            channel_priorities: Vec::new(),
            location_priorities: Vec::new(),
        };
        restrictions.validate()?;
        Ok(restrictions)
    }

    /// Validate the invariants: `starttime < endtime`,
    /// `minimum_length ∈ [0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.starttime >= self.endtime {
            return Err(Error::Config {
                message: "starttime must be strictly before endtime".to_string(),
                field: Some("starttime".to_string()),
            });
        }
        if !(0.0..=1.0).contains(&self.minimum_length) {
            return Err(Error::Config {
                message: format!(
                    "minimum_length must be within [0, 1], got {}",
                    self.minimum_length
                ),
                field: Some("minimum_length".to_string()),
            });
        }
        if self.min_interstation_distance_m < 0.0 {
            return Err(Error::Config {
                message: "min_interstation_distance_m must be non-negative".to_string(),
                field: Some("min_interstation_distance_m".to_string()),
            });
        }
        Ok(())
    }

    /// True if a literal filter is present for `channel` — in which case
    /// `channel_priorities` is skipped.
    pub fn has_literal_channel_filter(&self) -> bool {
        self.channel.is_some()
    }

    /// True if a literal filter is present for `location`.
    pub fn has_literal_location_filter(&self) -> bool {
        self.location.is_some()
    }

    /// Lazy, restartable chunked time sequence.
    ///
    /// Modeled as a function returning a fresh iterator on every call —
    /// never a stateful object that can only be consumed once.
    pub fn chunks(&self) -> ChunkIter {
        ChunkIter {
            cursor: self.starttime,
            endtime: self.endtime,
            chunklength: self.chunklength,
            done: false,
        }
    }
}

/// Iterator over `(sub_start, sub_end)` pairs yielded by [`Restrictions::chunks`].
pub struct ChunkIter {
    cursor: DateTime<Utc>,
    endtime: DateTime<Utc>,
    chunklength: Option<Duration>,
    done: bool,
}

impl Iterator for ChunkIter {
    type Item = (DateTime<Utc>, DateTime<Utc>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cursor >= self.endtime {
            return None;
        }
        match self.chunklength {
            None => {
                self.done = true;
                Some((self.cursor, self.endtime))
            }
            Some(step) => {
                let step = chrono::Duration::from_std(step).unwrap_or(chrono::Duration::zero());
                let next_end = (self.cursor + step).min(self.endtime);
                let pair = (self.cursor, next_end);
                self.cursor += step;
                Some(pair)
            }
        }
    }
}
