//! Provider ordering and the minimum-inter-station-distance filter.

use crate::geo::{Coordinate, nearest_distance_m};
use crate::model::Station;

/// Providers forced to the front of the default order when the caller
/// does not specify one.
const RESERVED_FIRST: [&str; 2] = ["IRIS", "ORFEUS"];

/// The built-in provider registry used when no explicit provider list is
/// given. A concrete deployment typically overrides this with its own
/// roster; this list covers the commonly federated FDSN data centers
/// beyond the two reserved names.
const DEFAULT_REGISTRY: [&str; 5] = ["IRIS", "ORFEUS", "GEOFON", "RESIF", "USGS"];

/// Resolve the configured provider order: `None` falls back to the
/// built-in registry; any explicit list is normalized so "IRIS" sorts
/// first and "ORFEUS" second, the remainder alphabetical.
pub fn order_providers(names: Option<Vec<String>>) -> Vec<String> {
    let mut names = names.unwrap_or_else(|| DEFAULT_REGISTRY.iter().map(|s| s.to_string()).collect());
    names.sort_by(|a, b| provider_rank(a).cmp(&provider_rank(b)).then_with(|| a.cmp(b)));
    names
}

fn provider_rank(name: &str) -> usize {
    RESERVED_FIRST
        .iter()
        .position(|reserved| reserved.eq_ignore_ascii_case(name))
        .unwrap_or(RESERVED_FIRST.len())
}

/// Partition `stations` against the great-circle distance filter: a
/// station is discarded if the nearest already-accepted coordinate is
/// closer than `min_distance_m`.
///
/// Returns `(kept, discarded_keys)`.
pub fn apply_distance_filter(
    stations: Vec<Station>,
    accepted: &[Coordinate],
    min_distance_m: f64,
) -> (Vec<Station>, Vec<(String, String)>) {
    if min_distance_m <= 0.0 || accepted.is_empty() {
        return (stations, Vec::new());
    }

    let mut kept = Vec::new();
    let mut discarded = Vec::new();
    for station in stations {
        let distance = nearest_distance_m(station.coordinate(), accepted);
        if distance < min_distance_m {
            discarded.push(station.key());
        } else {
            kept.push(station);
        }
    }
    (kept, discarded)
}
