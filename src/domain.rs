//! Spatial domain predicate, consumed but not defined here.
//!
//! Implementations (circular, rectangular, global) live outside this
//! crate. The orchestrator only needs provider-specific query parameters
//! and, optionally, a point-in-domain test for the post-availability
//! spatial filter.

use std::collections::HashMap;

/// A scalar query parameter value sent to a provider's station-listing RPC.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Text value
    Text(String),
    /// Floating point value (e.g. a bounding-box coordinate)
    Number(f64),
}

impl std::fmt::Display for QueryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryValue::Text(s) => write!(f, "{s}"),
            QueryValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Geographic domain predicate consumed by `ClientDownloadHelper::get_availability`.
pub trait Domain: Send + Sync {
    /// Provider-specific spatial query parameters (e.g. bounding box corners)
    fn get_query_parameters(&self) -> HashMap<String, QueryValue>;

    /// Optional point-in-domain test applied to each returned station.
    ///
    /// `None` means no post-filter is applied.
    fn is_in_domain(&self, _latitude: f64, _longitude: f64) -> Option<bool> {
        None
    }
}

/// A domain with no spatial restriction: every query parameter map is
/// empty and every point is in-domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalDomain;

impl Domain for GlobalDomain {
    fn get_query_parameters(&self) -> HashMap<String, QueryValue> {
        HashMap::new()
    }

    fn is_in_domain(&self, _latitude: f64, _longitude: f64) -> Option<bool> {
        Some(true)
    }
}
