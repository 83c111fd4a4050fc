//! The `Station`/`Channel`/`TimeInterval` graph.
//!
//! `Station`, `Channel`, `TimeInterval` are created when a provider's
//! availability response is parsed, live for the duration of one
//! orchestrator run, and are owned exclusively by their
//! `ClientDownloadHelper`. `Channel`s are owned directly by their
//! `Station` (a plain `Vec<Channel>`) and never hold a back-pointer to it —
//! there is no arena or index to thread through.

mod channel;
mod interval;
mod station;

pub use channel::Channel;
pub use interval::TimeInterval;
pub use station::{MetadataMap, Station};
