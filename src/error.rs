//! Error types for seismdl
//!
//! Each variant is one of the named error kinds (`provider_init_failure`,
//! `provider_rpc_error`, `storage_permission_error`,
//! `invalid_configuration`, ...). `qc_reject` and `metadata_missing` are
//! not represented here because they are signaled through
//! interval/station status, never raised.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for seismdl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for seismdl
#[derive(Debug, Error)]
pub enum Error {
    /// `invalid_configuration` — surfaced synchronously before any network I/O
    #[error("invalid configuration: {message}")]
    Config {
        /// Human-readable description of what is wrong
        message: String,
        /// The configuration field that failed validation, if applicable
        field: Option<String>,
    },

    /// Provider-related error (init failure, RPC error, timeout)
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Filesystem write or read failed while resolving/writing a file
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error not otherwise classified
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (report emission, config parsing)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Provider-related errors: provider_init_failure, provider_rpc_error, empty_response
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider could not be reached or lacks required capabilities at startup
    #[error("provider '{provider}' failed to initialize: {reason}")]
    InitFailure {
        /// Provider name
        provider: String,
        /// Reason initialization failed (connection refused, missing dataselect/station service, ...)
        reason: String,
    },

    /// The availability or bulk-waveform RPC raised a non-"no data" error
    #[error("provider '{provider}' RPC failed: {reason}")]
    RpcError {
        /// Provider name
        provider: String,
        /// Underlying error text
        reason: String,
    },

    /// The RPC timed out; treated as a provider-level error
    #[error("provider '{provider}' RPC timed out after {elapsed_ms}ms")]
    Timeout {
        /// Provider name
        provider: String,
        /// How long the call ran before timing out
        elapsed_ms: u64,
    },
}

impl ProviderError {
    /// True if the RPC error text matches the "no data available" convention:
    /// treated as success with an empty payload, not surfaced as an error at all.
    pub fn is_empty_response(message: &str) -> bool {
        message.to_lowercase().contains("no data available")
    }
}

/// Filesystem-related errors: storage_permission_error
#[derive(Debug, Error)]
pub enum StorageError {
    /// A write to the resolved path failed
    #[error("failed to write '{path}': {reason}")]
    WriteFailed {
        /// Path that could not be written
        path: PathBuf,
        /// Underlying OS error text
        reason: String,
    },

    /// The resolver's parent directory could not be created
    #[error("failed to create parent directory for '{path}': {reason}")]
    DirectoryCreateFailed {
        /// Path whose parent directory creation failed
        path: PathBuf,
        /// Underlying OS error text
        reason: String,
    },

    /// A storage hint returned the reserved directive form, which this
    /// implementation does not support
    #[error("metadata storage directive form is not supported by this resolver")]
    DirectiveNotSupported,
}
