//! `StorageResolver` — pure-function translation from identifiers/times to
//! a local filesystem path.
//!
//! Storage hints are modeled as a tagged variant (`Template` or
//! `Callback`) rather than relying on a language-level "callable or
//! literal" duck type.

use crate::error::{Error, Result, StorageError};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of resolving a waveform storage hint.
#[derive(Debug, Clone, PartialEq)]
pub enum WaveformTarget {
    /// Write the interval's waveform to this path
    Path(PathBuf),
    /// Skip this interval entirely (the `IGNORE` sentinel)
    Ignore,
}

/// Outcome of resolving a metadata storage hint.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataTarget {
    /// Write the station's metadata to this path
    Path(PathBuf),
    /// A reserved "fetch-this-list, write-that-file" directive form;
    /// implementations may error on it.
    Directive,
}

/// A storage hint: either a literal template string with `{network}`,
/// `{station}`, `{location}`, `{channel}`, `{starttime}`, `{endtime}`
/// placeholders, or a callback function.
#[derive(Clone)]
pub enum StorageHint<T> {
    /// Literal template string
    Template(String),
    /// Callback invoked with the same named arguments a template substitutes
    Callback(Arc<dyn Fn(&TemplateArgs) -> T + Send + Sync>),
}

impl<T: std::fmt::Debug> std::fmt::Debug for StorageHint<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageHint::Template(s) => f.debug_tuple("Template").field(s).finish(),
            StorageHint::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Named arguments passed to a storage hint, whether rendered into a
/// template or passed to a callback.
#[derive(Debug, Clone)]
pub struct TemplateArgs {
    /// Network code
    pub network: String,
    /// Station code
    pub station: String,
    /// Location code (waveform hints only)
    pub location: Option<String>,
    /// Channel code (waveform hints only)
    pub channel: Option<String>,
    /// Interval/request start
    pub start: DateTime<Utc>,
    /// Interval/request end
    pub end: DateTime<Utc>,
}

impl TemplateArgs {
    fn render(&self, template: &str) -> String {
        template
            .replace("{network}", &self.network)
            .replace("{station}", &self.station)
            .replace("{location}", self.location.as_deref().unwrap_or(""))
            .replace("{channel}", self.channel.as_deref().unwrap_or(""))
            .replace("{starttime}", &self.start.to_rfc3339())
            .replace("{endtime}", &self.end.to_rfc3339())
    }
}

/// Resolve a waveform or metadata storage location from identifiers and
/// times. Both operations are pure functions of their arguments; the
/// returned path's parent directory is created by the resolver before
/// returning.
pub trait StorageResolver: Send + Sync {
    /// `resolve_waveform(hint, net, sta, loc, cha, start, end) → path | IGNORE`
    fn resolve_waveform(
        &self,
        hint: &StorageHint<PathBuf>,
        args: &TemplateArgs,
    ) -> Result<WaveformTarget>;

    /// `resolve_metadata(hint, net, sta, channels, start, end) → path | directive`
    fn resolve_metadata(
        &self,
        hint: &StorageHint<PathBuf>,
        args: &TemplateArgs,
    ) -> Result<MetadataTarget>;
}

/// A `StorageResolver` that resolves directly to the filesystem,
/// creating parent directories as needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemResolver;

impl FilesystemResolver {
    fn ensure_parent_dir(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Storage(StorageError::DirectoryCreateFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            })?;
        }
        Ok(())
    }
}

impl StorageResolver for FilesystemResolver {
    fn resolve_waveform(
        &self,
        hint: &StorageHint<PathBuf>,
        args: &TemplateArgs,
    ) -> Result<WaveformTarget> {
        let path = match hint {
            StorageHint::Template(template) => PathBuf::from(args.render(template)),
            StorageHint::Callback(f) => f(args),
        };
        if path.as_os_str().is_empty() {
            return Ok(WaveformTarget::Ignore);
        }
        Self::ensure_parent_dir(&path)?;
        Ok(WaveformTarget::Path(path))
    }

    fn resolve_metadata(
        &self,
        hint: &StorageHint<PathBuf>,
        args: &TemplateArgs,
    ) -> Result<MetadataTarget> {
        let path = match hint {
            StorageHint::Template(template) => PathBuf::from(args.render(template)),
            StorageHint::Callback(f) => f(args),
        };
        Self::ensure_parent_dir(&path)?;
        Ok(MetadataTarget::Path(path))
    }
}
