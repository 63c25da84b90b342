//! Error taxonomy for a fetch: one variant per failure class, surfaced to the caller as-is.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse failure class, for callers that branch on the kind rather than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Lookup,
    Filesystem,
    ManifestParse,
    ManifestWrite,
    Network,
}

/// Failure of any step of a fetch. Nothing is retried or cleaned up at this layer.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Catalog answered, but without a usable descriptor for the id.
    #[error("cannot get content information from catalog for id {id}: {reason}")]
    Lookup { id: String, reason: String },

    /// Directory or file creation, or a write into the sink, failed.
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Manifest missing, unreadable or not well-formed XML.
    #[error("cannot parse manifest {}: {reason}", path.display())]
    ManifestParse { path: PathBuf, reason: String },

    /// Serializing the new entry or writing the manifest back failed.
    #[error("cannot write manifest {}: {reason}", path.display())]
    ManifestWrite { path: PathBuf, reason: String },

    /// Transport failure or non-2xx status during lookup or download.
    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Lookup { .. } => FetchErrorKind::Lookup,
            FetchError::Filesystem { .. } => FetchErrorKind::Filesystem,
            FetchError::ManifestParse { .. } => FetchErrorKind::ManifestParse,
            FetchError::ManifestWrite { .. } => FetchErrorKind::ManifestWrite,
            FetchError::Network { .. } => FetchErrorKind::Network,
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FetchError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn network(url: &str, reason: impl ToString) -> Self {
        FetchError::Network {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
