//! Error types for page fetching and asset localization.
//!
//! Every variant renders as a single human-readable line naming the
//! offending URL or path together with the underlying cause.

use std::path::PathBuf;

use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, MirrorError>;

/// Broad category of a [`MirrorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid invocation, fatal to the whole run.
    Argument,
    /// Malformed page URL or asset reference.
    UrlResolution,
    /// Network failure or non-success HTTP status.
    Fetch,
    /// Directory or file write failure.
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("no URLs supplied")]
    NoUrls,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("URL {url} has no host name")]
    MissingHost { url: String },

    #[error("cannot resolve {reference}: {source}")]
    Resolution {
        reference: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme `{scheme}` in {url}")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("{url} does not name a file")]
    MissingFileName { url: String },

    #[error("{url} would be saved outside the output directory")]
    UnsafePath { url: String },

    #[error("{path} would overwrite the saved page")]
    PageFileCollision { path: String },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[source] std::io::Error),
}

impl MirrorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MirrorError::NoUrls | MirrorError::Config(_) => ErrorKind::Argument,
            MirrorError::InvalidUrl { .. }
            | MirrorError::MissingHost { .. }
            | MirrorError::Resolution { .. }
            | MirrorError::UnsupportedScheme { .. }
            | MirrorError::MissingFileName { .. }
            | MirrorError::UnsafePath { .. }
            | MirrorError::PageFileCollision { .. } => ErrorKind::UrlResolution,
            MirrorError::Network { .. } | MirrorError::Status { .. } => ErrorKind::Fetch,
            MirrorError::Io { .. } | MirrorError::Serialize(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MirrorError::Io {
            path: path.into(),
            source,
        }
    }
}
