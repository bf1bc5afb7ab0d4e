//! Error types for libsmith-core

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in core operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Platform error: {0}")]
    Platform(#[from] libsmith_platform::PlatformError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download of {url} failed: HTTP {status}")]
    DownloadFailed { url: String, status: reqwest::StatusCode },

    #[error("Unsupported archive format: {0}")]
    UnsupportedArchive(String),

    #[error("Failed to run '{program}': {source}")]
    Spawn { program: String, source: std::io::Error },

    #[error("'{program}' failed with exit code {code}")]
    CommandFailed { program: String, code: i32 },

    #[error("{0} environment variable not defined, please define first")]
    MissingLibsRoot(&'static str),

    #[error("Unknown config {0}")]
    UnknownConfig(String),

    #[error("No CMake generator known for Visual Studio {0}")]
    UnsupportedVsVersion(u16),

    #[error("Don't have patches for this version of LibreSSL ({0})")]
    NoPatchesForVersion(String),

    #[error("Patches directory not found: {0}")]
    PatchesMissing(PathBuf),

    #[error("Invalid version string: {0}")]
    InvalidVersion(String),

    #[error("Build driver used before init")]
    DriverNotInitialized,

    #[error("Install stamp error: {0}")]
    Stamp(#[from] serde_json::Error),
}
