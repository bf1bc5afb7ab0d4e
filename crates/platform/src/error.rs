//! Error types for libsmith-platform

use thiserror::Error;

/// Errors that can occur during platform detection
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Unsupported operating system: {0}")]
    UnsupportedOs(String),

    #[error("Unsupported CPU architecture: {0}")]
    UnsupportedArch(String),
}
