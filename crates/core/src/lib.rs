//! libsmith-core: download, patch, and build orchestration
//!
//! Everything between flag parsing and process exit lives here: build
//! requests, output directory layout, install freshness checks, source
//! fetching and patching, and the CMake lifecycle for the two libraries the
//! tool knows how to build.

pub mod cmake;
pub mod epoch;
mod error;
pub mod exec;
pub mod fetch;
pub mod layout;
pub mod libressl;
pub mod llvm;
pub mod patch;
mod request;
pub mod roots;

pub use error::CoreError;
pub use request::{BuildRequest, Configuration, VsVersion, parse_config_selector};

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// What a pipeline run amounted to
#[derive(Debug)]
pub enum Outcome {
    /// Every requested configuration already had a current install
    UpToDate,
    /// The fetch+build sequence ran to completion
    Built { elapsed: std::time::Duration },
}
