//! Resolution of the libraries root directory

use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::{CoreError, Result};

/// Environment variable naming the parent directory for all library trees
pub const LIBS_ROOT_ENV: &str = "LIBSMITH_LIBS";

/// Resolve the libraries root from the environment.
///
/// Backslashes are normalized to forward slashes; the value ends up in CMake
/// arguments, and CMake does not take backslash paths.
pub fn libs_root() -> Result<PathBuf> {
    let raw =
        std::env::var(LIBS_ROOT_ENV).map_err(|_| CoreError::MissingLibsRoot(LIBS_ROOT_ENV))?;
    Ok(PathBuf::from(raw.replace('\\', "/")))
}

/// Return `<root>/<library>`, creating it on first use
pub fn library_dir(library: &str) -> Result<PathBuf> {
    let dir = libs_root()?.join(library);
    if !dir.exists() {
        info!(dir = %dir.display(), "creating library directory");
        fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}
