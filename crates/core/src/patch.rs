//! LibreSSL source patching (Windows only)
//!
//! LibreSSL's Windows compat layer calls `read()` on sockets that another
//! thread is closing; the replacement sources return the WSA error code
//! instead (libressl-portable/portable#266). Patching overwrites two files
//! in the extracted source tree and drops a sentinel so repeat runs skip
//! the copy.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{CoreError, Result};

/// Sentinel file created inside the source tree after a successful patch
pub const PATCH_SENTINEL: &str = "libsmith-patch.success";

/// Environment variable overriding the patches root directory
pub const PATCHES_ENV: &str = "LIBSMITH_PATCHES";

/// LibreSSL versions with replacement sources on hand
pub const PATCHED_VERSIONS: &[&str] = &["3.3.5", "3.5.2"];

/// (replacement file in the patches dir, target path in the source tree)
const PATCHED_FILES: &[(&str, &str)] = &[
    ("posix_win.c", "crypto/compat/posix_win.c"),
    ("tls_config.c", "tls/tls_config.c"),
];

/// Locate the patches root: `$LIBSMITH_PATCHES` if set, otherwise the
/// `patches/` directory next to the running executable.
pub fn patches_root() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(PATCHES_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .map(|p| p.join("patches"))
        .unwrap_or_else(|| PathBuf::from("patches"));
    Ok(dir)
}

/// Overwrite the known-bad sources in `source_dir` with the replacements
/// for `version`.
///
/// Skipped entirely (no copies, no error) when the sentinel is already
/// present. A version outside [`PATCHED_VERSIONS`] is a fatal error: an
/// unpatched build is not usable on Windows. Returns whether the patch was
/// applied by this call.
pub fn patch_libressl(source_dir: &Path, patches_root: &Path, version: &str) -> Result<bool> {
    let sentinel = source_dir.join(PATCH_SENTINEL);
    if sentinel.exists() {
        info!("already patched, skipping");
        return Ok(false);
    }

    if !PATCHED_VERSIONS.contains(&version) {
        return Err(CoreError::NoPatchesForVersion(version.to_string()));
    }

    let version_dir = patches_root.join("libressl").join(version);
    if !version_dir.is_dir() {
        return Err(CoreError::PatchesMissing(version_dir));
    }

    for (replacement, target) in PATCHED_FILES {
        let from = version_dir.join(replacement);
        let to = source_dir.join(target);
        info!(from = %from.display(), to = %to.display(), "copying replacement source");
        fs::copy(&from, &to)?;
    }

    // touch semantics: create if absent, else bump the timestamp
    File::create(&sentinel)?;
    info!("done patching source");
    Ok(true)
}
