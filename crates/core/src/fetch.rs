//! Source archive fetching and extraction
//!
//! Every operation here is idempotent via a filesystem existence check: a
//! file already on disk is not downloaded again, and a directory that
//! already exists is not re-extracted or re-cloned. Completeness of prior
//! output is not verified; a run interrupted mid-extraction needs
//! `--forcerebuild` (or manual cleanup) to recover.

use flate2::read::GzDecoder;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::{debug, info};
use xz::read::XzDecoder;

use crate::exec;
use crate::{CoreError, Result};

/// Download `url` to `dest` unless `dest` already exists on disk
pub fn download_if_absent(url: &str, dest: &Path) -> Result<()> {
    if dest.exists() {
        debug!(path = %dest.display(), "already downloaded, skipping");
        return Ok(());
    }

    info!(url, "downloading");
    let response = reqwest::blocking::get(url)?;
    if !response.status().is_success() {
        return Err(CoreError::DownloadFailed {
            url: url.to_string(),
            status: response.status(),
        });
    }
    let bytes = response.bytes()?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(dest)?;
    file.write_all(&bytes)?;

    info!(path = %dest.display(), size = bytes.len(), "download complete");
    Ok(())
}

/// Extract `archive` so its contents land in `dest_dir`, unless `dest_dir`
/// already exists.
///
/// The archive's single top-level directory is stripped, which lets the
/// caller pick the final directory name directly (the LLVM CMake companion
/// archive extracts straight into `cmake/` this way, no rename step).
///
/// Supports `.tar.gz`/`.tgz`, `.tar.xz`, and plain `.tar`.
pub fn extract_if_absent(archive: &Path, dest_dir: &Path) -> Result<()> {
    if dest_dir.exists() {
        debug!(dir = %dest_dir.display(), "already extracted, skipping");
        return Ok(());
    }

    info!(archive = %archive.display(), dir = %dest_dir.display(), "extracting");
    let name = archive
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or_default();
    let file = File::open(archive)?;

    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        unpack_stripped(GzDecoder::new(BufReader::new(file)), dest_dir)
    } else if name.ends_with(".tar.xz") {
        unpack_stripped(XzDecoder::new(BufReader::new(file)), dest_dir)
    } else if name.ends_with(".tar") {
        unpack_stripped(BufReader::new(file), dest_dir)
    } else {
        Err(CoreError::UnsupportedArchive(
            archive.display().to_string(),
        ))
    }
}

fn unpack_stripped<R: Read>(reader: R, dest: &Path) -> Result<()> {
    let mut archive = Archive::new(reader);
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?;

        // Strip the top-level directory (e.g. libressl-3.5.2/)
        let stripped: PathBuf = path.components().skip(1).collect();
        if stripped.as_os_str().is_empty() {
            continue;
        }

        let dest_path = dest.join(&stripped);
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }
        entry.unpack(&dest_path)?;
    }
    Ok(())
}

/// Clone a git repository into `dest` unless `dest` already exists
pub fn clone_if_absent(url: &str, dest: &Path) -> Result<()> {
    if dest.exists() {
        debug!(dir = %dest.display(), "already cloned, skipping");
        return Ok(());
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    info!(url, "cloning");
    exec::run(
        "git",
        [OsStr::new("clone"), OsStr::new(url), dest.as_os_str()],
        None,
    )
}
