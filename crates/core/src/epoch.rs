//! Install completeness stamps
//!
//! An install directory counts as complete for a given build epoch iff it
//! contains a stamp recording an epoch at least that new. The per-library
//! epoch constant bumps whenever the build logic changes enough to
//! invalidate previously produced installs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::Result;

/// Name of the stamp file written into each install tree
pub const STAMP_FILE: &str = "libsmith-install.json";

#[derive(Debug, Serialize, Deserialize)]
struct InstallStamp {
    epoch: u32,
}

/// Write or overwrite the stamp in `install_dir`
pub fn write_stamp(install_dir: &Path, epoch: u32) -> Result<()> {
    fs::create_dir_all(install_dir)?;
    let json = serde_json::to_string_pretty(&InstallStamp { epoch })?;
    fs::write(install_dir.join(STAMP_FILE), json)?;
    Ok(())
}

/// Check whether `install_dir` holds a completed install at least as new as
/// `epoch`. An absent or malformed stamp counts as no install.
pub fn install_is_current(install_dir: &Path, epoch: u32) -> bool {
    let path = install_dir.join(STAMP_FILE);
    let Ok(contents) = fs::read_to_string(&path) else {
        debug!(path = %path.display(), "no install stamp");
        return false;
    };
    match serde_json::from_str::<InstallStamp>(&contents) {
        Ok(stamp) => stamp.epoch >= epoch,
        Err(_) => false,
    }
}
