//! LibreSSL build pipeline
//!
//! Fetch the release tarball from the OpenBSD mirror, extract it, patch the
//! Windows compat sources, then run the CMake lifecycle once per requested
//! configuration.

use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use libsmith_platform::Platform;

use crate::cmake::{BuildPaths, BuildSystem, ConfigureOptions};
use crate::layout::{self, DirPurpose};
use crate::request::BuildRequest;
use crate::{Outcome, Result, epoch, fetch, patch, roots};

/// Release fetched when `--release` is not given
pub const DEFAULT_VERSION: &str = "3.5.2";

/// Visual Studio releases this pipeline knows how to drive
pub const SUPPORTED_VS_YEARS: &[u16] = &[2013, 2015, 2017, 2019, 2022];

/// Bumped when the build logic changes enough to invalidate old installs
pub const BUILD_EPOCH: u32 = 0;

const DOWNLOAD_BASE: &str = "https://ftp.openbsd.org/pub/OpenBSD/LibreSSL";

/// Run the LibreSSL pipeline against the configured libraries root
pub fn run(
    request: &BuildRequest,
    platform: Platform,
    driver: &mut dyn BuildSystem,
) -> Result<Outcome> {
    let lib_dir = roots::library_dir("LibreSSL")?;
    run_in(request, platform, driver, &lib_dir)
}

/// Same as [`run`], but against an explicit library directory
pub fn run_in(
    request: &BuildRequest,
    platform: Platform,
    driver: &mut dyn BuildSystem,
    lib_dir: &Path,
) -> Result<Outcome> {
    if !request.force_rebuild && all_installs_current(request, platform, lib_dir) {
        return Ok(Outcome::UpToDate);
    }

    let started = Instant::now();
    fetch_source(request, platform, lib_dir)?;
    build(request, platform, driver, lib_dir)?;
    Ok(Outcome::Built {
        elapsed: started.elapsed(),
    })
}

fn all_installs_current(request: &BuildRequest, platform: Platform, lib_dir: &Path) -> bool {
    request.configurations.iter().all(|&configuration| {
        let name = layout::libressl_dir(
            &request.version,
            DirPurpose::Install,
            configuration,
            platform.os,
            request.vs_version,
        );
        let current = epoch::install_is_current(&lib_dir.join(&name), BUILD_EPOCH);
        debug!(dir = %name, current, "checked install");
        current
    })
}

fn fetch_source(request: &BuildRequest, platform: Platform, lib_dir: &Path) -> Result<()> {
    info!(version = %request.version, "fetching LibreSSL");

    let archive = layout::libressl_archive(&request.version);
    fetch::download_if_absent(
        &format!("{DOWNLOAD_BASE}/{archive}"),
        &lib_dir.join(&archive),
    )?;

    let source_dir = lib_dir.join(layout::libressl_source_dir(&request.version));
    fetch::extract_if_absent(&lib_dir.join(&archive), &source_dir)?;

    if platform.is_windows() {
        let patches = patch::patches_root()?;
        patch::patch_libressl(&source_dir, &patches, &request.version)?;
    }

    Ok(())
}

fn build(
    request: &BuildRequest,
    platform: Platform,
    driver: &mut dyn BuildSystem,
    lib_dir: &Path,
) -> Result<()> {
    let source_dir = lib_dir.join(layout::libressl_source_dir(&request.version));

    for &configuration in &request.configurations {
        let dir = |purpose| {
            lib_dir.join(layout::libressl_dir(
                &request.version,
                purpose,
                configuration,
                platform.os,
                request.vs_version,
            ))
        };

        driver.init(
            "LibreSSL",
            BuildPaths {
                source_dir: source_dir.clone(),
                build_dir: dir(DirPurpose::Build),
                install_dir: dir(DirPurpose::Install),
            },
        );
        driver.configure(&ConfigureOptions {
            configuration,
            platform,
            vs_version: request.vs_version,
            defines: Vec::new(),
            allow_reconfigure: false,
        })?;
        driver.build(&[])?;
        driver.install(BUILD_EPOCH)?;
    }

    Ok(())
}
