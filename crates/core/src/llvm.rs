//! LLVM build pipeline
//!
//! LLVM releases moved hosting and archive layout several times, so a source
//! selector resolves the archive name, download URL, and extracted directory
//! for the requested version. The pipeline then drives one CMake build per
//! requested configuration with the flag set dependent code needs: exception
//! handling and RTTI on (callers throw through LLVM frames and inherit from
//! LLVM classes), a single CPU target, and dynamic-library mode on Linux to
//! keep clear of the system LLVM.

use semver::Version;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use libsmith_platform::Platform;

use crate::cmake::{BuildPaths, BuildSystem, ConfigureOptions};
use crate::layout::{self, DirPurpose};
use crate::request::{BuildRequest, Configuration};
use crate::{CoreError, Outcome, Result, epoch, fetch, roots};

/// Release fetched when `--release` is not given
pub const DEFAULT_VERSION: &str = "15.0.7";

/// Visual Studio releases this pipeline knows how to drive
pub const SUPPORTED_VS_YEARS: &[u16] = &[2015, 2017, 2019, 2022];

/// Bumped when the build logic changes enough to invalidate old installs
pub const BUILD_EPOCH: u32 = 1;

const GITHUB_RELEASE_BASE: &str = "https://github.com/llvm/llvm-project/releases/download";
const LEGACY_RELEASE_BASE: &str = "https://releases.llvm.org";

/// Needed next to the source tree even though benchmarks are disabled
const BENCHMARK_REPO: &str = "https://github.com/google/benchmark.git";

/// Parse a version leniently: missing minor/patch components count as zero,
/// so "15.0" compares as 15.0.0.
pub fn parse_version(version: &str) -> Result<Version> {
    let padded = match version.matches('.').count() {
        0 => format!("{version}.0.0"),
        1 => format!("{version}.0"),
        _ => version.to_string(),
    };
    Version::parse(&padded).map_err(|_| CoreError::InvalidVersion(version.to_string()))
}

/// Where one LLVM release lives and what it extracts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRelease {
    pub archive: String,
    pub url: String,
    pub source_dir: String,
    /// Separate CMake-modules archive shipped with 15.0 and later
    /// (llvm/llvm-project#53281), as (file name, URL)
    pub cmake_archive: Option<(String, String)>,
}

/// Resolve the download details for `version`
pub fn source_release(version: &str) -> Result<SourceRelease> {
    let v = parse_version(version)?;

    let extension = if v >= Version::new(3, 6, 0) { "xz" } else { "gz" };
    let archive = format!("llvm-{version}.src.tar.{extension}");

    let source_dir = if v <= Version::new(3, 4, 0) {
        format!("llvm-{version}")
    } else {
        format!("llvm-{version}.src")
    };

    // Release downloads moved to GitHub around 11.0
    let url = if v >= Version::new(11, 0, 0) {
        format!("{GITHUB_RELEASE_BASE}/llvmorg-{version}/{archive}")
    } else {
        format!("{LEGACY_RELEASE_BASE}/{version}/{archive}")
    };

    let cmake_archive = if v >= Version::new(15, 0, 0) {
        let file = format!("cmake-{version}.src.tar.xz");
        let url = format!("{GITHUB_RELEASE_BASE}/llvmorg-{version}/{file}");
        Some((file, url))
    } else {
        None
    };

    Ok(SourceRelease {
        archive,
        url,
        source_dir,
        cmake_archive,
    })
}

/// Cache definitions for one configuration on one platform
pub fn cmake_defines(
    version: &str,
    configuration: Configuration,
    platform: Platform,
) -> Result<Vec<(String, String)>> {
    let v = parse_version(version)?;
    let mut defines: Vec<(String, String)> = Vec::new();
    let mut define = |key: &str, value: &str| {
        defines.push((key.to_string(), value.to_string()));
    };

    if platform.is_darwin() {
        // The deployment baseline is old enough that libc++ must be forced
        define("CMAKE_CXX_FLAGS:STRING", "-std=c++11 -stdlib=libc++");
        define("CMAKE_EXE_LINKER_FLAGS:STRING", "-stdlib=libc++");
        define("CMAKE_SHARED_LINKER_FLAGS:STRING", "-stdlib=libc++");
        define("CMAKE_MODULE_LINKER_FLAGS:STRING", "-stdlib=libc++");
    }

    if platform.is_windows() {
        if configuration == Configuration::Release {
            define("CMAKE_CXX_FLAGS:STRING", "-D_SECURE_SCL=0");
        }
        if v >= Version::new(8, 0, 0) {
            define("LLVM_TEMPORARILY_ALLOW_OLD_TOOLCHAIN", "ON");
        }
    }

    if platform.is_linux() {
        // Required to avoid clashing with the system LLVM (used e.g. by
        // Mesa's OpenGL drivers)
        define("LLVM_BUILD_LLVM_DYLIB", "TRUE");
    }

    define("LLVM_OPTIMIZED_TABLEGEN", "ON");

    // Subtargets nothing downstream uses; skipping them cuts the build time
    define("LLVM_INCLUDE_EXAMPLES", "OFF");
    define("LLVM_INCLUDE_TESTS", "OFF");
    define("LLVM_INCLUDE_BENCHMARKS", "OFF");
    define("LLVM_BUILD_TOOLS", "OFF");

    // Dependent code throws exceptions through LLVM frames and inherits
    // from LLVM classes; RTTI is also required whenever EH is on
    define("LLVM_ENABLE_EH", "ON");
    define("LLVM_ENABLE_RTTI", "ON");

    let targets = if platform.is_arm64() { "AArch64" } else { "X86" };
    define("LLVM_TARGETS_TO_BUILD", targets);

    Ok(defines)
}

/// Build targets per platform: everything on Windows; just `llvm-config`
/// elsewhere (the install target compiles the rest but never installs
/// `llvm-config` itself, so it is built explicitly and copied after).
pub fn build_targets(platform: Platform) -> Vec<String> {
    if platform.is_windows() {
        Vec::new()
    } else {
        vec!["llvm-config".to_string()]
    }
}

/// Run the LLVM pipeline against the configured libraries root
pub fn run(
    request: &BuildRequest,
    platform: Platform,
    driver: &mut dyn BuildSystem,
) -> Result<Outcome> {
    let lib_dir = roots::library_dir("llvm")?;
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
    let release = source_release(&request.version)?;
    fetch_source(&release, lib_dir)?;
    build(request, platform, driver, lib_dir, &release)?;
    Ok(Outcome::Built {
        elapsed: started.elapsed(),
    })
}

fn all_installs_current(request: &BuildRequest, platform: Platform, lib_dir: &Path) -> bool {
    request.configurations.iter().all(|&configuration| {
        let name = layout::llvm_dir(
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

fn fetch_source(release: &SourceRelease, lib_dir: &Path) -> Result<()> {
    info!(archive = %release.archive, "fetching LLVM");

    fetch::download_if_absent(&release.url, &lib_dir.join(&release.archive))?;
    fetch::extract_if_absent(
        &lib_dir.join(&release.archive),
        &lib_dir.join(&release.source_dir),
    )?;

    if let Some((file, url)) = &release.cmake_archive {
        fetch::download_if_absent(url, &lib_dir.join(file))?;
        // Extracted straight to the canonical name the LLVM build expects
        fetch::extract_if_absent(&lib_dir.join(file), &lib_dir.join("cmake"))?;
    }

    fetch::clone_if_absent(
        BENCHMARK_REPO,
        &lib_dir.join("third-party").join("benchmark"),
    )?;

    Ok(())
}

fn build(
    request: &BuildRequest,
    platform: Platform,
    driver: &mut dyn BuildSystem,
    lib_dir: &Path,
    release: &SourceRelease,
) -> Result<()> {
    let source_dir = lib_dir.join(&release.source_dir);

    for &configuration in &request.configurations {
        let dir = |purpose| {
            lib_dir.join(layout::llvm_dir(
                &request.version,
                purpose,
                configuration,
                platform.os,
                request.vs_version,
            ))
        };
        let build_dir = dir(DirPurpose::Build);
        let install_dir = dir(DirPurpose::Install);

        driver.init(
            "LLVM",
            BuildPaths {
                source_dir: source_dir.clone(),
                build_dir: build_dir.clone(),
                install_dir: install_dir.clone(),
            },
        );
        driver.configure(&ConfigureOptions {
            configuration,
            platform,
            vs_version: request.vs_version,
            defines: cmake_defines(&request.version, configuration, platform)?,
            allow_reconfigure: false,
        })?;
        driver.build(&build_targets(platform))?;
        driver.install(BUILD_EPOCH)?;

        if !platform.is_windows() {
            // The install step leaves llvm-config behind in the build tree
            let from = build_dir.join("bin/llvm-config");
            let to = install_dir.join("bin/llvm-config");
            fs::create_dir_all(install_dir.join("bin"))?;
            info!(to = %to.display(), "installing llvm-config");
            fs::copy(&from, &to)?;
        }
    }

    Ok(())
}
