//! CMake build driver
//!
//! The configure → build → install lifecycle behind every library build.
//! The `BuildSystem` trait exists so the pipelines can be exercised against
//! a recording fake in tests; `CmakeBuild` is the implementation that
//! actually shells out to `cmake`.

use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use libsmith_platform::Platform;

use crate::request::{Configuration, VsVersion};
use crate::{CoreError, Result, epoch, exec};

/// Source, build, and install directories for one configuration's build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub install_dir: PathBuf,
}

/// Typed options for the configure step
#[derive(Debug, Clone)]
pub struct ConfigureOptions {
    pub configuration: Configuration,
    pub platform: Platform,
    /// Picks the generator on Windows; ignored elsewhere
    pub vs_version: VsVersion,
    /// Extra `-D` cache definitions, appended after the common set
    pub defines: Vec<(String, String)>,
    /// Reuse an existing build directory instead of wiping it first
    pub allow_reconfigure: bool,
}

/// The lifecycle of one library build
pub trait BuildSystem {
    /// Bind the source/build/install directory triple for the next build
    fn init(&mut self, project: &str, paths: BuildPaths);

    /// Generate the native build system
    fn configure(&mut self, options: &ConfigureOptions) -> Result<()>;

    /// Run the native build, restricted to `targets` when non-empty
    fn build(&mut self, targets: &[String]) -> Result<()>;

    /// Run the install step and stamp the install tree with `epoch`
    fn install(&mut self, epoch: u32) -> Result<()>;
}

/// Assemble the `cmake` generation arguments for one configure call.
///
/// Pure, so every platform's flag set can be asserted in tests without a
/// toolchain present.
pub fn configure_args(paths: &BuildPaths, options: &ConfigureOptions) -> Result<Vec<String>> {
    let mut args = vec![paths.source_dir.display().to_string()];

    if options.platform.is_windows() {
        let generator = options
            .vs_version
            .generator()
            .ok_or(CoreError::UnsupportedVsVersion(options.vs_version.year()))?;
        args.push("-G".to_string());
        if options.vs_version.uses_platform_flag() {
            args.push(generator.to_string());
            args.push("-A".to_string());
            args.push("x64".to_string());
        } else {
            args.push(format!("{generator} Win64"));
        }
    } else {
        // Single-config generators pick the build type at generation time
        args.push(format!(
            "-DCMAKE_BUILD_TYPE={}",
            options.configuration.build_type()
        ));
    }

    if options.platform.is_darwin() && options.platform.is_arm64() {
        args.push("-DCMAKE_OSX_ARCHITECTURES=arm64".to_string());
    }

    args.push(format!(
        "-DCMAKE_INSTALL_PREFIX:STRING={}",
        paths.install_dir.display()
    ));

    for (key, value) in &options.defines {
        args.push(format!("-D{key}={value}"));
    }

    Ok(args)
}

/// Build driver that runs a real `cmake` binary
#[derive(Debug, Default)]
pub struct CmakeBuild {
    project: String,
    paths: Option<BuildPaths>,
    configuration: Option<Configuration>,
    /// Visual Studio generators are multi-config and take `--config` at
    /// build/install time instead of `CMAKE_BUILD_TYPE`
    multi_config: bool,
}

impl CmakeBuild {
    pub fn new() -> Self {
        Self::default()
    }

    fn paths(&self) -> Result<&BuildPaths> {
        self.paths.as_ref().ok_or(CoreError::DriverNotInitialized)
    }

    fn config_args(&self) -> Vec<String> {
        match (self.multi_config, self.configuration) {
            (true, Some(configuration)) => {
                vec!["--config".to_string(), configuration.build_type().to_string()]
            }
            _ => Vec::new(),
        }
    }
}

impl BuildSystem for CmakeBuild {
    fn init(&mut self, project: &str, paths: BuildPaths) {
        debug!(project, source = %paths.source_dir.display(), "binding build directories");
        self.project = project.to_string();
        self.paths = Some(paths);
        self.configuration = None;
        self.multi_config = false;
    }

    fn configure(&mut self, options: &ConfigureOptions) -> Result<()> {
        let paths = self.paths()?.clone();

        if paths.build_dir.exists() && !options.allow_reconfigure {
            debug!(dir = %paths.build_dir.display(), "wiping build directory");
            fs::remove_dir_all(&paths.build_dir)?;
        }
        fs::create_dir_all(&paths.build_dir)?;

        let args = configure_args(&paths, options)?;
        info!(
            project = %self.project,
            configuration = %options.configuration,
            "configuring"
        );
        exec::run("cmake", &args, Some(&paths.build_dir))?;

        self.configuration = Some(options.configuration);
        self.multi_config = options.platform.is_windows();
        Ok(())
    }

    fn build(&mut self, targets: &[String]) -> Result<()> {
        let paths = self.paths()?;

        let mut args = vec!["--build".to_string(), paths.build_dir.display().to_string()];
        args.extend(self.config_args());
        args.push("--parallel".to_string());
        args.push(num_cpus::get().to_string());
        for target in targets {
            args.push("--target".to_string());
            args.push(target.clone());
        }

        info!(project = %self.project, ?targets, "building");
        exec::run("cmake", &args, None)
    }

    fn install(&mut self, epoch: u32) -> Result<()> {
        let paths = self.paths()?;

        let mut args = vec![
            "--build".to_string(),
            paths.build_dir.display().to_string(),
            "--target".to_string(),
            "install".to_string(),
        ];
        args.extend(self.config_args());

        info!(project = %self.project, "installing");
        exec::run("cmake", &args, None)?;

        epoch::write_stamp(&paths.install_dir, epoch)
    }
}
