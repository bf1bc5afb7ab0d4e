//! Output directory naming
//!
//! Build and install directory names are pure functions of the library
//! version, the directory's purpose, the configuration, the platform, and
//! (on Windows, where several toolchains can coexist) the Visual Studio
//! release. Taking `Os` as a parameter keeps every platform's naming
//! testable on any host.

use libsmith_platform::Os;

use crate::request::{Configuration, VsVersion};

/// What a derived directory is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirPurpose {
    Build,
    Install,
}

impl DirPurpose {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DirPurpose::Build => "build",
            DirPurpose::Install => "install",
        }
    }
}

/// Name of the extracted LibreSSL source directory, e.g. `libressl-3.5.2`
pub fn libressl_source_dir(version: &str) -> String {
    format!("libressl-{version}")
}

/// Name of the LibreSSL release tarball
pub fn libressl_archive(version: &str) -> String {
    format!("libressl-{version}.tar.gz")
}

fn libressl_config_suffix(configuration: Configuration) -> &'static str {
    match configuration {
        Configuration::Release => "",
        Configuration::Debug => "-debug",
    }
}

fn llvm_config_suffix(configuration: Configuration) -> &'static str {
    match configuration {
        Configuration::Release => "",
        Configuration::Debug => "_debug",
    }
}

/// Build or install directory name for a LibreSSL build
pub fn libressl_dir(
    version: &str,
    purpose: DirPurpose,
    configuration: Configuration,
    os: Os,
    vs_version: VsVersion,
) -> String {
    let purpose = purpose.as_str();
    let suffix = libressl_config_suffix(configuration);

    if os == Os::Windows {
        format!(
            "libressl-{version}-x64-vs{vs}-{purpose}{suffix}",
            vs = vs_version.year()
        )
    } else {
        format!("libressl-{version}-{purpose}{suffix}")
    }
}

/// Build or install directory name for an LLVM build
///
/// Dots in the version become underscores. The Linux name carries a `dylib`
/// tag: Linux builds use dynamic-library mode to keep clear of the system
/// LLVM, and that changes what the install tree contains.
pub fn llvm_dir(
    version: &str,
    purpose: DirPurpose,
    configuration: Configuration,
    os: Os,
    vs_version: VsVersion,
) -> String {
    let version = version.replace('.', "_");
    let purpose = purpose.as_str();
    let suffix = llvm_config_suffix(configuration);

    match os {
        Os::Windows => format!(
            "llvm_{version}_{purpose}_vs{vs}_64{suffix}",
            vs = vs_version.year()
        ),
        Os::Linux => format!("llvm_{version}_dylib_{purpose}{suffix}"),
        Os::Darwin => format!("llvm_{version}_{purpose}{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const VS: VsVersion = VsVersion(2022);

    #[test]
    fn libressl_names_on_windows() {
        assert_eq!(
            libressl_dir(
                "3.5.2",
                DirPurpose::Build,
                Configuration::Release,
                Os::Windows,
                VS
            ),
            "libressl-3.5.2-x64-vs2022-build"
        );
        assert_eq!(
            libressl_dir(
                "3.5.2",
                DirPurpose::Install,
                Configuration::Debug,
                Os::Windows,
                VS
            ),
            "libressl-3.5.2-x64-vs2022-install-debug"
        );
    }

    #[test]
    fn libressl_names_off_windows_omit_toolchain() {
        assert_eq!(
            libressl_dir(
                "3.5.2",
                DirPurpose::Install,
                Configuration::Release,
                Os::Linux,
                VS
            ),
            "libressl-3.5.2-install"
        );
        assert_eq!(
            libressl_dir(
                "3.5.2",
                DirPurpose::Build,
                Configuration::Debug,
                Os::Darwin,
                VS
            ),
            "libressl-3.5.2-build-debug"
        );
    }

    #[test]
    fn llvm_names_encode_platform_conventions() {
        assert_eq!(
            llvm_dir(
                "15.0.7",
                DirPurpose::Build,
                Configuration::Release,
                Os::Windows,
                VS
            ),
            "llvm_15_0_7_build_vs2022_64"
        );
        assert_eq!(
            llvm_dir(
                "15.0.7",
                DirPurpose::Install,
                Configuration::Debug,
                Os::Linux,
                VS
            ),
            "llvm_15_0_7_dylib_install_debug"
        );
        assert_eq!(
            llvm_dir(
                "15.0.7",
                DirPurpose::Install,
                Configuration::Release,
                Os::Darwin,
                VS
            ),
            "llvm_15_0_7_install"
        );
    }

    #[test]
    fn names_are_deterministic() {
        for _ in 0..3 {
            assert_eq!(
                libressl_dir("3.3.5", DirPurpose::Build, Configuration::Debug, Os::Windows, VS),
                libressl_dir("3.3.5", DirPurpose::Build, Configuration::Debug, Os::Windows, VS)
            );
        }
    }

    #[test]
    fn names_never_collide_across_the_exercised_space() {
        let versions = ["3.3.5", "3.5.2"];
        let configurations = [Configuration::Release, Configuration::Debug];
        let purposes = [DirPurpose::Build, DirPurpose::Install];
        let vs_years = [2013, 2015, 2017, 2019, 2022];
        let oses = [Os::Linux, Os::Darwin, Os::Windows];

        for os in oses {
            let mut seen = HashSet::new();
            for version in versions {
                for configuration in configurations {
                    for purpose in purposes {
                        // Off Windows the VS year must not affect the name,
                        // so only probe it where it participates.
                        let years: &[u16] = if os == Os::Windows { &vs_years } else { &[2022] };
                        for &year in years {
                            let name = libressl_dir(
                                version,
                                purpose,
                                configuration,
                                os,
                                VsVersion(year),
                            );
                            assert!(seen.insert(name.clone()), "collision: {name}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn llvm_vs_year_is_ignored_off_windows() {
        assert_eq!(
            llvm_dir("15.0.7", DirPurpose::Build, Configuration::Release, Os::Linux, VsVersion(2017)),
            llvm_dir("15.0.7", DirPurpose::Build, Configuration::Release, Os::Linux, VsVersion(2022)),
        );
    }
}
