//! Build requests and configuration selection
//!
//! A `BuildRequest` is constructed once from parsed flags and threaded
//! explicitly through the pipeline; nothing here is process-global.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CoreError, Result};

/// A build variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Configuration {
    Release,
    Debug,
}

impl Configuration {
    /// The CMake build type name for this variant
    pub const fn build_type(&self) -> &'static str {
        match self {
            Configuration::Release => "Release",
            Configuration::Debug => "Debug",
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.build_type())
    }
}

/// Parse the `--config` selector: `release`, `debug`, or `both`, any case.
///
/// `both` always yields Release before Debug.
pub fn parse_config_selector(value: &str) -> Result<Vec<Configuration>> {
    match value.to_lowercase().as_str() {
        "release" => Ok(vec![Configuration::Release]),
        "debug" => Ok(vec![Configuration::Debug]),
        "both" => Ok(vec![Configuration::Release, Configuration::Debug]),
        _ => Err(CoreError::UnknownConfig(value.to_string())),
    }
}

/// A Visual Studio release year, used to pick the CMake generator on Windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VsVersion(pub u16);

impl VsVersion {
    pub const fn year(&self) -> u16 {
        self.0
    }

    /// CMake generator name for this release, if known
    pub const fn generator(&self) -> Option<&'static str> {
        match self.0 {
            2013 => Some("Visual Studio 12 2013"),
            2015 => Some("Visual Studio 14 2015"),
            2017 => Some("Visual Studio 15 2017"),
            2019 => Some("Visual Studio 16 2019"),
            2022 => Some("Visual Studio 17 2022"),
            _ => None,
        }
    }

    /// Generators for 2019 and later take the target architecture as a
    /// separate `-A` argument; older ones encode it in the generator name.
    pub const fn uses_platform_flag(&self) -> bool {
        self.0 >= 2019
    }
}

impl fmt::Display for VsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable description of one invocation's work, built from parsed flags
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Library release to fetch and build
    pub version: String,
    /// Visual Studio release to build with; ignored off Windows
    pub vs_version: VsVersion,
    /// Configurations to build, in order
    pub configurations: Vec<Configuration>,
    /// Disable the freshness short-circuit
    pub force_rebuild: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_single_configs() {
        assert_eq!(
            parse_config_selector("release").unwrap(),
            vec![Configuration::Release]
        );
        assert_eq!(
            parse_config_selector("debug").unwrap(),
            vec![Configuration::Debug]
        );
    }

    #[test]
    fn selector_both_is_release_then_debug() {
        assert_eq!(
            parse_config_selector("both").unwrap(),
            vec![Configuration::Release, Configuration::Debug]
        );
    }

    #[test]
    fn selector_is_case_insensitive() {
        assert_eq!(
            parse_config_selector("Release").unwrap(),
            vec![Configuration::Release]
        );
        assert_eq!(
            parse_config_selector("BOTH").unwrap(),
            vec![Configuration::Release, Configuration::Debug]
        );
    }

    #[test]
    fn selector_rejects_unknown_values() {
        assert!(matches!(
            parse_config_selector("fastest"),
            Err(CoreError::UnknownConfig(_))
        ));
    }

    #[test]
    fn generator_mapping_covers_supported_years() {
        assert_eq!(
            VsVersion(2022).generator(),
            Some("Visual Studio 17 2022")
        );
        assert_eq!(
            VsVersion(2013).generator(),
            Some("Visual Studio 12 2013")
        );
        assert_eq!(VsVersion(2014).generator(), None);
    }

    #[test]
    fn platform_flag_split_is_at_2019() {
        assert!(VsVersion(2019).uses_platform_flag());
        assert!(VsVersion(2022).uses_platform_flag());
        assert!(!VsVersion(2017).uses_platform_flag());
    }
}
