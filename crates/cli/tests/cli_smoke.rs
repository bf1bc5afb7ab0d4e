//! CLI smoke tests for libsmith.
//!
//! These tests verify the binary's exit-code contract without touching the
//! network: every scenario here stops before the fetch step.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

use libsmith_core::layout::{self, DirPurpose};
use libsmith_core::{Configuration, VsVersion, epoch, libressl, llvm, roots};
use libsmith_platform::Platform;

/// Get a Command for the libsmith binary.
fn libsmith_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("libsmith");
    // Never let the invoking environment leak a real libraries root in.
    cmd.env_remove(roots::LIBS_ROOT_ENV);
    cmd
}

// =============================================================================
// Help
// =============================================================================

#[test]
fn help_flag_works() {
    libsmith_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn subcommand_help_works() {
    for cmd in &["libressl", "llvm"] {
        libsmith_cmd()
            .arg(cmd)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage"));
    }
}

// =============================================================================
// Argument validation
// =============================================================================

#[test]
fn unknown_config_value_exits_1() {
    libsmith_cmd()
        .args(["llvm", "--config", "fastest"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown config fastest"));
}

#[test]
fn config_selector_is_case_insensitive() {
    // RELEASE parses fine; the run then stops at the missing root variable,
    // which proves the selector was accepted.
    libsmith_cmd()
        .args(["llvm", "--config", "RELEASE"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(roots::LIBS_ROOT_ENV))
        .stderr(predicate::str::contains("Unknown config").not());
}

#[test]
fn unsupported_vs_version_is_a_benign_skip() {
    libsmith_cmd()
        .args(["llvm", "--vsversion", "2012"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Unsupported VS version: 2012"));
}

#[test]
fn non_numeric_vs_version_skips_like_an_unknown_year() {
    libsmith_cmd()
        .args(["llvm", "--vsversion", "fifteen"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Unsupported VS version: fifteen"));
}

#[test]
fn vs_2013_is_known_to_libressl_but_not_llvm() {
    // The LLVM pipeline skips 2013...
    libsmith_cmd()
        .args(["llvm", "--vsversion", "2013"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Unsupported VS version: 2013"));

    // ...while LibreSSL accepts it and proceeds to the root check.
    libsmith_cmd()
        .args(["libressl", "--vsversion", "2013"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported VS version").not())
        .stderr(predicate::str::contains(roots::LIBS_ROOT_ENV));
}

#[test]
fn missing_root_variable_exits_1_before_any_work() {
    libsmith_cmd()
        .arg("llvm")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(roots::LIBS_ROOT_ENV));
}

// =============================================================================
// Unknown flags: tolerated for libressl, fatal for llvm
// =============================================================================

#[test]
fn unknown_flags_are_fatal_for_llvm() {
    libsmith_cmd()
        .args(["llvm", "--bogus"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--bogus"));
}

#[test]
fn unknown_flags_are_warned_and_dropped_for_libressl() {
    libsmith_cmd()
        .args(["libressl", "--bogus", "--vsversion", "2012"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Unrecognised argument: --bogus"))
        .stderr(predicate::str::contains("Unsupported VS version: 2012"));
}

// =============================================================================
// Freshness short-circuit
// =============================================================================

/// Stamp current installs for every default configuration of one library.
fn stamp_installs(root: &TempDir, library: &str, names: &[String], epoch: u32) {
    for name in names {
        let dir = root.path().join(library).join(name);
        epoch::write_stamp(&dir, epoch).unwrap();
    }
}

#[test]
fn llvm_short_circuits_when_installs_are_current() {
    let platform = Platform::detect().unwrap();
    let root = TempDir::new().unwrap();

    let names: Vec<String> = [Configuration::Release, Configuration::Debug]
        .iter()
        .map(|&configuration| {
            layout::llvm_dir(
                llvm::DEFAULT_VERSION,
                DirPurpose::Install,
                configuration,
                platform.os,
                VsVersion(2022),
            )
        })
        .collect();
    stamp_installs(&root, "llvm", &names, llvm::BUILD_EPOCH);

    libsmith_cmd()
        .arg("llvm")
        .env(roots::LIBS_ROOT_ENV, root.path())
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Builds are in place, use --forcerebuild to rebuild",
        ));
}

#[test]
fn libressl_short_circuits_when_installs_are_current() {
    let platform = Platform::detect().unwrap();
    let root = TempDir::new().unwrap();

    let names: Vec<String> = [Configuration::Release, Configuration::Debug]
        .iter()
        .map(|&configuration| {
            layout::libressl_dir(
                libressl::DEFAULT_VERSION,
                DirPurpose::Install,
                configuration,
                platform.os,
                VsVersion(2022),
            )
        })
        .collect();
    stamp_installs(&root, "LibreSSL", &names, libressl::BUILD_EPOCH);

    libsmith_cmd()
        .arg("libressl")
        .env(roots::LIBS_ROOT_ENV, root.path())
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Builds are already in place, use --forcerebuild to rebuild",
        ));
}

#[test]
fn single_config_requests_only_check_that_install() {
    let platform = Platform::detect().unwrap();
    let root = TempDir::new().unwrap();

    let release = layout::llvm_dir(
        llvm::DEFAULT_VERSION,
        DirPurpose::Install,
        Configuration::Release,
        platform.os,
        VsVersion(2022),
    );
    stamp_installs(&root, "llvm", &[release], llvm::BUILD_EPOCH);

    // Only Release is stamped, and only Release is requested.
    libsmith_cmd()
        .args(["llvm", "--config", "release"])
        .env(roots::LIBS_ROOT_ENV, root.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Builds are in place"));
}
