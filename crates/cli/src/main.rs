use anyhow::Result;
use clap::error::{ContextKind, ErrorKind};
use clap::{Args, Parser, Subcommand};
use console::{Term, style};
use std::ffi::OsString;
use tracing_subscriber::EnvFilter;

use libsmith_core::cmake::CmakeBuild;
use libsmith_core::{
    BuildRequest, Configuration, Outcome, VsVersion, libressl, llvm, parse_config_selector,
};
use libsmith_platform::Platform;

mod output;

use output::format_duration;

/// libsmith - downloads, patches, and builds third-party native libraries
#[derive(Parser)]
#[command(name = "libsmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download, patch, and build LibreSSL
    Libressl(BuildArgs),

    /// Download and build LLVM
    Llvm(BuildArgs),
}

/// Flags shared by both build procedures
#[derive(Args, Debug)]
struct BuildArgs {
    /// Library release to get (default: the pipeline's pinned version)
    #[arg(long = "release", short = 'R')]
    release: Option<String>,

    /// Visual Studio version to build with
    #[arg(long = "vsversion", short = 'v')]
    vsversion: Option<String>,

    /// Config to build: Release, Debug, or Both
    #[arg(long = "config", short = 'c')]
    config: Option<String>,

    /// Force a rebuild even when installs are in place
    #[arg(long = "forcerebuild", short = 'f')]
    forcerebuild: bool,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .init();

    let cli = parse_args();

    let result = match cli.command {
        Commands::Libressl(args) => cmd_libressl(&args),
        Commands::Llvm(args) => cmd_llvm(&args),
    };

    if let Err(e) = result {
        let term = Term::stderr();
        let _ = term.write_line(&format!("{} {:#}", style("error:").red().bold(), e));
        std::process::exit(1);
    }
}

/// Parse the command line.
///
/// The `libressl` subcommand tolerates flags it does not recognise: a
/// higher-level driver script passes every build procedure one shared flag
/// set. They are warned about and dropped, and parsing retries. Everything
/// else is fatal with exit code 1 (not clap's default 2, to keep the 0/1
/// exit contract).
fn parse_args() -> Cli {
    let mut argv: Vec<OsString> = std::env::args_os().collect();
    let tolerant = argv
        .get(1)
        .map(|s| s.to_string_lossy() == "libressl")
        .unwrap_or(false);

    loop {
        match Cli::try_parse_from(argv.iter()) {
            Ok(cli) => return cli,
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = err.print();
                    std::process::exit(0);
                }
                ErrorKind::UnknownArgument if tolerant => {
                    match remove_unknown_argument(&mut argv, &err) {
                        Some(removed) => {
                            eprintln!("Warning: Unrecognised argument: {removed}");
                        }
                        None => {
                            let _ = err.print();
                            std::process::exit(1);
                        }
                    }
                }
                _ => {
                    let _ = err.print();
                    std::process::exit(1);
                }
            },
        }
    }
}

/// Drop the token a clap UnknownArgument error points at, returning it.
///
/// Matches `--flag` and `--flag=value` forms; a token clap names but we
/// cannot find means the error is not droppable, so parsing must fail.
fn remove_unknown_argument(argv: &mut Vec<OsString>, err: &clap::Error) -> Option<String> {
    let unknown = err.get(ContextKind::InvalidArg)?.to_string();
    let position = argv.iter().position(|token| {
        let token = token.to_string_lossy();
        token == unknown || token.starts_with(&format!("{unknown}="))
    })?;
    argv.remove(position);
    Some(unknown)
}

/// Resolve the shared flags into an immutable request, exiting early for the
/// benign unsupported-VS skip (0) and the invalid config selector (1).
fn build_request(
    args: &BuildArgs,
    default_version: &str,
    supported_vs_years: &[u16],
    term: &Term,
) -> BuildRequest {
    let version = args
        .release
        .clone()
        .unwrap_or_else(|| default_version.to_string());

    let vs_year = match &args.vsversion {
        Some(value) => {
            // A toolchain this pipeline does not cover is a skip, not a
            // failure; non-numeric values parse as 0 and skip the same way.
            let year = value.parse::<u16>().unwrap_or(0);
            if !supported_vs_years.contains(&year) {
                let _ =
                    term.write_line(&format!("Unsupported VS version: {value}. Skipping."));
                std::process::exit(0);
            }
            year
        }
        None => 2022,
    };

    let configurations = match &args.config {
        Some(value) => match parse_config_selector(value) {
            Ok(configurations) => configurations,
            Err(e) => {
                let _ = term.write_line(&format!("{} {}", style("error:").red().bold(), e));
                std::process::exit(1);
            }
        },
        None => vec![Configuration::Release, Configuration::Debug],
    };

    BuildRequest {
        version,
        vs_version: VsVersion(vs_year),
        configurations,
        force_rebuild: args.forcerebuild,
    }
}

fn cmd_libressl(args: &BuildArgs) -> Result<()> {
    let term = Term::stderr();
    term.write_line(&format!("{} LibreSSL build", style("::").cyan().bold()))?;

    let request = build_request(
        args,
        libressl::DEFAULT_VERSION,
        libressl::SUPPORTED_VS_YEARS,
        &term,
    );
    tracing::debug!(?request, "parsed request");

    let platform = Platform::detect()?;
    let mut driver = CmakeBuild::new();

    match libressl::run(&request, platform, &mut driver)? {
        Outcome::UpToDate => {
            term.write_line(
                "LibreSSL: Builds are already in place, use --forcerebuild to rebuild.",
            )?;
        }
        Outcome::Built { elapsed } => {
            term.write_line(&format!(
                "{} Total build time: {}",
                style("::").green().bold(),
                format_duration(elapsed)
            ))?;
        }
    }

    Ok(())
}

fn cmd_llvm(args: &BuildArgs) -> Result<()> {
    let term = Term::stderr();
    term.write_line(&format!("{} LLVM build", style("::").cyan().bold()))?;

    let request = build_request(args, llvm::DEFAULT_VERSION, llvm::SUPPORTED_VS_YEARS, &term);
    tracing::debug!(?request, "parsed request");

    let platform = Platform::detect()?;
    let mut driver = CmakeBuild::new();

    match llvm::run(&request, platform, &mut driver)? {
        Outcome::UpToDate => {
            term.write_line("LLVM: Builds are in place, use --forcerebuild to rebuild.")?;
        }
        Outcome::Built { elapsed } => {
            term.write_line(&format!(
                "{} Total build time: {}",
                style("::").green().bold(),
                format_duration(elapsed)
            ))?;
        }
    }

    Ok(())
}
