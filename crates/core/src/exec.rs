//! External command execution

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::{CoreError, Result};

/// Run an external command with inherited stdio, failing on non-zero exit.
///
/// Build tools write their own progress to the terminal; nothing is
/// captured here.
pub fn run<I, S>(program: &str, args: I, cwd: Option<&Path>) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
    debug!(program, ?args, cwd = ?cwd, "running command");

    let mut command = Command::new(program);
    command.args(&args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let status = command.status().map_err(|source| CoreError::Spawn {
        program: program.to_string(),
        source,
    })?;

    if !status.success() {
        return Err(CoreError::CommandFailed {
            program: program.to_string(),
            code: status.code().unwrap_or(-1),
        });
    }

    Ok(())
}
