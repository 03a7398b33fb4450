//! Blocking subprocess runner for version-control tools.
//!
//! Every tool invocation goes through [`run_tool`]: stdout and stderr are
//! captured and merged (downstream parsers match on warning text that some
//! tools print to stderr), the locale is pinned to English so those text
//! patterns are stable, and a non-zero exit becomes [`ExecError::Failed`]
//! carrying the merged output. No timeout is enforced; calls block until the
//! child exits.

use std::{
    ffi::OsStr,
    path::Path,
    process::{Command, Stdio},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with status {code:?}: {output}")]
    Failed {
        program: String,
        code: Option<i32>,
        output: String,
    },
}

#[cfg(windows)]
fn suppress_console(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn suppress_console(_cmd: &mut Command) {}

/// Run a tool to completion and return its merged stdout/stderr bytes.
pub fn run_tool<I, S>(program: &str, args: I, cwd: Option<&Path>) -> Result<Vec<u8>, ExecError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd.env("LC_ALL", "en_US");
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    suppress_console(&mut cmd);

    tracing::trace!(program, cwd = ?cwd, "running {:?}", cmd);

    let output = cmd.output().map_err(|source| ExecError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let mut merged = output.stdout;
    merged.extend_from_slice(&output.stderr);

    if !output.status.success() {
        return Err(ExecError::Failed {
            program: program.to_string(),
            code: output.status.code(),
            output: String::from_utf8_lossy(&merged).trim_end().to_string(),
        });
    }

    Ok(merged)
}

/// Launch a program and return immediately without waiting on it or
/// capturing its output. Used for the external diff tool.
pub fn launch_detached<I, S>(program: &str, args: I) -> Result<(), ExecError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());
    suppress_console(&mut cmd);

    tracing::trace!(program, "launching {:?}", cmd);

    cmd.spawn().map_err(|source| ExecError::Spawn {
        program: program.to_string(),
        source,
    })?;

    Ok(())
}
