//! Blocking wrapper around [`std::process::Command`] shared by the `git`
//! and `gh` collaborators.
//!
//! stdin is closed and both output streams are captured. A spawn failure
//! becomes [`PublishError::ToolMissing`]; a non-zero exit becomes
//! [`PublishError::CommandFailed`] carrying the trimmed stderr.

use std::process::{Command, Stdio};

use crate::error::PublishError;

/// Run `cmd` to completion and return its trimmed stdout.
pub fn run(mut cmd: Command) -> Result<String, PublishError> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    tracing::debug!(%program, args = %args.join(" "), "spawning");

    let output = cmd.output().map_err(|source| PublishError::ToolMissing {
        program: program.clone(),
        source,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(PublishError::CommandFailed {
            program,
            args,
            status: output.status.to_string(),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
