use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::foundation::error::{ConvertError, ConvertResult};

/// External command run on the converted dataset once `convert.json` exists.
///
/// The destination directory is appended as the final argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandoffCommand {
    /// Program to spawn, looked up on `PATH` when relative.
    pub program: PathBuf,
    /// Leading arguments, before the destination directory.
    pub args: Vec<OsString>,
}

impl HandoffCommand {
    /// Command running `program` with no leading arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a leading argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Spawn the command for `dest` without waiting on it.
    pub fn launch(&self, dest: &Path) -> ConvertResult<Child> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().map_err(|source| ConvertError::Launch {
            program: self.program.clone(),
            source,
        })?;
        tracing::info!(
            program = %self.program.display(),
            pid = child.id(),
            dest = %dest.display(),
            "launched handoff"
        );
        Ok(child)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/convert/handoff.rs"]
mod tests;
