//! Runs `borg list` as a child process.
//!
//! The child is awaited to completion with stdout and stderr fully buffered.
//! There is no timeout: a hung borg hangs the caller.

use crate::utils::errors::{RecentError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// The listing primitive everything above the invoker depends on.
pub trait ArchiveTool: Send + Sync {
    /// Run `list <target>` and return its stdout.
    ///
    /// `target` is either a repository path or `repository::archive`.
    fn list(&self, target: &OsStr) -> Result<Vec<u8>>;
}

/// The real borg executable.
#[derive(Debug, Clone)]
pub struct BorgCli {
    binary: PathBuf,
}

impl BorgCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn run(&self, args: &[&OsStr]) -> Result<Vec<u8>> {
        debug!("Running {} {:?}", self.binary.display(), args);

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RecentError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        interpret_output(&self.binary, output)
    }
}

impl ArchiveTool for BorgCli {
    fn list(&self, target: &OsStr) -> Result<Vec<u8>> {
        self.run(&[OsStr::new("list"), target])
    }
}

/// Stdout on success; on failure only the first stderr line survives.
fn interpret_output(binary: &Path, output: Output) -> Result<Vec<u8>> {
    if output.status.success() {
        return Ok(output.stdout);
    }

    let message = first_line(&output.stderr);
    if message.is_empty() {
        return Err(RecentError::Command(format!(
            "{} {}",
            binary.display(),
            output.status
        )));
    }
    Err(RecentError::Command(message))
}

/// First line of a byte stream, without its line terminator.
pub fn first_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Resolve the borg binary once at startup.
///
/// An explicit path wins. Otherwise `./<name>` in the working directory is
/// preferred over `$PATH`.
pub fn locate_binary(name: &str, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return which::which(path)
            .map_err(|_| RecentError::ToolNotFound(path.display().to_string()));
    }

    let cwd = std::env::current_dir()?;
    which::which_in(name, Some(cwd.as_os_str()), &cwd)
        .or_else(|_| which::which(name))
        .map_err(|_| RecentError::ToolNotFound(name.to_string()))
}
