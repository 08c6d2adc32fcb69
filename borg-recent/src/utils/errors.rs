//! Custom error types for borg-recent.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecentError {
    #[error("{} doesn't exist", .0.display())]
    RootNotFound(PathBuf),

    #[error("{} is not a directory", .0.display())]
    RootNotADirectory(PathBuf),

    #[error("Can't find the {0} binary in the working directory or PATH")]
    ToolNotFound(String),

    /// The external tool exited non-zero. Carries the first line of stderr.
    #[error("{0}")]
    Command(String),

    #[error("Failed to run {}: {source}", .binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can't parse archive timestamp {value:?} in repository {repository}")]
    ArchiveParse { repository: String, value: String },

    #[error("Can't parse {field} {value:?} for {path} in archive {archive}")]
    ArtifactParse {
        archive: String,
        path: String,
        field: &'static str,
        value: String,
    },

    #[error("Can't read repository root {}: {source}", .root.display())]
    Scan {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern {pattern:?}: {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("Worker task failed: {0}")]
    Task(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RecentError>;
