//! Everything that talks to borg or parses its output.

pub mod aggregate;
pub mod archives;
pub mod artifacts;
pub mod invoker;
pub mod scanner;
pub mod timestamp;

pub use aggregate::{most_recent_artifact, most_recent_per_repository, ArtifactLookup};
pub use archives::{list_archives, Archive};
pub use artifacts::{list_artifacts, ArchivedFile, GlobSet};
pub use invoker::{locate_binary, ArchiveTool, BorgCli};
pub use scanner::{scan, RepoProbe};
