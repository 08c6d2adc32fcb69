//! "Most recent" selection over repositories and archives.

use crate::borg::archives::{list_archives, Archive};
use crate::borg::artifacts::{list_artifacts, ArchivedFile, GlobSet};
use crate::borg::invoker::ArchiveTool;
use crate::borg::scanner::scan;
use crate::utils::errors::Result;
use std::path::Path;
use tracing::{debug, warn};

/// The newest archive of one repository: the last one borg lists, not the
/// one with the highest timestamp.
pub fn most_recent_archive(
    tool: &dyn ArchiveTool,
    root: &Path,
    repository: &str,
) -> Result<Option<Archive>> {
    let mut archives = list_archives(tool, root, repository)?;
    if archives.is_empty() {
        debug!("Repository {} has no archives", repository);
    }
    Ok(archives.pop())
}

/// The newest archive of every repository under `root`. Repositories
/// without archives are left out; any listing failure aborts.
pub fn most_recent_per_repository(tool: &dyn ArchiveTool, root: &Path) -> Result<Vec<Archive>> {
    let mut recent = Vec::new();
    for repository in scan(tool, root)? {
        if let Some(archive) = most_recent_archive(tool, root, &repository)? {
            recent.push(archive);
        }
    }
    Ok(recent)
}

/// The newest matching artifact in `archive`, if any.
pub fn most_recent_artifact(
    tool: &dyn ArchiveTool,
    root: &Path,
    archive: &Archive,
    globs: &GlobSet,
) -> Result<Option<ArchivedFile>> {
    let files = list_artifacts(tool, root, archive, globs)?;
    Ok(newest(files))
}

/// Max by `modified_at`; the earliest entry wins a tie.
fn newest(files: Vec<ArchivedFile>) -> Option<ArchivedFile> {
    files
        .into_iter()
        .reduce(|best, f| if f.modified_at > best.modified_at { f } else { best })
}

/// Artifact lookup settings for a pipeline run.
#[derive(Debug, Clone)]
pub struct ArtifactLookup {
    pub globs: GlobSet,
    /// Propagate listing failures instead of reporting "no artifact".
    pub strict: bool,
}

impl ArtifactLookup {
    pub fn lookup(
        &self,
        tool: &dyn ArchiveTool,
        root: &Path,
        archive: &Archive,
    ) -> Result<Option<ArchivedFile>> {
        match most_recent_artifact(tool, root, archive, &self.globs) {
            Ok(found) => Ok(found),
            Err(e) if !self.strict => {
                warn!(
                    "Artifact lookup failed for {}::{}: {}",
                    archive.repository, archive.name, e
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
