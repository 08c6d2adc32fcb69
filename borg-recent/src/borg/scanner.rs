//! Repository discovery under the root directory.

use crate::borg::invoker::ArchiveTool;
use crate::utils::errors::{RecentError, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of probing one candidate directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoProbe {
    Repository,
    NotRepository,
}

/// Ask borg whether `path` is a repository. Failures are logged and
/// classified, never propagated.
pub fn probe(tool: &dyn ArchiveTool, path: &Path) -> RepoProbe {
    match tool.list(path.as_os_str()) {
        Ok(_) => RepoProbe::Repository,
        Err(e) => {
            debug!("{} is not a repository: {}", path.display(), e);
            RepoProbe::NotRepository
        }
    }
}

/// Names of the immediate subdirectories of `root` that borg accepts as
/// repositories, in directory enumeration order.
///
/// Only an unreadable root is an error.
pub fn scan(tool: &dyn ArchiveTool, root: &Path) -> Result<Vec<String>> {
    let scan_error = |source: std::io::Error| RecentError::Scan {
        root: root.to_path_buf(),
        source,
    };

    let mut repositories = Vec::new();

    for entry in std::fs::read_dir(root).map_err(scan_error)? {
        let entry = entry.map_err(scan_error)?;

        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!("Skipping non UTF-8 directory name {:?}", raw);
                continue;
            }
        };

        if probe(tool, &entry.path()) == RepoProbe::Repository {
            repositories.push(name);
        }
    }

    debug!("Found {} repositories in {}", repositories.len(), root.display());
    Ok(repositories)
}
