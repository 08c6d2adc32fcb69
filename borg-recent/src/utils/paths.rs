//! Root directory resolution.

use crate::utils::errors::{RecentError, Result};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Expand a leading `~/` to the current user's home directory.
///
/// `~user/` forms are left untouched.
pub fn expand_tilde(raw: &str) -> PathBuf {
    let prefix = format!("~{}", MAIN_SEPARATOR);
    if let Some(rest) = raw.strip_prefix(&prefix) {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Expand and validate the repository root given on the command line.
pub fn resolve_root(raw: &str) -> Result<PathBuf> {
    let root = expand_tilde(raw);
    check_root(&root)?;
    Ok(root)
}

fn check_root(root: &Path) -> Result<()> {
    let metadata =
        std::fs::metadata(root).map_err(|_| RecentError::RootNotFound(root.to_path_buf()))?;
    if !metadata.is_dir() {
        return Err(RecentError::RootNotADirectory(root.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_expand_tilde_current_user() {
        let expanded = expand_tilde("~/backups");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("backups"));
        }
    }

    #[test]
    fn test_expand_tilde_leaves_other_forms() {
        assert_eq!(expand_tilde("~alice/backups"), PathBuf::from("~alice/backups"));
        assert_eq!(expand_tilde("/srv/borg"), PathBuf::from("/srv/borg"));
        assert_eq!(expand_tilde("relative/~/x"), PathBuf::from("relative/~/x"));
    }

    #[test]
    fn test_resolve_root_directory() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        let root = resolve_root(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(root, dir.path());
        Ok(())
    }

    #[test]
    fn test_resolve_root_missing() {
        let err = resolve_root("/nonexistent_borg_root_12345").unwrap_err();
        assert!(matches!(err, RecentError::RootNotFound(_)));
    }

    #[test]
    fn test_resolve_root_file() -> std::io::Result<()> {
        let file = NamedTempFile::new()?;
        let err = resolve_root(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, RecentError::RootNotADirectory(_)));
        Ok(())
    }
}
