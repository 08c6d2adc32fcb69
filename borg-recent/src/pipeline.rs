//! The `/recent` report: most recent archive (and dump) per repository.
//!
//! Every run re-scans the root and re-invokes borg; nothing is cached.

use crate::borg::aggregate::{most_recent_archive, most_recent_per_repository, ArtifactLookup};
use crate::borg::archives::Archive;
use crate::borg::artifacts::ArchivedFile;
use crate::borg::invoker::ArchiveTool;
use crate::borg::scanner::scan;
use crate::borg::timestamp::to_rfc3339;
use crate::config::Config;
use crate::utils::errors::{RecentError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::info;

/// One element of the `/recent` JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentEntry {
    pub repo: String,
    pub date: String,
    /// Absent when artifact lookup is disabled, empty when nothing matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mysql_date: Option<String>,
}

/// A repository's newest archive with its newest artifact.
#[derive(Debug, Clone)]
pub struct RecentArchive {
    pub archive: Archive,
    pub artifact: Option<ArchivedFile>,
}

impl RecentArchive {
    fn into_entry(self, with_artifacts: bool) -> RecentEntry {
        let mysql_date = with_artifacts.then(|| {
            self.artifact
                .map(|f| to_rfc3339(&f.modified_at))
                .unwrap_or_default()
        });
        RecentEntry {
            repo: self.archive.repository,
            date: to_rfc3339(&self.archive.timestamp),
            mysql_date,
        }
    }
}

/// Everything a report run needs, fixed at startup.
pub struct Pipeline {
    tool: Arc<dyn ArchiveTool>,
    root: PathBuf,
    artifacts: Option<ArtifactLookup>,
    max_concurrent: usize,
}

impl Pipeline {
    pub fn new(
        tool: Arc<dyn ArchiveTool>,
        root: PathBuf,
        artifacts: Option<ArtifactLookup>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            tool,
            root,
            artifacts,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn from_config(tool: Arc<dyn ArchiveTool>, root: PathBuf, config: &Config) -> Result<Self> {
        let artifacts = if config.artifacts.enabled {
            Some(ArtifactLookup {
                globs: config.glob_set()?,
                strict: config.artifacts.strict,
            })
        } else {
            None
        };
        Ok(Self::new(
            tool,
            root,
            artifacts,
            config.performance.max_concurrent_listings,
        ))
    }

    fn attach_artifact(&self, archive: Archive) -> Result<RecentArchive> {
        let artifact = match &self.artifacts {
            Some(lookup) => lookup.lookup(self.tool.as_ref(), &self.root, &archive)?,
            None => None,
        };
        Ok(RecentArchive { archive, artifact })
    }

    /// Scan, list and look up one repository after another.
    fn run_sequential(&self) -> Result<Vec<RecentArchive>> {
        most_recent_per_repository(self.tool.as_ref(), &self.root)?
            .into_iter()
            .map(|archive| self.attach_artifact(archive))
            .collect()
    }

    fn run_repository(&self, repository: &str) -> Result<Option<RecentArchive>> {
        match most_recent_archive(self.tool.as_ref(), &self.root, repository)? {
            Some(archive) => self.attach_artifact(archive).map(Some),
            None => Ok(None),
        }
    }
}

/// Produce the report, sorted by archive date (ties by repository name).
///
/// Any failure aborts the run; there are no partial results.
pub async fn collect_recent(pipeline: Arc<Pipeline>) -> Result<Vec<RecentEntry>> {
    let mut recent = if pipeline.max_concurrent <= 1 {
        let worker = pipeline.clone();
        tokio::task::spawn_blocking(move || worker.run_sequential())
            .await
            .map_err(|e| RecentError::Task(e.to_string()))??
    } else {
        collect_parallel(pipeline.clone()).await?
    };

    recent.sort_by(|a, b| {
        a.archive
            .timestamp
            .cmp(&b.archive.timestamp)
            .then_with(|| a.archive.repository.cmp(&b.archive.repository))
    });

    info!(
        "Collected {} recent archives from {}",
        recent.len(),
        pipeline.root.display()
    );

    let with_artifacts = pipeline.artifacts.is_some();
    Ok(recent
        .into_iter()
        .map(|r| r.into_entry(with_artifacts))
        .collect())
}

/// Fan repositories out over blocking workers, `max_concurrent` at a time.
async fn collect_parallel(pipeline: Arc<Pipeline>) -> Result<Vec<RecentArchive>> {
    let scanner = pipeline.clone();
    let repositories = tokio::task::spawn_blocking(move || scan(scanner.tool.as_ref(), &scanner.root))
        .await
        .map_err(|e| RecentError::Task(e.to_string()))??;

    let semaphore = Arc::new(Semaphore::new(pipeline.max_concurrent));
    let mut tasks = JoinSet::new();

    for repository in repositories {
        let pipeline = pipeline.clone();
        let semaphore = semaphore.clone();
        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| RecentError::Task(e.to_string()))?;
            tokio::task::spawn_blocking(move || pipeline.run_repository(&repository))
                .await
                .map_err(|e| RecentError::Task(e.to_string()))?
        });
    }

    let mut recent = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        // Returning early drops the set, which aborts the remaining tasks
        let outcome = joined.map_err(|e| RecentError::Task(e.to_string()))?;
        if let Some(archive) = outcome? {
            recent.push(archive);
        }
    }

    Ok(recent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::borg::artifacts::GlobSet;
    use crate::borg::testing::FakeTool;
    use tempfile::TempDir;

    const ALPHA: &str = "\
a1 Sat, 2021-05-01 02:30:00
a2 Tue, 2021-06-15 02:30:00
";
    const BETA: &str = "b1 Sun, 2021-05-02 02:30:00\n";
    const GAMMA: &str = "g1 Sat, 2021-05-01 02:30:00\n";

    const ALPHA_FILES: &str = "\
-rw-r--r-- root root 2048 Tue, 2021-06-15 02:10:00 var/backups/mysql/daily/2021-06-15.sql.gz
-rw-r--r-- root root 2048 Tue, 2021-06-15 02:00:00 var/backups/mysql/daily/2021-06-14.sql.gz
";

    fn fixture() -> std::io::Result<(TempDir, FakeTool)> {
        let root = TempDir::new()?;
        for name in ["alpha", "beta", "gamma", "empty", "notarepo"] {
            std::fs::create_dir(root.path().join(name))?;
        }
        let tool = FakeTool::new()
            .ok(root.path().join("alpha"), ALPHA)
            .ok(root.path().join("beta"), BETA)
            .ok(root.path().join("gamma"), GAMMA)
            .ok(root.path().join("empty"), "")
            .ok(root.path().join("alpha::a2"), ALPHA_FILES)
            .ok(root.path().join("beta::b1"), "")
            .fail(root.path().join("gamma::g1"), "Failed to create/acquire the lock");
        Ok((root, tool))
    }

    fn lookup() -> Option<ArtifactLookup> {
        Some(ArtifactLookup {
            globs: GlobSet::default(),
            strict: false,
        })
    }

    #[tokio::test]
    async fn test_report_sorted_with_artifacts() -> std::io::Result<()> {
        let (root, tool) = fixture()?;
        let pipeline = Pipeline::new(Arc::new(tool), root.path().to_path_buf(), lookup(), 1);

        let entries = collect_recent(Arc::new(pipeline)).await.unwrap();
        assert_eq!(
            entries,
            vec![
                RecentEntry {
                    repo: "gamma".to_string(),
                    date: "2021-05-01T02:30:00Z".to_string(),
                    mysql_date: Some(String::new()),
                },
                RecentEntry {
                    repo: "beta".to_string(),
                    date: "2021-05-02T02:30:00Z".to_string(),
                    mysql_date: Some(String::new()),
                },
                RecentEntry {
                    repo: "alpha".to_string(),
                    date: "2021-06-15T02:30:00Z".to_string(),
                    mysql_date: Some("2021-06-15T02:10:00Z".to_string()),
                },
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() -> std::io::Result<()> {
        let (root, tool) = fixture()?;
        let tool: Arc<dyn ArchiveTool> = Arc::new(tool);
        let sequential = Pipeline::new(tool.clone(), root.path().to_path_buf(), lookup(), 1);
        let parallel = Pipeline::new(tool, root.path().to_path_buf(), lookup(), 4);

        let a = collect_recent(Arc::new(sequential)).await.unwrap();
        let b = collect_recent(Arc::new(parallel)).await.unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_without_artifacts_omits_mysql_date() -> std::io::Result<()> {
        let (root, tool) = fixture()?;
        let pipeline = Pipeline::new(Arc::new(tool), root.path().to_path_buf(), None, 1);

        let entries = collect_recent(Arc::new(pipeline)).await.unwrap();
        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(json[0], serde_json::json!({"repo": "gamma", "date": "2021-05-01T02:30:00Z"}));
        Ok(())
    }

    #[tokio::test]
    async fn test_strict_artifacts_fail_request() -> std::io::Result<()> {
        let (root, tool) = fixture()?;
        let strict = Some(ArtifactLookup {
            globs: GlobSet::default(),
            strict: true,
        });
        let pipeline = Pipeline::new(Arc::new(tool), root.path().to_path_buf(), strict, 2);

        let err = collect_recent(Arc::new(pipeline)).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to create/acquire the lock");
        Ok(())
    }

    #[tokio::test]
    async fn test_parse_error_fails_parallel_run() -> std::io::Result<()> {
        let (root, tool) = fixture()?;
        let tool = tool.ok(root.path().join("beta"), "b1 2021-05-02 02:30:00 x\n");
        let pipeline = Pipeline::new(Arc::new(tool), root.path().to_path_buf(), lookup(), 3);

        let err = collect_recent(Arc::new(pipeline)).await.unwrap_err();
        assert!(matches!(err, RecentError::ArchiveParse { .. }));
        Ok(())
    }

    #[test]
    fn test_entry_round_trip() {
        let entries = vec![RecentEntry {
            repo: "ironhide.tim-online.nl".to_string(),
            date: "2021-05-01T02:30:00Z".to_string(),
            mysql_date: Some("2021-05-01T02:10:00Z".to_string()),
        }];
        let json = serde_json::to_string(&entries).unwrap();
        let back: Vec<RecentEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entries);
    }
}
