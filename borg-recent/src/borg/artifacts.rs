//! Locating backup artifacts (database dumps) inside an archive.

use crate::borg::archives::Archive;
use crate::borg::invoker::ArchiveTool;
use crate::borg::timestamp::{parse_borg_time, TIMESTAMP_FIELDS};
use crate::utils::errors::{RecentError, Result};
use chrono::{DateTime, Utc};
use glob::{MatchOptions, Pattern};
use serde::Serialize;
use std::path::Path;

/// mode, user, group, size, three timestamp fields, path.
pub const MIN_FILE_FIELDS: usize = 4 + TIMESTAMP_FIELDS + 1;

const SIZE_FIELD: usize = 3;
const PATH_FIELD: usize = MIN_FILE_FIELDS - 1;

/// Patterns matched when nothing else is configured.
pub const DEFAULT_GLOBS: &[&str] = &[
    // sql dumps
    "var/backups/mysql/daily/*.sql.gz",
    // binary backups
    "var/backups/mysql/daily/*/ibdata1",
];

/// `*` never crosses a `/`, like shell globbing.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// One file entry in an archive listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchivedFile {
    pub path: String,
    pub modified_at: DateTime<Utc>,
    pub size_bytes: u64,
}

/// Compiled artifact patterns, checked in order.
#[derive(Debug, Clone)]
pub struct GlobSet {
    patterns: Vec<Pattern>,
}

impl GlobSet {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|e| RecentError::InvalidGlob {
                    pattern: p.to_string(),
                    message: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// True on the first pattern that matches.
    pub fn matches(&self, path: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(path, MATCH_OPTIONS))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for GlobSet {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_GLOBS
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
        }
    }
}

/// List the non-empty files in `archive` whose path matches `globs`.
pub fn list_artifacts(
    tool: &dyn ArchiveTool,
    root: &Path,
    archive: &Archive,
    globs: &GlobSet,
) -> Result<Vec<ArchivedFile>> {
    let stdout = tool.list(&archive.target(root))?;
    parse_file_listing(&stdout, &archive.name, globs)
}

/// Parse `borg list <repo>::<archive>` output, keeping matching files.
pub fn parse_file_listing(stdout: &[u8], archive: &str, globs: &GlobSet) -> Result<Vec<ArchivedFile>> {
    let text = String::from_utf8_lossy(stdout);
    let mut files = Vec::new();

    for line in text.lines() {
        // -rw-r--r-- root root 1234 Sat, 2021-05-01 02:30:00 var/backups/mysql/daily/x.sql.gz
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FILE_FIELDS {
            continue;
        }

        let size = fields[SIZE_FIELD];
        let path = fields[PATH_FIELD];

        // Empty dumps don't count
        if size == "0" {
            continue;
        }

        if !globs.matches(path) {
            continue;
        }

        let parse_error = |field: &'static str, value: &str| RecentError::ArtifactParse {
            archive: archive.to_string(),
            path: path.to_string(),
            field,
            value: value.to_string(),
        };

        let value = fields[SIZE_FIELD + 1..PATH_FIELD].join(" ");
        let modified_at = parse_borg_time(&value).ok_or_else(|| parse_error("timestamp", &value))?;
        let size_bytes = size.parse::<u64>().map_err(|_| parse_error("size", size))?;

        files.push(ArchivedFile {
            path: path.to_string(),
            modified_at,
            size_bytes,
        });
    }

    Ok(files)
}
