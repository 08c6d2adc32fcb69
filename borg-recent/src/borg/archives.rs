//! Archive listings of a single repository.

use crate::borg::invoker::ArchiveTool;
use crate::borg::timestamp::{parse_borg_time, TIMESTAMP_FIELDS};
use crate::utils::errors::{RecentError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ffi::OsString;
use std::path::Path;

/// Lines with fewer fields are not archive lines.
pub const MIN_ARCHIVE_FIELDS: usize = 1 + TIMESTAMP_FIELDS;

/// One snapshot recorded in a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Archive {
    pub name: String,
    pub repository: String,
    pub timestamp: DateTime<Utc>,
}

impl Archive {
    /// The `repository::archive` target borg uses to list archive contents.
    pub fn target(&self, root: &Path) -> OsString {
        let mut target = root.join(&self.repository).into_os_string();
        target.push("::");
        target.push(&self.name);
        target
    }
}

/// List the archives of `root/repository`, oldest first as borg reports them.
pub fn list_archives(tool: &dyn ArchiveTool, root: &Path, repository: &str) -> Result<Vec<Archive>> {
    let repo_path = root.join(repository);
    let stdout = tool.list(repo_path.as_os_str())?;
    parse_archive_listing(&stdout, repository)
}

/// Parse `borg list <repo>` output.
///
/// A line of the right shape with an unparsable timestamp fails the whole
/// listing.
pub fn parse_archive_listing(stdout: &[u8], repository: &str) -> Result<Vec<Archive>> {
    let text = String::from_utf8_lossy(stdout);
    let mut archives = Vec::new();

    for line in text.lines() {
        // wbb.tim-online.nl-2016-01-27  Wed, 2016-01-27 03:01:19 [4f1a...]
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_ARCHIVE_FIELDS {
            continue;
        }

        let value = fields[1..MIN_ARCHIVE_FIELDS].join(" ");
        let timestamp = parse_borg_time(&value).ok_or_else(|| RecentError::ArchiveParse {
            repository: repository.to_string(),
            value: value.clone(),
        })?;

        archives.push(Archive {
            name: fields[0].to_string(),
            repository: repository.to_string(),
            timestamp,
        });
    }

    Ok(archives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::borg::testing::FakeTool;
    use chrono::TimeZone;

    const LISTING: &str = "\
alpha-2021-05-01                     Sat, 2021-05-01 02:30:00 [aa11]
alpha-2021-05-02                     Sun, 2021-05-02 02:30:00 [bb22]

short line
";

    #[test]
    fn test_parse_archive_listing() {
        let archives = parse_archive_listing(LISTING.as_bytes(), "alpha").unwrap();
        assert_eq!(archives.len(), 2);
        assert_eq!(archives[0].name, "alpha-2021-05-01");
        assert_eq!(archives[1].name, "alpha-2021-05-02");
        assert_eq!(archives[1].repository, "alpha");
        assert_eq!(
            archives[1].timestamp,
            Utc.with_ymd_and_hms(2021, 5, 2, 2, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_four_field_line() {
        let archives =
            parse_archive_listing(b"wbb.tim-online.nl-2016-01-27  Wed, 2016-01-27 03:01:19", "wbb")
                .unwrap();
        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].name, "wbb.tim-online.nl-2016-01-27");
    }

    #[test]
    fn test_bad_timestamp_fails_whole_listing() {
        let stdout = "\
good   Sat, 2021-05-01 02:30:00
old    Mon Jan 2 15:04:05 2006
";
        match parse_archive_listing(stdout.as_bytes(), "alpha") {
            Err(RecentError::ArchiveParse { repository, value }) => {
                assert_eq!(repository, "alpha");
                assert_eq!(value, "Mon Jan 2");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_listing() {
        assert!(parse_archive_listing(b"", "alpha").unwrap().is_empty());
    }

    #[test]
    fn test_list_archives_propagates_command_error() {
        let tool = FakeTool::new().fail("/srv/borg/notarepo", "repository does not exist");
        match list_archives(&tool, Path::new("/srv/borg"), "notarepo") {
            Err(RecentError::Command(msg)) => assert_eq!(msg, "repository does not exist"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_archive_target() {
        let archive = Archive {
            name: "alpha-2021-05-02".to_string(),
            repository: "alpha".to_string(),
            timestamp: Utc.with_ymd_and_hms(2021, 5, 2, 2, 30, 0).unwrap(),
        };
        assert_eq!(
            archive.target(Path::new("/srv/borg")),
            OsString::from("/srv/borg/alpha::alpha-2021-05-02")
        );
    }
}
