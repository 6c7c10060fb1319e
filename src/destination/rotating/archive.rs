// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Out-of-band ownership tags for archived log files.
//!
//! Several loggers may share one archive folder, and archive filenames carry
//! no owner. Every archive therefore gets a JSON sidecar recording the owning
//! destination identifier and the archival timestamp; discovery reads the
//! sidecars, never the archive filenames.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use jiff::Timestamp;
use serde::Deserialize;
use serde::Serialize;

const TAG_SUFFIX: &str = ".meta.json";

#[derive(Debug, Serialize, Deserialize)]
struct ArchiveTag {
    identifier: String,
    archived_at: Timestamp,
}

/// The sidecar path for an archive.
pub(crate) fn tag_path(archive: &Path) -> PathBuf {
    let mut name = archive.as_os_str().to_os_string();
    name.push(TAG_SUFFIX);
    PathBuf::from(name)
}

/// Tag an archive with its owner and archival time.
pub(crate) fn write_tag(
    archive: &Path,
    identifier: &str,
    archived_at: Timestamp,
) -> anyhow::Result<()> {
    let tag = ArchiveTag {
        identifier: identifier.to_string(),
        archived_at,
    };
    let data = serde_json::to_vec(&tag)?;
    fs::write(tag_path(archive), data)?;
    Ok(())
}

/// The archives in `folder` owned by `identifier`, newest first by recorded
/// archival timestamp. Unreadable or foreign sidecars are skipped; sidecars
/// whose archive disappeared are removed.
pub(crate) fn archived_files(folder: &Path, identifier: &str) -> Vec<(PathBuf, Timestamp)> {
    let Ok(read_dir) = fs::read_dir(folder) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    for entry in read_dir.flatten() {
        let tag_file = entry.path();
        let Some(name) = tag_file.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some(archive_name) = name.strip_suffix(TAG_SUFFIX) else {
            continue;
        };
        let Ok(data) = fs::read(&tag_file) else {
            continue;
        };
        let Ok(tag) = serde_json::from_slice::<ArchiveTag>(&data) else {
            continue;
        };
        if tag.identifier != identifier {
            continue;
        }

        let archive = folder.join(archive_name);
        if !archive.exists() {
            let _ = fs::remove_file(&tag_file);
            continue;
        }
        found.push((archive, tag.archived_at));
    }

    found.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
    found
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn seed_archive(folder: &Path, name: &str, identifier: &str, at: Timestamp) -> PathBuf {
        let archive = folder.join(name);
        fs::write(&archive, "archived").unwrap();
        write_tag(&archive, identifier, at).unwrap();
        archive
    }

    #[test]
    fn test_listing_is_scoped_and_sorted() {
        let dir = TempDir::new().unwrap();
        let t = |s: &str| s.parse::<Timestamp>().unwrap();

        let old = seed_archive(dir.path(), "a_1.log", "mine", t("2024-01-01T00:00:00Z"));
        let new = seed_archive(dir.path(), "a_2.log", "mine", t("2024-06-01T00:00:00Z"));
        seed_archive(dir.path(), "b_1.log", "theirs", t("2024-12-01T00:00:00Z"));

        let listed = archived_files(dir.path(), "mine");
        let paths: Vec<_> = listed.into_iter().map(|(path, _)| path).collect();
        assert_eq!(paths, vec![new, old]);
    }

    #[test]
    fn test_stale_sidecars_are_dropped() {
        let dir = TempDir::new().unwrap();
        let archive = seed_archive(
            dir.path(),
            "gone.log",
            "mine",
            "2024-01-01T00:00:00Z".parse().unwrap(),
        );
        fs::remove_file(&archive).unwrap();

        assert!(archived_files(dir.path(), "mine").is_empty());
        assert!(!tag_path(&archive).exists());
    }
}
