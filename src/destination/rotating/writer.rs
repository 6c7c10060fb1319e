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

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::destination::file::FileWriter;
use crate::destination::rotating::archive;
use crate::destination::rotating::clock::Clock;
use crate::error::RotationError;
use crate::record::Level;

const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;
const DEFAULT_MAX_TIME_INTERVAL: i64 = 600;
const DEFAULT_MAX_LOG_FILES: u32 = 10;
const ARCHIVE_SUFFIX_FORMAT: &str = "_%Y-%m-%d_%H%M%S";

/// A size/age rotation decorator around a plain [`FileWriter`].
///
/// Tracks the live file's byte count and start time, and after each completed
/// write moves the file to a timestamped archive once either target is
/// reached. Both targets are guidelines, not hard caps: the check runs after
/// the write, so a single large write can overshoot.
///
/// Fallible operations return `(Level, String)` notices for the owning
/// destination to forward through the diagnostic path; the writer itself
/// never panics or propagates IO errors to logging callers.
#[derive(Debug)]
pub struct RotatingWriter {
    inner: FileWriter,
    identifier: String,
    should_append: bool,
    target_max_file_size: u64,
    target_max_time_interval: i64,
    target_max_log_files: u32,
    archive_folder: PathBuf,
    current_log_file_size: u64,
    current_log_start_time: Timestamp,
    base_file_name: String,
    file_extension: String,
    clock: Clock,
}

impl RotatingWriter {
    /// Creates a new [`RotatingWriterBuilder`].
    #[must_use]
    pub fn builder() -> RotatingWriterBuilder {
        RotatingWriterBuilder::new()
    }

    /// The path of the live log file.
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Whether the live file is currently open.
    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    /// The folder archives are moved into.
    pub fn archive_folder(&self) -> &Path {
        &self.archive_folder
    }

    /// Byte count of the live file as tracked by the writer.
    pub fn current_log_file_size(&self) -> u64 {
        self.current_log_file_size
    }

    pub(crate) fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = identifier.into();
    }

    /// Replace the size target; `0` means unbounded.
    pub fn set_target_max_file_size(&mut self, bytes: u64) {
        self.target_max_file_size = if bytes < 1 { u64::MAX } else { bytes };
    }

    /// Replace the age target in seconds; values below 1 fall back to the
    /// default of 600.
    pub fn set_target_max_time_interval(&mut self, seconds: i64) {
        self.target_max_time_interval = if seconds < 1 {
            DEFAULT_MAX_TIME_INTERVAL
        } else {
            seconds
        };
    }

    /// Replace the retention count and immediately clean up any archives now
    /// beyond it.
    pub fn set_target_max_log_files(&mut self, count: u32) -> Vec<(Level, String)> {
        self.target_max_log_files = count;
        self.clean_up_log_files()
    }

    /// Open the live file, reconciling against pre-existing content.
    ///
    /// The file is always opened in append mode first so pre-existing content
    /// survives the open. In append mode, size and start time are seeded from
    /// the existing file's metadata, so the targets see the true age and size
    /// across process restarts; if the seeded state already satisfies
    /// [`should_rotate`](RotatingWriter::should_rotate), the file is rotated
    /// at once. Without append, pre-existing content is rotated away instead
    /// of truncated.
    pub fn open(&mut self) -> Vec<(Level, String)> {
        let mut notices = Vec::new();

        if let Err(err) = fs::create_dir_all(&self.archive_folder) {
            notices.push((
                Level::Error,
                format!(
                    "Unable to create archive folder {}: {err}",
                    self.archive_folder.display()
                ),
            ));
        }

        let pre_existing = match self.inner.open_file() {
            Ok(appended) => appended,
            Err(err) => {
                notices.push((
                    Level::Error,
                    format!(
                        "Attempt to open log file {} failed: {err}",
                        self.inner.path().display()
                    ),
                ));
                return notices;
            }
        };

        let mode = if pre_existing && self.should_append {
            "Appending"
        } else {
            "Writing"
        };
        notices.push((
            Level::Info,
            format!("{mode} log to: {}", self.inner.path().display()),
        ));

        self.current_log_file_size = 0;
        self.current_log_start_time = self.clock.now();

        if !pre_existing {
            return notices;
        }

        if !self.should_append {
            // Existing content is archived rather than wiped.
            self.rotate_with_notices(&mut notices);
            return notices;
        }

        match fs::metadata(self.inner.path()) {
            Ok(metadata) => {
                self.current_log_file_size = metadata.len();
                self.current_log_start_time = metadata
                    .created()
                    .or_else(|_| metadata.modified())
                    .ok()
                    .and_then(|time| Timestamp::try_from(time).ok())
                    .unwrap_or_else(|| self.clock.now());
            }
            Err(err) => {
                notices.push((
                    Level::Warning,
                    format!("Unable to determine current attributes of log file: {err}"),
                ));
            }
        }

        if self.should_rotate() {
            self.rotate_with_notices(&mut notices);
        }
        notices
    }

    /// Whether the live file reached either target.
    pub fn should_rotate(&self) -> bool {
        if self.current_log_file_size >= self.target_max_file_size {
            return true;
        }

        let elapsed = self.clock.now().as_second() - self.current_log_start_time.as_second();
        elapsed >= self.target_max_time_interval
    }

    /// Append one record line, then rotate if a target was reached.
    ///
    /// The tracked size grows by the encoded byte length of the line plus its
    /// newline before the rotation check, so the check sees the completed
    /// write.
    pub fn write_line(&mut self, message: &str) -> Vec<(Level, String)> {
        let mut notices = Vec::new();

        self.current_log_file_size += message.len() as u64 + 1;
        if let Err(err) = self.inner.write_line(message) {
            self.inner.close_file();
            notices.push((
                Level::Error,
                format!(
                    "Failed to write log file {}: {err}",
                    self.inner.path().display()
                ),
            ));
            return notices;
        }

        if self.should_rotate() {
            self.rotate_with_notices(&mut notices);
        }
        notices
    }

    /// Move the live file into the archive folder under a timestamped name,
    /// tag the archive, and reset the size/age counters.
    pub fn rotate(&mut self) -> Result<PathBuf, RotationError> {
        let now = self.clock.now();
        let archive = self.archive_folder.join(self.archive_file_name(now));
        self.inner.rotate_file(&archive)?;

        if let Err(err) = archive::write_tag(&archive, &self.identifier, now) {
            eprintln!(
                "failed to tag archived log file {}: {err}",
                archive.display()
            );
        }

        self.current_log_file_size = 0;
        self.current_log_start_time = self.clock.now();
        Ok(archive)
    }

    pub(crate) fn rotate_with_notices(&mut self, notices: &mut Vec<(Level, String)>) -> bool {
        match self.rotate() {
            Ok(archive) => {
                notices.push((
                    Level::Info,
                    format!(
                        "Rotated log file {} to {}",
                        self.inner.path().display(),
                        archive.display()
                    ),
                ));
                if !self.inner.is_open() {
                    notices.push((
                        Level::Error,
                        format!(
                            "Failed to reopen log file after rotating {}",
                            self.inner.path().display()
                        ),
                    ));
                }
                notices.extend(self.clean_up_log_files());
                true
            }
            Err(err) => {
                notices.push((
                    Level::Error,
                    format!(
                        "Unable to rotate log file {}: {err}",
                        self.inner.path().display()
                    ),
                ));
                false
            }
        }
    }

    /// Delete every owned archive beyond the retention count, newest kept.
    ///
    /// Deletion failures are reported and skipped; they do not abort the
    /// remaining deletions.
    pub fn clean_up_log_files(&mut self) -> Vec<(Level, String)> {
        self.delete_archives(self.target_max_log_files as usize)
    }

    /// Delete all owned archives.
    pub fn purge_archived_log_files(&mut self) -> Vec<(Level, String)> {
        self.delete_archives(0)
    }

    /// The owned archives, newest first by recorded archival timestamp.
    pub fn archived_file_paths(&self) -> Vec<PathBuf> {
        archive::archived_files(&self.archive_folder, &self.identifier)
            .into_iter()
            .map(|(path, _)| path)
            .collect()
    }

    /// Push buffered bytes down to the OS.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }

    fn delete_archives(&self, keep: usize) -> Vec<(Level, String)> {
        let mut notices = Vec::new();
        let archived = archive::archived_files(&self.archive_folder, &self.identifier);
        for (path, _) in archived.into_iter().skip(keep) {
            if let Err(err) = fs::remove_file(&path) {
                notices.push((
                    Level::Error,
                    format!(
                        "Unable to delete old archived log file {}: {err}",
                        path.display()
                    ),
                ));
                continue;
            }
            let _ = fs::remove_file(archive::tag_path(&path));
        }
        notices
    }

    fn archive_file_name(&self, now: Timestamp) -> String {
        let zoned = now.to_zoned(TimeZone::system());
        let suffix = jiff::fmt::strtime::format(ARCHIVE_SUFFIX_FORMAT, &zoned)
            .unwrap_or_else(|_| format!("_{}", now.as_second()));
        if self.file_extension.is_empty() {
            format!("{}{suffix}", self.base_file_name)
        } else {
            format!("{}{suffix}.{}", self.base_file_name, self.file_extension)
        }
    }

    #[cfg(test)]
    fn set_now(&mut self, now: Timestamp) {
        self.clock.set_now(now);
    }
}

/// A builder for configuring [`RotatingWriter`].
#[derive(Debug)]
pub struct RotatingWriterBuilder {
    identifier: String,
    should_append: bool,
    append_marker: Option<String>,
    target_max_file_size: u64,
    target_max_time_interval: i64,
    target_max_log_files: u32,
    archive_folder: Option<PathBuf>,
    clock: Clock,
}

impl Default for RotatingWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RotatingWriterBuilder {
    /// Creates a new [`RotatingWriterBuilder`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            identifier: String::new(),
            should_append: false,
            append_marker: Some(crate::destination::FileDestination::DEFAULT_APPEND_MARKER.to_string()),
            target_max_file_size: DEFAULT_MAX_FILE_SIZE,
            target_max_time_interval: DEFAULT_MAX_TIME_INTERVAL,
            target_max_log_files: DEFAULT_MAX_LOG_FILES,
            archive_folder: None,
            clock: Clock::DefaultClock,
        }
    }

    /// Sets the identifier archives are tagged with.
    #[must_use]
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Whether to pick up a pre-existing file where it left off.
    #[must_use]
    pub fn should_append(mut self, should_append: bool) -> Self {
        self.should_append = should_append;
        self
    }

    /// Sets the marker written at the append seam; `None` suppresses it.
    #[must_use]
    pub fn append_marker(mut self, marker: Option<String>) -> Self {
        self.append_marker = marker;
        self
    }

    /// Sets the desired maximum size of the live file in bytes; `0` means
    /// unbounded.
    #[must_use]
    pub fn target_max_file_size(mut self, bytes: u64) -> Self {
        self.target_max_file_size = if bytes < 1 { u64::MAX } else { bytes };
        self
    }

    /// Sets the desired maximum age of the live file in seconds.
    #[must_use]
    pub fn target_max_time_interval(mut self, seconds: i64) -> Self {
        self.target_max_time_interval = if seconds < 1 {
            DEFAULT_MAX_TIME_INTERVAL
        } else {
            seconds
        };
        self
    }

    /// Sets the number of archived files to keep.
    #[must_use]
    pub fn target_max_log_files(mut self, count: u32) -> Self {
        self.target_max_log_files = count;
        self
    }

    /// Sets the folder archives are moved into; defaults to the live file's
    /// folder.
    #[must_use]
    pub fn archive_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.archive_folder = Some(folder.into());
        self
    }

    #[cfg(test)]
    fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the [`RotatingWriter`]; the file system is not touched until
    /// [`open`](RotatingWriter::open).
    pub fn build(self, path: impl AsRef<Path>) -> RotatingWriter {
        let path = path.as_ref().to_path_buf();
        let file_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_string();
        let base_file_name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("log")
            .to_string();
        let archive_folder = self.archive_folder.unwrap_or_else(|| {
            path.parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        });

        // The inner writer always appends so a pre-existing file survives the
        // open; the marker only applies when the caller asked to append.
        let marker = if self.should_append {
            self.append_marker
        } else {
            None
        };
        let current_log_start_time = self.clock.now();

        RotatingWriter {
            inner: FileWriter::new(path, true, marker),
            identifier: self.identifier,
            should_append: self.should_append,
            target_max_file_size: self.target_max_file_size,
            target_max_time_interval: self.target_max_time_interval,
            target_max_log_files: self.target_max_log_files,
            archive_folder,
            current_log_file_size: 0,
            current_log_start_time,
            base_file_name,
            file_extension,
            clock: self.clock,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use tempfile::TempDir;

    use super::*;
    use crate::destination::rotating::clock::ManualClock;

    fn start_time() -> Timestamp {
        Timestamp::from_str("2024-08-10T00:00:00Z").unwrap()
    }

    fn manual_writer(dir: &Path, max_size: u64, max_seconds: i64) -> RotatingWriter {
        let mut writer = RotatingWriter::builder()
            .identifier("test-rotating")
            .target_max_file_size(max_size)
            .target_max_time_interval(max_seconds)
            .clock(Clock::ManualClock(ManualClock::new(start_time())))
            .build(dir.join("rotor.log"));
        let notices = writer.open();
        assert!(
            notices.iter().all(|(level, _)| *level < Level::Warning),
            "open reported: {notices:?}"
        );
        writer
    }

    #[test]
    fn test_rotates_once_when_size_target_reached() {
        let dir = TempDir::new().unwrap();
        let mut writer = manual_writer(dir.path(), 100, 86_400);

        // 61 bytes with the newline: under the target, no rotation yet.
        let line = "x".repeat(60);
        assert!(writer.write_line(&line).is_empty());
        assert_eq!(writer.current_log_file_size(), 61);
        assert!(writer.archived_file_paths().is_empty());

        // 122 bytes total: one rotation, after the write completed.
        let notices = writer.write_line(&line);
        assert!(notices.iter().any(|(_, m)| m.starts_with("Rotated")));
        assert_eq!(writer.current_log_file_size(), 0);

        let archives = writer.archived_file_paths();
        assert_eq!(archives.len(), 1);
        let archived = fs::read_to_string(&archives[0]).unwrap();
        assert_eq!(archived, format!("{line}\n{line}\n"));

        // The live file is fresh.
        assert_eq!(fs::read_to_string(writer.path()).unwrap(), "");
        writer.write_line("next");
        writer.flush().unwrap();
        assert_eq!(fs::read_to_string(writer.path()).unwrap(), "next\n");
    }

    #[test]
    fn test_single_large_write_overshoots_target() {
        let dir = TempDir::new().unwrap();
        let mut writer = manual_writer(dir.path(), 100, 86_400);

        let line = "y".repeat(500);
        let notices = writer.write_line(&line);
        assert!(notices.iter().any(|(_, m)| m.starts_with("Rotated")));

        // The whole oversized write landed in the archive.
        let archives = writer.archived_file_paths();
        assert_eq!(archives.len(), 1);
        assert_eq!(
            fs::read_to_string(&archives[0]).unwrap().len(),
            line.len() + 1
        );
    }

    #[test]
    fn test_rotates_when_age_target_reached() {
        let dir = TempDir::new().unwrap();
        let mut writer = manual_writer(dir.path(), u64::MAX, 600);

        assert!(writer.write_line("early").is_empty());

        writer.set_now(Timestamp::from_str("2024-08-10T00:09:59Z").unwrap());
        assert!(writer.write_line("still early").is_empty());

        writer.set_now(Timestamp::from_str("2024-08-10T00:10:00Z").unwrap());
        let notices = writer.write_line("late");
        assert!(notices.iter().any(|(_, m)| m.starts_with("Rotated")));
        assert_eq!(writer.archived_file_paths().len(), 1);
    }

    #[test]
    fn test_retention_keeps_newest() {
        let dir = TempDir::new().unwrap();
        let mut writer = RotatingWriter::builder()
            .identifier("retained")
            .target_max_log_files(3)
            .clock(Clock::ManualClock(ManualClock::new(start_time())))
            .build(dir.path().join("kept.log"));
        writer.open();

        let mut seeded = Vec::new();
        for i in 1..=5 {
            let archive = dir.path().join(format!("kept_{i}.log"));
            fs::write(&archive, format!("archive {i}")).unwrap();
            let at = Timestamp::from_str(&format!("2024-08-0{i}T00:00:00Z")).unwrap();
            archive::write_tag(&archive, "retained", at).unwrap();
            seeded.push(archive);
        }

        assert!(writer.clean_up_log_files().is_empty());

        let remaining = writer.archived_file_paths();
        assert_eq!(remaining.len(), 3);
        // Newest three survive, oldest two are gone, sidecars included.
        assert_eq!(remaining, vec![seeded[4].clone(), seeded[3].clone(), seeded[2].clone()]);
        assert!(!seeded[0].exists());
        assert!(!seeded[1].exists());
        assert!(!archive::tag_path(&seeded[0]).exists());
    }

    #[test]
    fn test_lowering_retention_cleans_up_immediately() {
        let dir = TempDir::new().unwrap();
        let mut writer = RotatingWriter::builder()
            .identifier("shrunk")
            .target_max_log_files(10)
            .clock(Clock::ManualClock(ManualClock::new(start_time())))
            .build(dir.path().join("shrunk.log"));
        writer.open();

        for i in 1..=4 {
            let archive = dir.path().join(format!("shrunk_{i}.log"));
            fs::write(&archive, "old").unwrap();
            let at = Timestamp::from_str(&format!("2024-08-0{i}T00:00:00Z")).unwrap();
            archive::write_tag(&archive, "shrunk", at).unwrap();
        }
        assert_eq!(writer.archived_file_paths().len(), 4);

        writer.set_target_max_log_files(1);
        assert_eq!(writer.archived_file_paths().len(), 1);
    }

    #[test]
    fn test_cleanup_ignores_other_owners() {
        let dir = TempDir::new().unwrap();
        let mut writer = RotatingWriter::builder()
            .identifier("first")
            .target_max_log_files(0)
            .clock(Clock::ManualClock(ManualClock::new(start_time())))
            .build(dir.path().join("first.log"));
        writer.open();

        let foreign = dir.path().join("second_1.log");
        fs::write(&foreign, "not yours").unwrap();
        archive::write_tag(&foreign, "second", start_time()).unwrap();

        writer.clean_up_log_files();
        assert!(foreign.exists());
    }

    #[test]
    fn test_append_seeds_from_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seeded.log");
        fs::write(&path, "previous run\n").unwrap();

        let mut writer = RotatingWriter::builder()
            .identifier("seeded")
            .should_append(true)
            .append_marker(None)
            .clock(Clock::ManualClock(ManualClock::new(start_time())))
            .build(&path);
        let notices = writer.open();

        assert!(notices.iter().any(|(_, m)| m.starts_with("Appending")));
        assert_eq!(writer.current_log_file_size(), 13);
        assert!(writer.archived_file_paths().is_empty());
    }

    #[test]
    fn test_append_rotates_when_seeded_size_exceeds_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overflow.log");
        fs::write(&path, "z".repeat(200)).unwrap();

        let mut writer = RotatingWriter::builder()
            .identifier("overflow")
            .should_append(true)
            .append_marker(None)
            .target_max_file_size(100)
            .clock(Clock::ManualClock(ManualClock::new(start_time())))
            .build(&path);
        let notices = writer.open();

        assert!(notices.iter().any(|(_, m)| m.starts_with("Rotated")));
        assert_eq!(writer.archived_file_paths().len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert_eq!(writer.current_log_file_size(), 0);
    }

    #[test]
    fn test_without_append_existing_content_is_archived() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.log");
        fs::write(&path, "last run\n").unwrap();

        let mut writer = RotatingWriter::builder()
            .identifier("fresh")
            .clock(Clock::ManualClock(ManualClock::new(start_time())))
            .build(&path);
        writer.open();

        let archives = writer.archived_file_paths();
        assert_eq!(archives.len(), 1);
        assert_eq!(fs::read_to_string(&archives[0]).unwrap(), "last run\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_rotation_onto_existing_archive_keeps_live_file() {
        let dir = TempDir::new().unwrap();
        let mut writer = manual_writer(dir.path(), 100, 86_400);

        writer.write_line("some contents");

        // Occupy the exact archive path the next rotation would use.
        let occupied = dir.path().join(writer.archive_file_name(start_time()));
        fs::write(&occupied, "squatter").unwrap();

        let result = writer.rotate();
        assert!(matches!(result, Err(RotationError::ArchiveExists(_))));

        // Live file is untouched and still appendable.
        assert!(writer.is_open());
        writer.write_line("more contents");
        writer.flush().unwrap();
        assert_eq!(
            fs::read_to_string(writer.path()).unwrap(),
            "some contents\nmore contents\n"
        );
        assert_eq!(fs::read_to_string(&occupied).unwrap(), "squatter");
    }
}
