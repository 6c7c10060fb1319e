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
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::error::RotationError;

/// A plain append-or-truncate file writer with explicit rotation.
///
/// Holds at most one open handle at a time. The handle is `Some` iff the last
/// open succeeded; a failed open never leaves a stale handle, and writes with
/// no handle are silent no-ops so a broken sink degrades instead of erroring.
#[derive(Debug)]
pub struct FileWriter {
    path: PathBuf,
    handle: Option<File>,
    should_append: bool,
    append_marker: Option<String>,
}

impl FileWriter {
    /// Creates a writer for the given path; the file is not touched until
    /// [`open_file`](FileWriter::open_file).
    pub fn new(
        path: impl Into<PathBuf>,
        should_append: bool,
        append_marker: Option<String>,
    ) -> FileWriter {
        FileWriter {
            path: path.into(),
            handle: None,
            should_append,
            append_marker,
        }
    }

    /// The path the writer targets.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a handle is currently open.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub(crate) fn should_append(&self) -> bool {
        self.should_append
    }

    /// Retarget the writer; the current handle is closed first and the new
    /// path is not opened until the next [`open_file`](FileWriter::open_file).
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.close_file();
        self.path = path.into();
    }

    /// Open the target file for writing.
    ///
    /// An already-open handle is closed first. When appending to a
    /// pre-existing file the handle seeks to the end and the append marker (if
    /// any) is written; otherwise the file is truncate-created. Returns
    /// whether the open appended to existing content.
    pub fn open_file(&mut self) -> io::Result<bool> {
        if self.handle.is_some() {
            self.close_file();
        }

        let exists = self.path.exists();
        if self.should_append && exists {
            let mut file = OpenOptions::new().append(true).open(&self.path)?;
            if let Some(marker) = &self.append_marker {
                file.write_all(marker.as_bytes())?;
                file.write_all(b"\n")?;
            }
            self.handle = Some(file);
            Ok(true)
        } else {
            self.handle = Some(File::create(&self.path)?);
            Ok(false)
        }
    }

    /// Close the current handle, if any.
    pub fn close_file(&mut self) {
        self.handle = None;
    }

    /// Move the current file to `archive` and reopen a fresh file in place.
    ///
    /// Fails without touching the handle if the archive path already exists
    /// or the source file is missing. If the move itself fails, the original
    /// file is reopened in place so subsequent writes are not lost. A failure
    /// to reopen after a successful move leaves the writer closed (degraded);
    /// callers observe that through [`is_open`](FileWriter::is_open).
    pub fn rotate_file(&mut self, archive: &Path) -> Result<(), RotationError> {
        if archive.exists() {
            return Err(RotationError::ArchiveExists(archive.to_path_buf()));
        }
        if !self.path.exists() {
            return Err(RotationError::MissingLogFile(self.path.clone()));
        }

        self.close_file();
        if let Err(err) = fs::rename(&self.path, archive) {
            let _ = self.open_file();
            return Err(err.into());
        }

        let _ = self.open_file();
        Ok(())
    }

    /// Append one record line; the newline is added here.
    pub fn write_line(&mut self, message: &str) -> io::Result<()> {
        let Some(file) = self.handle.as_mut() else {
            return Ok(());
        };
        file.write_all(message.as_bytes())?;
        file.write_all(b"\n")
    }

    /// Push buffered bytes down to the OS.
    pub fn flush(&mut self) -> io::Result<()> {
        match self.handle.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_truncates_without_append() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");
        fs::write(&path, "old contents\n").unwrap();

        let mut writer = FileWriter::new(&path, false, None);
        assert!(!writer.open_file().unwrap());
        writer.write_line("fresh").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn test_appends_with_marker() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");
        fs::write(&path, "old\n").unwrap();

        let mut writer = FileWriter::new(&path, true, Some("-- ** ** ** --".to_string()));
        assert!(writer.open_file().unwrap());
        writer.write_line("new").unwrap();
        writer.flush().unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "old\n-- ** ** ** --\nnew\n"
        );
    }

    #[test]
    fn test_fresh_file_gets_no_marker() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");

        let mut writer = FileWriter::new(&path, true, Some("-- ** ** ** --".to_string()));
        assert!(!writer.open_file().unwrap());
        writer.write_line("first").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\n");
    }

    #[test]
    fn test_open_failure_leaves_no_handle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.log");

        let mut writer = FileWriter::new(&path, false, None);
        assert!(writer.open_file().is_err());
        assert!(!writer.is_open());

        // Degraded sinks swallow writes.
        writer.write_line("dropped").unwrap();
    }

    #[test]
    fn test_rotate_moves_and_reopens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");
        let archive = dir.path().join("out_archived.log");

        let mut writer = FileWriter::new(&path, false, None);
        writer.open_file().unwrap();
        writer.write_line("before").unwrap();
        writer.flush().unwrap();

        writer.rotate_file(&archive).unwrap();
        assert!(writer.is_open());
        writer.write_line("after").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(&archive).unwrap(), "before\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "after\n");
    }

    #[test]
    fn test_rotate_refuses_existing_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");
        let archive = dir.path().join("out_archived.log");
        fs::write(&archive, "already archived\n").unwrap();

        let mut writer = FileWriter::new(&path, false, None);
        writer.open_file().unwrap();
        writer.write_line("live").unwrap();
        writer.flush().unwrap();

        let err = writer.rotate_file(&archive).unwrap_err();
        assert!(matches!(err, RotationError::ArchiveExists(_)));

        // The live file stays open and appendable; nothing was lost.
        assert!(writer.is_open());
        writer.write_line("still live").unwrap();
        writer.flush().unwrap();
        assert_eq!(fs::read_to_string(&archive).unwrap(), "already archived\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "live\nstill live\n");
    }

    #[test]
    fn test_rotate_without_source_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never-opened.log");
        let archive = dir.path().join("archive.log");

        let mut writer = FileWriter::new(&path, false, None);
        let err = writer.rotate_file(&archive).unwrap_err();
        assert!(matches!(err, RotationError::MissingLogFile(_)));
    }
}
